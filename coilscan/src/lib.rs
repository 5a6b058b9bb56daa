//! Coilscan - full-market screener for the accumulation-without-breakout
//! pattern in A-shares.
//!
//! The screener looks for securities that printed at least one near-limit
//! rally day recently but have not run yet: muted medium-term gain, a
//! bullish short-term moving-average stack, and a price still sitting in the
//! lower half of the annual range.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                           coilscan                               │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐   ┌──────────────┐   ┌─────────────────────┐  │
//! │  │  Market Data │──▶│ Basic Filter │──▶│  Screener Engine    │  │
//! │  │  Fetcher     │   │ (snapshot)   │   │  (bounded fan-out,  │  │
//! │  │  (failover)  │   └──────────────┘   │  pattern evaluator) │  │
//! │  └──────────────┘                      └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Pattern gates
//!
//! A candidate becomes a hit only when all four gates pass, in order:
//! 1. At least one rally day (> 9.5% daily change) in the last 60 bars
//! 2. Interval return over those 60 bars no more than +50%
//! 3. MA5 > MA10 > MA20 at the latest bar
//! 4. Latest close in the lower half of the 250-day high/low range

#![warn(clippy::all)]
#![allow(clippy::pedantic)]

pub mod config;
pub mod data;
pub mod logging;
pub mod screener;
