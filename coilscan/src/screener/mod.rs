//! Screening pipeline.
//!
//! Snapshot filtering, per-security pattern evaluation, and the concurrent
//! orchestrator that fans candidates out across a bounded worker pool.

mod config;
mod engine;
mod filter;
mod pattern;
mod report;

pub use config::ScreenerConfig;
pub use engine::{Candidate, ProgressReporter, ScreenerEngine, TracingReporter};
pub use filter::BasicFilter;
pub use pattern::{Evaluation, PatternEvaluator, Rejection, ScreenHit};
pub use report::ScreenerReport;
