//! Pattern evaluation for a single security's history.
//!
//! The accumulation-without-breakout test, four gates applied in order with
//! short-circuit:
//!
//! 1. At least one rally day in the recent window
//! 2. Muted interval return over that window
//! 3. Bullish moving-average stack at the latest bar
//! 4. Price in the lower part of the annual range
//!
//! The result type keeps "the pattern did not match" and "evaluation blew
//! up" distinguishable internally; both collapse to absent at the
//! orchestrator boundary.

use serde::{Deserialize, Serialize};

use crate::data::DailyBar;

use super::config::ScreenerConfig;

// ============================================================================
// Screen Hit
// ============================================================================

/// A security that passed every pattern gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenHit {
    /// Security code
    pub code: String,
    /// Security name
    pub name: String,
    /// Latest close price
    pub price: f64,
    /// Number of rally days in the recent window
    pub limit_up_count: usize,
    /// Interval return over the recent window, in percent
    pub interval_increase: f64,
    /// Percentile position within the annual range, 0-100
    pub position_rank: f64,
}

// ============================================================================
// Evaluation Result
// ============================================================================

/// Why a series was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Series missing, empty, or shorter than the rally window
    SeriesTooShort,
    /// No bar in the recent window cleared the rally threshold
    NoRallyDay,
    /// The security already ran past the interval-gain ceiling
    IntervalGainTooLarge,
    /// Moving averages are not in strictly descending short-to-long order
    BearishAlignment,
    /// Latest close sits too high in the annual range
    PositionTooHigh,
}

/// Outcome of evaluating one security.
///
/// `NoMatch` and `Failed` both surface as absent to callers, but stay
/// separate here so diagnostics can tell a clean rejection from a broken
/// evaluation.
#[derive(Debug, Clone)]
pub enum Evaluation {
    /// Every gate passed
    Hit(ScreenHit),
    /// A gate rejected the series
    NoMatch(Rejection),
    /// Fetch or computation failed for this security
    Failed(String),
}

impl Evaluation {
    /// Collapse to the external contract: a hit or nothing.
    pub fn into_hit(self) -> Option<ScreenHit> {
        match self {
            Self::Hit(hit) => Some(hit),
            Self::NoMatch(_) | Self::Failed(_) => None,
        }
    }

    /// Whether this outcome is a hit.
    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

// ============================================================================
// Pattern Evaluator
// ============================================================================

/// Evaluates one security's daily series against the pattern gates.
#[derive(Clone)]
pub struct PatternEvaluator {
    config: ScreenerConfig,
}

impl PatternEvaluator {
    /// Create an evaluator from screener configuration.
    pub fn new(config: ScreenerConfig) -> Self {
        Self { config }
    }

    /// Run the four-gate test over an ascending daily series.
    ///
    /// Gates are checked in order and evaluation stops at the first
    /// failure. The series must be sorted ascending by date; the fetcher
    /// guarantees that.
    pub fn evaluate(&self, code: &str, name: &str, bars: &[DailyBar]) -> Evaluation {
        let cfg = &self.config;

        if bars.len() < cfg.rally_window {
            return Evaluation::NoMatch(Rejection::SeriesTooShort);
        }
        let Some(latest) = bars.last() else {
            return Evaluation::NoMatch(Rejection::SeriesTooShort);
        };

        // Gate 1: at least one rally day in the recent window
        let window = &bars[bars.len() - cfg.rally_window..];
        let limit_up_count = window
            .iter()
            .filter(|b| b.pct_chg.is_some_and(|p| p > cfg.rally_threshold))
            .count();
        if limit_up_count == 0 {
            return Evaluation::NoMatch(Rejection::NoRallyDay);
        }

        // Gate 2: the rally must not have turned into a full run yet
        let base_close = window[0].close;
        if base_close <= 0.0 {
            return Evaluation::Failed(format!(
                "non-positive base close {} for {}",
                base_close, code
            ));
        }
        let interval_increase = (latest.close - base_close) / base_close;
        if interval_increase > cfg.max_interval_gain {
            return Evaluation::NoMatch(Rejection::IntervalGainTooLarge);
        }

        // Gate 3: short-term averages stacked bullishly
        let mas = (
            trailing_ma(bars, cfg.ma_short),
            trailing_ma(bars, cfg.ma_mid),
            trailing_ma(bars, cfg.ma_long),
        );
        let (Some(ma_short), Some(ma_mid), Some(ma_long)) = mas else {
            return Evaluation::NoMatch(Rejection::SeriesTooShort);
        };
        if !(ma_short > ma_mid && ma_mid > ma_long) {
            return Evaluation::NoMatch(Rejection::BearishAlignment);
        }

        // Gate 4: still in the lower part of the annual range
        let year_low = bars.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let year_high = bars.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let position = position_in_range(latest.close, year_low, year_high);
        if position > cfg.max_position_rank {
            return Evaluation::NoMatch(Rejection::PositionTooHigh);
        }

        Evaluation::Hit(ScreenHit {
            code: code.to_string(),
            name: name.to_string(),
            price: latest.close,
            limit_up_count,
            interval_increase: interval_increase * 100.0,
            position_rank: position * 100.0,
        })
    }
}

/// Simple moving average of the closes over the trailing `period` bars.
fn trailing_ma(bars: &[DailyBar], period: usize) -> Option<f64> {
    if period == 0 || bars.len() < period {
        return None;
    }
    let sum: f64 = bars[bars.len() - period..].iter().map(|b| b.close).sum();
    Some(sum / period as f64)
}

/// Percentile position of `close` within `[low, high]`.
///
/// A zero-width range pins the position to 0, which always passes the gate.
fn position_in_range(close: f64, low: f64, high: f64) -> f64 {
    if high > low {
        (close - low) / (high - low)
    } else {
        0.0
    }
}

// ============================================================================
// Tests
// ============================================================================
