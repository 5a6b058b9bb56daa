//! Screener configuration.
//!
//! Every threshold the pipeline applies lives here as a tunable rather than
//! a hard-coded constant. The defaults encode the accumulation-without-
//! breakout setup: cheap small-caps that printed a near-limit rally day
//! recently but have not run yet.

use serde::{Deserialize, Serialize};

/// Configuration for the pattern screener.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreenerConfig {
    // === Basic filter ===
    /// Maximum price in yuan
    #[serde(default = "default_max_price")]
    pub max_price: f64,

    /// Maximum total market capitalization in yuan
    #[serde(default = "default_max_total_mv")]
    pub max_total_mv: f64,

    // === Pattern gates ===
    /// Daily percent change above which a bar counts as a rally day.
    /// 9.5 approximates a near-limit move without chasing per-venue rules.
    #[serde(default = "default_rally_threshold")]
    pub rally_threshold: f64,

    /// Maximum interval return over the rally window (fraction, 0.5 = +50%)
    #[serde(default = "default_max_interval_gain")]
    pub max_interval_gain: f64,

    /// Maximum percentile position within the annual range (fraction)
    #[serde(default = "default_max_position_rank")]
    pub max_position_rank: f64,

    /// Recent window scanned for rally days and interval return, in bars
    #[serde(default = "default_rally_window")]
    pub rally_window: usize,

    /// Annual lookback fetched per security, in bars
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Short moving-average period
    #[serde(default = "default_ma_short")]
    pub ma_short: usize,

    /// Mid moving-average period
    #[serde(default = "default_ma_mid")]
    pub ma_mid: usize,

    /// Long moving-average period
    #[serde(default = "default_ma_long")]
    pub ma_long: usize,

    // === Orchestration ===
    /// Concurrent evaluations; kept low to respect upstream rate limits
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Emit a progress report every N completed evaluations
    #[serde(default = "default_progress_every")]
    pub progress_every: usize,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            max_price: default_max_price(),
            max_total_mv: default_max_total_mv(),
            rally_threshold: default_rally_threshold(),
            max_interval_gain: default_max_interval_gain(),
            max_position_rank: default_max_position_rank(),
            rally_window: default_rally_window(),
            history_window: default_history_window(),
            ma_short: default_ma_short(),
            ma_mid: default_ma_mid(),
            ma_long: default_ma_long(),
            workers: default_workers(),
            progress_every: default_progress_every(),
        }
    }
}

fn default_max_price() -> f64 {
    20.0
}

fn default_max_total_mv() -> f64 {
    // 200 hundred-million yuan
    2e10
}

fn default_rally_threshold() -> f64 {
    9.5
}

fn default_max_interval_gain() -> f64 {
    0.5
}

fn default_max_position_rank() -> f64 {
    0.5
}

fn default_rally_window() -> usize {
    60
}

fn default_history_window() -> usize {
    250
}

fn default_ma_short() -> usize {
    5
}

fn default_ma_mid() -> usize {
    10
}

fn default_ma_long() -> usize {
    20
}

fn default_workers() -> usize {
    5
}

fn default_progress_every() -> usize {
    50
}

// ============================================================================
// Tests
// ============================================================================
