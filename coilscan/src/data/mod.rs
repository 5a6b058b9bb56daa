//! Market data module for A-shares.
//!
//! Canonical market data types plus fetching with multi-provider failover.
//!
//! # Data Sources
//! - **eastmoney** (primary): free push2/push2his REST APIs, full-market
//!   quote table and daily k-lines
//! - **sina** (backup): Market_Center quote table and CN_MarketDataService
//!   k-lines, different column schema and units

mod eastmoney;
mod fetcher;
mod normalize;
mod provider;
mod sina;

pub use eastmoney::EastmoneyAdapter;
pub use fetcher::FetcherManager;
pub use normalize::{coerce_numeric, normalize_rows, FieldMap};
pub use provider::{MarketDataProvider, ProviderError};
pub use sina::SinaAdapter;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Core Data Types
// ============================================================================

/// One security's row in the full-market snapshot.
///
/// Numeric fields are `Option` because providers report placeholders
/// (e.g. `"-"` for a suspended stock); a value that fails numeric coercion
/// becomes missing, never an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuoteRow {
    /// Security code (e.g., "000001")
    pub code: String,
    /// Security name
    pub name: String,
    /// Latest price
    pub price: Option<f64>,
    /// Price/earnings ratio (dynamic)
    pub pe: Option<f64>,
    /// Total market capitalization in yuan
    pub total_mv: Option<f64>,
    /// Daily percent change
    pub pct_chg: Option<f64>,
}

/// One trading day for one security.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBar {
    /// Trading day
    pub date: NaiveDate,
    /// Open price
    pub open: f64,
    /// High price
    pub high: f64,
    /// Low price
    pub low: f64,
    /// Close price
    pub close: f64,
    /// Day-over-day percent change; absent when the provider does not
    /// report it (derived from the previous close downstream)
    pub pct_chg: Option<f64>,
    /// Volume
    pub volume: f64,
}

impl DailyBar {
    /// Percent change of this bar's close relative to a previous close.
    pub fn pct_change_from(&self, prev_close: f64) -> f64 {
        if prev_close > 0.0 {
            (self.close - prev_close) / prev_close * 100.0
        } else {
            0.0
        }
    }
}

/// One row of the full symbol universe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockListing {
    /// Security code (e.g., "000001")
    pub code: String,
    /// Security name
    pub name: String,
}

/// Sort a bar series ascending by date and drop duplicate dates.
///
/// Providers occasionally return unordered or overlapping pages; the
/// evaluator requires a strictly increasing series.
pub fn sort_and_dedup_bars(mut bars: Vec<DailyBar>) -> Vec<DailyBar> {
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

/// Fill in missing `pct_chg` values from the previous bar's close.
///
/// The first bar stays untouched when the provider did not report a change
/// for it; there is no previous close to derive from.
pub fn derive_pct_chg(bars: &mut [DailyBar]) {
    for i in 1..bars.len() {
        if bars[i].pct_chg.is_none() {
            let prev_close = bars[i - 1].close;
            bars[i].pct_chg = Some(bars[i].pct_change_from(prev_close));
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
