//! Basic snapshot filter.
//!
//! Scalar pre-filtering over the normalized market snapshot: cheap stocks,
//! positive earnings, modest market cap. Rows with missing values never
//! satisfy a predicate, mirroring how NaN comparisons behave in the data
//! sources this pipeline grew up around.

use tracing::info;

use crate::data::QuoteRow;

use super::config::ScreenerConfig;

/// Scalar threshold filter over the market snapshot.
pub struct BasicFilter {
    max_price: f64,
    max_total_mv: f64,
}

impl BasicFilter {
    /// Create a filter from screener configuration.
    pub fn new(config: &ScreenerConfig) -> Self {
        Self {
            max_price: config.max_price,
            max_total_mv: config.max_total_mv,
        }
    }

    /// Apply the predicate chain, preserving input order.
    ///
    /// 1. `price <= max_price`
    /// 2. `pe > 0` (excludes loss-makers and rows with no PE)
    /// 3. `total_mv <= max_total_mv`
    pub fn filter(&self, rows: &[QuoteRow]) -> Vec<QuoteRow> {
        if rows.is_empty() {
            return Vec::new();
        }

        let passed: Vec<QuoteRow> = rows
            .iter()
            .filter(|r| self.passes(r))
            .cloned()
            .collect();

        info!(
            input = rows.len(),
            passed = passed.len(),
            "Basic filter applied"
        );

        passed
    }

    fn passes(&self, row: &QuoteRow) -> bool {
        let Some(price) = row.price else {
            return false;
        };
        if price > self.max_price {
            return false;
        }

        let Some(pe) = row.pe else {
            return false;
        };
        if pe <= 0.0 {
            return false;
        }

        let Some(total_mv) = row.total_mv else {
            return false;
        };
        if total_mv > self.max_total_mv {
            return false;
        }

        true
    }
}

// ============================================================================
// Tests
// ============================================================================
