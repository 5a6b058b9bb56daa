//! Data provider abstraction for multi-source market data.
//!
//! Defines the `MarketDataProvider` trait that all data sources implement,
//! enabling priority-ordered failover in the fetcher.

use async_trait::async_trait;
use thiserror::Error;

use super::{DailyBar, QuoteRow, StockListing};

// ============================================================================
// Provider Error
// ============================================================================

/// Errors specific to data providers.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Network error (connection failed, timeout, non-2xx status)
    #[error("network error: {0}")]
    Network(String),

    /// Response could not be parsed into the expected shape
    #[error("malformed response: {0}")]
    Parse(String),

    /// Data not available for the requested symbol
    #[error("data not available: {0}")]
    DataNotAvailable(String),

    /// Provider is temporarily unavailable
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// Invalid request parameters
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ProviderError {
    /// Check if the error is recoverable (worth trying again later).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Unavailable(_))
    }

    /// Check if this error should trigger a failover to another provider.
    ///
    /// An invalid request is invalid for every provider; everything else is
    /// worth handing to the next source.
    pub fn should_failover(&self) -> bool {
        !matches!(self, Self::InvalidRequest(_))
    }
}

// ============================================================================
// Market Data Provider Trait
// ============================================================================

/// Trait for market data providers.
///
/// All data sources (eastmoney, sina) implement this trait to provide a
/// unified interface for the fetcher's failover loop.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Get the provider name (e.g., "eastmoney", "sina")
    fn name(&self) -> &'static str;

    /// Get the provider priority (lower = tried first)
    fn priority(&self) -> u8;

    /// Fetch the full-market quote table, normalized into [`QuoteRow`]s.
    ///
    /// Column names and units differ per provider; each implementation maps
    /// its raw rows through its own field-mapping table.
    async fn get_market_snapshot(&self) -> Result<Vec<QuoteRow>, ProviderError>;

    /// Fetch up to `days` most-recent daily bars for `code`.
    ///
    /// May return fewer bars near a listing date. Order is not guaranteed;
    /// the fetcher sorts and deduplicates.
    async fn get_daily_bars(&self, code: &str, days: usize)
        -> Result<Vec<DailyBar>, ProviderError>;

    /// Fetch the full symbol universe.
    ///
    /// Default implementation projects the market snapshot down to
    /// `(code, name)` rows.
    async fn get_stock_list(&self) -> Result<Vec<StockListing>, ProviderError> {
        let snapshot = self.get_market_snapshot().await?;
        Ok(snapshot
            .into_iter()
            .map(|row| StockListing {
                code: row.code,
                name: row.name,
            })
            .collect())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_recoverable() {
        assert!(ProviderError::Network("timeout".into()).is_recoverable());
        assert!(ProviderError::Unavailable("maintenance".into()).is_recoverable());
        assert!(!ProviderError::Parse("bad json".into()).is_recoverable());
        assert!(!ProviderError::DataNotAvailable("no data".into()).is_recoverable());
    }

    #[test]
    fn test_provider_error_failover() {
        assert!(ProviderError::Network("timeout".into()).should_failover());
        assert!(ProviderError::Parse("bad json".into()).should_failover());
        assert!(ProviderError::Unavailable("down".into()).should_failover());
        assert!(ProviderError::DataNotAvailable("delisted".into()).should_failover());
        assert!(!ProviderError::InvalidRequest("empty code".into()).should_failover());
    }

    #[test]
    fn test_provider_error_display() {
        let err = ProviderError::Network("connection refused".into());
        assert!(err.to_string().contains("connection refused"));

        let err = ProviderError::DataNotAvailable("000001".into());
        assert!(err.to_string().contains("not available"));
    }
}
