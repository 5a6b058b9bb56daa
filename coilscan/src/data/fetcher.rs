//! Multi-source fetcher with priority-ordered failover.
//!
//! The manager tries providers in priority order and falls through to the
//! next source on failure. There is no retry layer here: transient-failure
//! resilience is the providers' fallback itself, and anything beyond that
//! belongs to the caller.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::DataConfig;

use super::provider::{MarketDataProvider, ProviderError};
use super::{derive_pct_chg, sort_and_dedup_bars, DailyBar, EastmoneyAdapter, QuoteRow,
    SinaAdapter, StockListing};

/// Priority-ordered collection of market data providers.
pub struct FetcherManager {
    /// Providers sorted by priority (lower first)
    providers: Vec<Arc<dyn MarketDataProvider>>,
}

impl FetcherManager {
    /// Create a manager from an explicit provider list.
    ///
    /// Providers are sorted by priority; order of the input is irrelevant.
    pub fn new(mut providers: Vec<Arc<dyn MarketDataProvider>>) -> Self {
        providers.sort_by_key(|p| p.priority());
        for provider in &providers {
            info!(
                provider = provider.name(),
                priority = provider.priority(),
                "Registered data provider"
            );
        }
        Self { providers }
    }

    /// Create a manager from configuration.
    ///
    /// Unknown provider names are skipped with a warning; disabled entries
    /// are ignored. An empty result is tolerated here and surfaces as
    /// `Unavailable` on first use.
    pub fn from_config(config: &DataConfig) -> Self {
        let mut providers: Vec<Arc<dyn MarketDataProvider>> = Vec::new();

        for entry in &config.sources {
            if !entry.enabled {
                continue;
            }

            match entry.provider.as_str() {
                "eastmoney" => {
                    providers.push(Arc::new(EastmoneyAdapter::with_priority(
                        config.request_timeout_secs,
                        entry.priority,
                    )));
                }
                "sina" => {
                    providers.push(Arc::new(SinaAdapter::with_priority(
                        config.request_timeout_secs,
                        entry.priority,
                    )));
                }
                other => {
                    warn!(provider = other, "Unknown data provider, skipping");
                }
            }
        }

        if providers.is_empty() {
            warn!("No data providers configured");
        }

        Self::new(providers)
    }

    /// Fetch the full-market snapshot.
    ///
    /// The first provider yielding a non-empty table wins. An empty table is
    /// treated like a failure for fallback purposes: the full market is
    /// never legitimately empty. When every source fails the result is an
    /// empty collection with a logged error, not an error value; the caller
    /// decides whether to treat that as fatal.
    pub async fn get_market_snapshot(&self) -> Vec<QuoteRow> {
        for provider in &self.providers {
            match provider.get_market_snapshot().await {
                Ok(rows) if !rows.is_empty() => {
                    info!(
                        provider = provider.name(),
                        rows = rows.len(),
                        "Market snapshot fetched"
                    );
                    return rows;
                }
                Ok(_) => {
                    warn!(
                        provider = provider.name(),
                        "Snapshot source returned an empty table, trying next source"
                    );
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Snapshot source failed, trying next source"
                    );
                }
            }
        }

        error!("All snapshot sources failed");
        Vec::new()
    }

    /// Fetch up to `days` most-recent daily bars for `code`.
    ///
    /// Bars come back sorted ascending with duplicate dates removed and
    /// percent-change filled in from the previous close where the provider
    /// did not report it. The second element names the provider that
    /// satisfied the request.
    pub async fn get_daily_data(
        &self,
        code: &str,
        days: usize,
    ) -> Result<(Vec<DailyBar>, &'static str), ProviderError> {
        let mut last_error = None;

        for provider in &self.providers {
            debug!(provider = provider.name(), code, "Routing history request");

            match provider.get_daily_bars(code, days).await {
                Ok(bars) => {
                    let mut bars = sort_and_dedup_bars(bars);
                    derive_pct_chg(&mut bars);
                    if bars.len() > days {
                        bars.drain(..bars.len() - days);
                    }
                    return Ok((bars, provider.name()));
                }
                Err(e) => {
                    if !e.should_failover() {
                        return Err(e);
                    }
                    warn!(
                        provider = provider.name(),
                        code,
                        error = %e,
                        "History source failed, trying next source"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::Unavailable("no data providers registered".into())))
    }

    /// Fetch the full symbol universe, with the same failover behavior.
    pub async fn get_all_stock_list(&self) -> Result<Vec<StockListing>, ProviderError> {
        let mut last_error = None;

        for provider in &self.providers {
            match provider.get_stock_list().await {
                Ok(listings) if !listings.is_empty() => {
                    info!(
                        provider = provider.name(),
                        count = listings.len(),
                        "Symbol list fetched"
                    );
                    return Ok(listings);
                }
                Ok(_) => {
                    warn!(
                        provider = provider.name(),
                        "Symbol list source returned nothing, trying next source"
                    );
                    last_error = Some(ProviderError::DataNotAvailable("empty symbol list".into()));
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Symbol list source failed, trying next source"
                    );
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| ProviderError::Unavailable("no data providers registered".into())))
    }
}

// ============================================================================
// Tests
// ============================================================================
