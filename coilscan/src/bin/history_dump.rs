//! Demonstration binary: fetch the full symbol universe, then batch-fetch
//! recent history for the first few symbols, logging which provider
//! satisfied each request.

use anyhow::Result;

use coilscan::config::Config;
use coilscan::data::FetcherManager;
use coilscan::logging::init_logging;

/// Number of symbols to fetch history for in the demonstration.
const DEMO_SYMBOLS: usize = 5;

/// Trading days of history per symbol.
const DEMO_DAYS: usize = 30;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_with_env()?;

    init_logging(&config.observability);

    let fetcher = FetcherManager::from_config(&config.data);

    tracing::info!("Fetching full symbol list");
    let listings = fetcher.get_all_stock_list().await?;
    tracing::info!(count = listings.len(), "Symbol list fetched");

    for listing in listings.iter().take(DEMO_SYMBOLS) {
        println!("{}  {}", listing.code, listing.name);
    }

    let mut succeeded = 0usize;
    for listing in listings.iter().take(DEMO_SYMBOLS) {
        match fetcher.get_daily_data(&listing.code, DEMO_DAYS).await {
            Ok((bars, source)) => {
                succeeded += 1;
                tracing::info!(
                    code = %listing.code,
                    source,
                    bars = bars.len(),
                    "History fetched"
                );
            }
            Err(e) => {
                tracing::error!(code = %listing.code, error = %e, "History fetch failed");
            }
        }
    }

    tracing::info!(
        succeeded,
        attempted = DEMO_SYMBOLS.min(listings.len()),
        "Batch history demonstration complete"
    );

    Ok(())
}
