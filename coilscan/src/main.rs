//! Coilscan - screen the full A-share market for the
//! accumulation-without-breakout pattern and print the hits.

use anyhow::Result;
use std::sync::Arc;

use coilscan::config::Config;
use coilscan::data::FetcherManager;
use coilscan::logging::init_logging;
use coilscan::screener::{ScreenerEngine, ScreenerReport};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_with_env()?;

    init_logging(&config.observability);

    tracing::info!("coilscan v{}", env!("CARGO_PKG_VERSION"));

    let fetcher = Arc::new(FetcherManager::from_config(&config.data));
    let engine = ScreenerEngine::new(config.screener.clone(), fetcher);

    let hits = engine.run_screen().await;
    if hits.is_empty() {
        tracing::info!("No securities matched the pattern");
        return Ok(());
    }

    let report = ScreenerReport::new(hits);
    println!("{}", report.to_table());

    Ok(())
}
