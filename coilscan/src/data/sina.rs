//! Sina adapter for A-share market data.
//!
//! Backup source behind eastmoney. The Market_Center endpoint serves the
//! full-market quote table page by page; CN_MarketDataService serves daily
//! k-lines. Column names and units differ from eastmoney (market cap is
//! reported in units of 10,000 yuan, PE is called `per`), which the field
//! map absorbs.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use super::normalize::{normalize_rows, FieldMap};
use super::provider::{MarketDataProvider, ProviderError};
use super::{DailyBar, QuoteRow};

// ============================================================================
// Constants
// ============================================================================

/// Sina full-market quote table API (paged)
const SINA_NODE_URL: &str =
    "https://vip.stock.finance.sina.com.cn/quotes_service/api/json_v2.php/Market_Center.getHQNodeData";

/// Sina daily k-line API
const SINA_KLINE_URL: &str =
    "https://quotes.sina.cn/cn/api/json_v2.php/CN_MarketDataService.getKLineData";

/// Quote table page size
const NODE_PAGE_SIZE: usize = 500;

/// Upper bound on quote table pages
const NODE_MAX_PAGES: usize = 20;

/// Column mapping for the Market_Center quote table.
///
/// `mktcap` is reported in 万元 (10,000 yuan), hence the scale factor.
const NODE_FIELD_MAP: FieldMap = FieldMap {
    provider: "sina",
    code: "code",
    name: "name",
    price: "trade",
    pe: "per",
    total_mv: "mktcap",
    pct_chg: "changepercent",
    total_mv_scale: 1e4,
};

/// Convert a bare 6-digit code to the sina symbol format.
fn sina_symbol(code: &str) -> Result<String, ProviderError> {
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ProviderError::InvalidRequest(format!(
            "not a numeric security code: {:?}",
            code
        )));
    }

    let prefix = match code.as_bytes()[0] {
        b'6' | b'9' => "sh",
        _ => "sz",
    };

    Ok(format!("{}{}", prefix, code))
}

// ============================================================================
// Sina Adapter
// ============================================================================

/// Sina adapter, the default backup data source.
pub struct SinaAdapter {
    /// HTTP client
    client: reqwest::Client,
    /// Priority level
    priority: u8,
}

impl SinaAdapter {
    /// Create a new adapter with backup priority.
    pub fn new(timeout_secs: u64) -> Self {
        Self::with_priority(timeout_secs, 2)
    }

    /// Create with custom priority.
    pub fn with_priority(timeout_secs: u64, priority: u8) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)")
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, priority }
    }

    /// Fetch one page of the full-market quote table.
    async fn fetch_node_page(&self, page: usize) -> Result<Vec<Value>, ProviderError> {
        let url = format!(
            "{}?page={}&num={}&sort=symbol&asc=1&node=hs_a&symbol=&_s_r_a=page",
            SINA_NODE_URL, page, NODE_PAGE_SIZE,
        );

        debug!(page, "Fetching sina quote table page");

        let response = self
            .client
            .get(&url)
            .header("Referer", "https://finance.sina.com.cn/")
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        // The endpoint answers `null` past the last page
        if body.trim() == "null" {
            return Ok(Vec::new());
        }

        serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))
    }
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for SinaAdapter {
    fn name(&self) -> &'static str {
        "sina"
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    async fn get_market_snapshot(&self) -> Result<Vec<QuoteRow>, ProviderError> {
        let mut raw_rows = Vec::new();

        for page in 1..=NODE_MAX_PAGES {
            let rows = self.fetch_node_page(page).await?;
            let last_page = rows.len() < NODE_PAGE_SIZE;
            raw_rows.extend(rows);
            if last_page {
                break;
            }
        }

        Ok(normalize_rows(&raw_rows, &NODE_FIELD_MAP))
    }

    async fn get_daily_bars(
        &self,
        code: &str,
        days: usize,
    ) -> Result<Vec<DailyBar>, ProviderError> {
        let symbol = sina_symbol(code)?;

        // scale=240 selects daily bars
        let url = format!(
            "{}?symbol={}&scale=240&ma=no&datalen={}",
            SINA_KLINE_URL, symbol, days,
        );

        debug!(code, days, "Fetching sina kline");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", response.status())));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if body.trim() == "null" || body.trim().is_empty() {
            return Err(ProviderError::DataNotAvailable(format!(
                "sina returned no kline data for {}",
                code
            )));
        }

        let rows: Vec<SinaKlineRow> =
            serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))?;

        Ok(parse_kline_rows(&rows))
    }
}

/// Parse sina k-line rows into daily bars.
///
/// Sina reports no percent-change column; it is derived downstream from the
/// previous close. Rows with unparseable fields are skipped.
fn parse_kline_rows(rows: &[SinaKlineRow]) -> Vec<DailyBar> {
    let mut bars = Vec::with_capacity(rows.len());

    for row in rows {
        let parsed = (
            NaiveDate::parse_from_str(&row.day, "%Y-%m-%d"),
            row.open.parse::<f64>(),
            row.high.parse::<f64>(),
            row.low.parse::<f64>(),
            row.close.parse::<f64>(),
            row.volume.parse::<f64>(),
        );

        let (Ok(date), Ok(open), Ok(high), Ok(low), Ok(close), Ok(volume)) = parsed else {
            warn!(day = %row.day, "Unparseable sina kline row, skipping");
            continue;
        };

        bars.push(DailyBar {
            date,
            open,
            high,
            low,
            close,
            pct_chg: None,
            volume,
        });
    }

    bars
}

// ============================================================================
// Sina API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SinaKlineRow {
    day: String,
    open: String,
    high: String,
    low: String,
    close: String,
    volume: String,
}

// ============================================================================
// Tests
// ============================================================================
