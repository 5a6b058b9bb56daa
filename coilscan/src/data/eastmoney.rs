//! Eastmoney adapter for A-share market data.
//!
//! Uses the free eastmoney push2 APIs: the `clist` endpoint for the
//! full-market quote table and the `kline` endpoint for daily history.
//! No API key, no documented rate limit.

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

/// Eastmoney full-market quote table API
const EASTMONEY_CLIST_URL: &str = "https://push2.eastmoney.com/api/qt/clist/get";

/// Eastmoney historical k-line API
const EASTMONEY_KLINE_URL: &str = "https://push2his.eastmoney.com/api/qt/stock/kline/get";

/// Market filter: SZ main/ChiNext + SH main/STAR boards (all A-shares)
const CLIST_MARKETS: &str = "m:0+t:6,m:0+t:80,m:1+t:2,m:1+t:23";

/// Snapshot page size; the full market is ~5600 symbols
const CLIST_PAGE_SIZE: usize = 1000;

/// Upper bound on snapshot pages, in case the endpoint misreports totals
const CLIST_MAX_PAGES: usize = 10;

/// Column mapping for the clist quote table.
///
/// f2=price, f3=pct_chg, f9=dynamic PE, f12=code, f14=name,
/// f20=total market cap (yuan).
const CLIST_FIELD_MAP: FieldMap = FieldMap {
    provider: "eastmoney",
    code: "f12",
    name: "f14",
    price: "f2",
    pe: "f9",
    total_mv: "f20",
    pct_chg: "f3",
    total_mv_scale: 1.0,
};

// ============================================================================
// Symbol Mapping
// ============================================================================

/// Convert a bare 6-digit code to the eastmoney secid format.
///
/// Shanghai codes (6xx/9xx) map to market 1, everything else to market 0.
fn secid_for(code: &str) -> Result<String, ProviderError> {
    if code.is_empty() || !code.chars().all(|c| c.is_ascii_digit()) {
        return Err(ProviderError::InvalidRequest(format!(
            "not a numeric security code: {:?}",
            code
        )));
    }

    let market = match code.as_bytes()[0] {
        b'6' | b'9' => "1",
        _ => "0",
    };

    Ok(format!("{}.{}", market, code))
}

// ============================================================================
// Eastmoney Adapter
// ============================================================================

/// Eastmoney adapter, the default primary data source.
pub struct EastmoneyAdapter {
    /// HTTP client
    client: reqwest::Client,
    /// Priority level
    priority: u8,
}

impl EastmoneyAdapter {
    /// Create a new adapter with the default (highest) priority.
    pub fn new(timeout_secs: u64) -> Self {
        Self::with_priority(timeout_secs, 1)
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
    async fn fetch_clist_page(&self, page: usize) -> Result<Vec<Value>, ProviderError> {
        let url = format!(
            "{}?pn={}&pz={}&po=1&np=1&fltt=2&invt=2&fid=f3&fs={}&fields=f2,f3,f9,f12,f14,f20",
            EASTMONEY_CLIST_URL, page, CLIST_PAGE_SIZE, CLIST_MARKETS,
        );

        debug!(page, "Fetching eastmoney quote table page");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", response.status())));
        }

        let data: ClistResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if data.rc != 0 {
            return Err(ProviderError::Unavailable(format!(
                "eastmoney API error: rc={}",
                data.rc
            )));
        }

        Ok(data.data.and_then(|d| d.diff).unwrap_or_default())
    }

    /// Fetch k-line rows from the kline endpoint.
    async fn fetch_kline(
        &self,
        code: &str,
        limit: usize,
    ) -> Result<Vec<DailyBar>, ProviderError> {
        let secid = secid_for(code)?;

        // klt=101 daily, fqt=1 forward-adjusted
        let url = format!(
            "{}?secid={}&klt=101&fqt=1&lmt={}&end=20500101&fields1=f1,f2,f3,f4,f5,f6&fields2=f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61",
            EASTMONEY_KLINE_URL, secid, limit,
        );

        debug!(code, limit, "Fetching eastmoney kline");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Network(format!("HTTP {}", response.status())));
        }

        let data: KlineResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        if data.rc != 0 {
            return Err(ProviderError::DataNotAvailable(format!(
                "eastmoney API error for {}: rc={}",
                code, data.rc
            )));
        }

        let klines = data.data.and_then(|d| d.klines).unwrap_or_default();
        Ok(parse_klines(&klines))
    }
}

/// Parse eastmoney kline CSV rows into daily bars.
///
/// Row format with the fields requested above:
/// `date,open,close,high,low,volume,amount,amplitude,pct_chg,change,turnover`.
/// Rows whose OHLC fields do not parse are skipped; a missing percent-change
/// column degrades to `None` rather than dropping the bar.
fn parse_klines(klines: &[String]) -> Vec<DailyBar> {
    let mut bars = Vec::with_capacity(klines.len());

    for line in klines {
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 6 {
            warn!(line = %line, "Invalid kline row, skipping");
            continue;
        }

        let parsed = (
            NaiveDate::parse_from_str(parts[0], "%Y-%m-%d"),
            parts[1].parse::<f64>(),
            parts[2].parse::<f64>(),
            parts[3].parse::<f64>(),
            parts[4].parse::<f64>(),
            parts[5].parse::<f64>(),
        );

        let (Ok(date), Ok(open), Ok(close), Ok(high), Ok(low), Ok(volume)) = parsed else {
            warn!(line = %line, "Unparseable kline row, skipping");
            continue;
        };

        let pct_chg = parts.get(8).and_then(|s| s.parse::<f64>().ok());

        bars.push(DailyBar {
            date,
            open,
            high,
            low,
            close,
            pct_chg,
            volume,
        });
    }

    bars
}

// ============================================================================
// MarketDataProvider Implementation
// ============================================================================

#[async_trait]
impl MarketDataProvider for EastmoneyAdapter {
    fn name(&self) -> &'static str {
        "eastmoney"
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    async fn get_market_snapshot(&self) -> Result<Vec<QuoteRow>, ProviderError> {
        let mut raw_rows = Vec::new();

        for page in 1..=CLIST_MAX_PAGES {
            let rows = self.fetch_clist_page(page).await?;
            let last_page = rows.len() < CLIST_PAGE_SIZE;
            raw_rows.extend(rows);
            if last_page {
                break;
            }
        }

        Ok(normalize_rows(&raw_rows, &CLIST_FIELD_MAP))
    }

    async fn get_daily_bars(
        &self,
        code: &str,
        days: usize,
    ) -> Result<Vec<DailyBar>, ProviderError> {
        self.fetch_kline(code, days).await
    }
}

// ============================================================================
// Eastmoney API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ClistResponse {
    /// Return code (0 = success)
    rc: i32,
    data: Option<ClistData>,
}

#[derive(Debug, Deserialize)]
struct ClistData {
    /// Raw quote rows, keyed by eastmoney field codes
    diff: Option<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct KlineResponse {
    /// Return code (0 = success)
    rc: i32,
    data: Option<KlineData>,
}

#[derive(Debug, Deserialize)]
struct KlineData {
    /// K-line rows as CSV strings
    klines: Option<Vec<String>>,
}

// ============================================================================
// Tests
// ============================================================================
