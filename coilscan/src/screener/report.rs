//! Result presentation for the caller layer.
//!
//! The engine hands back an unordered hit collection; callers present it
//! sorted by rally-day count, busiest accumulators first.

use anyhow::{Context, Result};

use super::pattern::ScreenHit;

/// Presentation wrapper over a screening run's hits.
pub struct ScreenerReport {
    hits: Vec<ScreenHit>,
}

impl ScreenerReport {
    /// Create a report; hits are sorted by `limit_up_count` descending,
    /// ties broken by code for a stable display.
    pub fn new(mut hits: Vec<ScreenHit>) -> Self {
        hits.sort_by(|a, b| {
            b.limit_up_count
                .cmp(&a.limit_up_count)
                .then_with(|| a.code.cmp(&b.code))
        });
        Self { hits }
    }

    /// Sorted hits.
    pub fn hits(&self) -> &[ScreenHit] {
        &self.hits
    }

    /// Render a plain-text table.
    pub fn to_table(&self) -> String {
        let mut out = String::new();

        out.push_str(&format!("Screen hits: {}\n", self.hits.len()));
        out.push_str(&format!(
            "{:<8} {:<12} {:>8} {:>7} {:>10} {:>9}\n",
            "code", "name", "price", "rallies", "interval%", "position%"
        ));

        for hit in &self.hits {
            out.push_str(&format!(
                "{:<8} {:<12} {:>8.2} {:>7} {:>10.2} {:>9.2}\n",
                hit.code,
                hit.name,
                hit.price,
                hit.limit_up_count,
                hit.interval_increase,
                hit.position_rank
            ));
        }

        out
    }

    /// Render the hits as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(&self.hits).context("Failed to serialize screen hits")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(code: &str, limit_up_count: usize) -> ScreenHit {
        ScreenHit {
            code: code.to_string(),
            name: format!("Stock {}", code),
            price: 12.0,
            limit_up_count,
            interval_increase: 20.0,
            position_rank: 30.0,
        }
    }

    #[test]
    fn test_sorted_by_rally_count_descending() {
        let report = ScreenerReport::new(vec![hit("000001", 1), hit("000002", 3), hit("000003", 2)]);

        let codes: Vec<&str> = report.hits().iter().map(|h| h.code.as_str()).collect();
        assert_eq!(codes, vec!["000002", "000003", "000001"]);
    }

    #[test]
    fn test_ties_broken_by_code() {
        let report = ScreenerReport::new(vec![hit("600000", 2), hit("000001", 2)]);

        let codes: Vec<&str> = report.hits().iter().map(|h| h.code.as_str()).collect();
        assert_eq!(codes, vec!["000001", "600000"]);
    }

    #[test]
    fn test_table_contains_every_hit() {
        let report = ScreenerReport::new(vec![hit("000001", 1), hit("000002", 2)]);
        let table = report.to_table();

        assert!(table.contains("000001"));
        assert!(table.contains("000002"));
        assert!(table.contains("Screen hits: 2"));
    }

    #[test]
    fn test_json_round_trip() {
        let report = ScreenerReport::new(vec![hit("000001", 1)]);
        let json = report.to_json().unwrap();

        let parsed: Vec<ScreenHit> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].code, "000001");
    }

    #[test]
    fn test_empty_report() {
        let report = ScreenerReport::new(Vec::new());
        assert!(report.hits().is_empty());
        assert!(report.to_table().contains("Screen hits: 0"));
    }
}
