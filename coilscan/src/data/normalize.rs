//! Snapshot normalization.
//!
//! Each quote source reports the same quantities under different column
//! names and units. A [`FieldMap`] declares, per provider, which raw key
//! holds each canonical column; [`normalize_rows`] applies the map, drops
//! everything unmapped, and coerces numerics. Values that fail coercion
//! (placeholder `"-"`, null, junk strings) become missing rather than
//! raising.

use serde_json::Value;

use super::QuoteRow;

// ============================================================================
// Field Mapping
// ============================================================================

/// Declarative mapping from one provider's raw column names to the
/// canonical [`QuoteRow`] schema.
#[derive(Debug, Clone, Copy)]
pub struct FieldMap {
    /// Provider label, for diagnostics
    pub provider: &'static str,
    /// Raw key holding the security code
    pub code: &'static str,
    /// Raw key holding the security name
    pub name: &'static str,
    /// Raw key holding the latest price
    pub price: &'static str,
    /// Raw key holding the P/E ratio
    pub pe: &'static str,
    /// Raw key holding the total market capitalization
    pub total_mv: &'static str,
    /// Raw key holding the daily percent change
    pub pct_chg: &'static str,
    /// Multiplier converting the raw market-cap value into yuan
    pub total_mv_scale: f64,
}

/// Coerce a raw JSON value into a number.
///
/// Accepts JSON numbers and numeric strings; everything else (including the
/// `"-"` placeholder providers use for suspended stocks) is missing.
pub fn coerce_numeric(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Coerce a raw JSON value into a string (codes arrive quoted or bare).
fn coerce_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Normalize one raw provider row into the canonical schema.
///
/// Returns `None` when the row carries no usable security code; such rows
/// cannot be referenced downstream and are dropped.
fn normalize_row(raw: &Value, map: &FieldMap) -> Option<QuoteRow> {
    let obj = raw.as_object()?;

    let code = coerce_string(obj.get(map.code))?;
    let name = coerce_string(obj.get(map.name)).unwrap_or_default();

    Some(QuoteRow {
        code,
        name,
        price: coerce_numeric(obj.get(map.price)),
        pe: coerce_numeric(obj.get(map.pe)),
        total_mv: coerce_numeric(obj.get(map.total_mv)).map(|v| v * map.total_mv_scale),
        pct_chg: coerce_numeric(obj.get(map.pct_chg)),
    })
}

/// Normalize a batch of raw provider rows.
pub fn normalize_rows(rows: &[Value], map: &FieldMap) -> Vec<QuoteRow> {
    let normalized: Vec<QuoteRow> = rows.iter().filter_map(|r| normalize_row(r, map)).collect();

    let dropped = rows.len() - normalized.len();
    if dropped > 0 {
        tracing::debug!(
            provider = map.provider,
            dropped,
            "Dropped rows without a usable code during normalization"
        );
    }

    normalized
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEST_MAP: FieldMap = FieldMap {
        provider: "test",
        code: "c",
        name: "n",
        price: "p",
        pe: "pe",
        total_mv: "mv",
        pct_chg: "chg",
        total_mv_scale: 1.0,
    };

    #[test]
    fn test_coerce_numeric_variants() {
        assert_eq!(coerce_numeric(Some(&json!(12.5))), Some(12.5));
        assert_eq!(coerce_numeric(Some(&json!("12.5"))), Some(12.5));
        assert_eq!(coerce_numeric(Some(&json!(" 3 "))), Some(3.0));
        assert_eq!(coerce_numeric(Some(&json!("-"))), None);
        assert_eq!(coerce_numeric(Some(&json!(null))), None);
        assert_eq!(coerce_numeric(Some(&json!(["x"]))), None);
        assert_eq!(coerce_numeric(None), None);
    }

    #[test]
    fn test_normalize_row_maps_and_drops() {
        let raw = json!({
            "c": "000001",
            "n": "Ping An Bank",
            "p": 10.5,
            "pe": "12.3",
            "mv": 5e9,
            "chg": 2.1,
            "unmapped": "ignored"
        });

        let rows = normalize_rows(std::slice::from_ref(&raw), &TEST_MAP);
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.code, "000001");
        assert_eq!(row.name, "Ping An Bank");
        assert_eq!(row.price, Some(10.5));
        assert_eq!(row.pe, Some(12.3));
        assert_eq!(row.total_mv, Some(5e9));
        assert_eq!(row.pct_chg, Some(2.1));
    }

    #[test]
    fn test_normalize_row_placeholder_becomes_missing() {
        let raw = json!({
            "c": "000002",
            "n": "Suspended Co",
            "p": "-",
            "pe": "-",
            "mv": "-",
            "chg": "-"
        });

        let rows = normalize_rows(std::slice::from_ref(&raw), &TEST_MAP);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].price, None);
        assert_eq!(rows[0].pe, None);
        assert_eq!(rows[0].total_mv, None);
        assert_eq!(rows[0].pct_chg, None);
    }

    #[test]
    fn test_normalize_rows_drops_codeless() {
        let rows = vec![
            json!({ "c": "600000", "n": "ok", "p": 9.0 }),
            json!({ "n": "no code", "p": 9.0 }),
            json!({ "c": "", "n": "empty code", "p": 9.0 }),
            json!("not an object"),
        ];

        let normalized = normalize_rows(&rows, &TEST_MAP);
        assert_eq!(normalized.len(), 1);
        assert_eq!(normalized[0].code, "600000");
    }

    #[test]
    fn test_market_cap_scale() {
        let scaled = FieldMap {
            total_mv_scale: 1e4,
            ..TEST_MAP
        };
        let raw = json!({ "c": "000001", "n": "x", "mv": 500_000.0 });

        let rows = normalize_rows(std::slice::from_ref(&raw), &scaled);
        assert_eq!(rows[0].total_mv, Some(5e9));
    }

    #[test]
    fn test_numeric_code_is_stringified() {
        let raw = json!({ "c": 600000, "n": "num code" });
        let rows = normalize_rows(std::slice::from_ref(&raw), &TEST_MAP);
        assert_eq!(rows[0].code, "600000");
    }
}
