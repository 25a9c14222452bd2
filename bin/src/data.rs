//! Panel loading for the vnflow CLI.
//!
//! A panel file is JSON: either an array of row records, or an object with
//! an optional `ticker` and a `rows` array. Every row needs a `date`
//! (`YYYY-MM-DD`); other keys are column names from the field schema, with
//! a number or `null` as value. Unknown columns are ignored.
//!
//! ```json
//! {"ticker": "HPG", "rows": [{"date": "2024-01-02", "close": 27.5, "foreign_net_buy_val": 1.2e10}]}
//! ```

use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;
use vnflow_traits::{DATE_COLUMN, Field, MergedPanel, PanelBuilder, TimeSeries, VnflowError};

type Row = BTreeMap<String, serde_json::Value>;

#[derive(Deserialize)]
#[serde(untagged)]
enum PanelFile {
    Rows(Vec<Row>),
    Tagged { ticker: Option<String>, rows: Vec<Row> },
}

/// Parse a date string in YYYY-MM-DD format.
pub(crate) fn parse_date(date_str: &str) -> Result<NaiveDate, VnflowError> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|e| VnflowError::InvalidDate(format!("Invalid date format '{date_str}': {e}")))
}

/// Parse panel JSON. `default_ticker` labels panels whose file names none.
pub(crate) fn parse_panel(json: &str, default_ticker: Option<&str>) -> Result<MergedPanel, VnflowError> {
    let (ticker, rows) = match serde_json::from_str(json)? {
        PanelFile::Rows(rows) => (None, rows),
        PanelFile::Tagged { ticker, rows } => (ticker, rows),
    };

    let mut dated = Vec::with_capacity(rows.len());
    for row in &rows {
        let date = row
            .get(DATE_COLUMN)
            .and_then(serde_json::Value::as_str)
            .ok_or_else(|| VnflowError::InvalidData("row without a date string".to_string()))?;
        dated.push((parse_date(date)?, row));
    }
    dated.sort_by_key(|(d, _)| *d);

    let mut columns: BTreeMap<Field, Vec<(NaiveDate, f64)>> = BTreeMap::new();
    let mut ignored = BTreeSet::new();
    for (date, row) in &dated {
        for (key, value) in *row {
            if key == DATE_COLUMN {
                continue;
            }
            let Some(field) = Field::from_name(key) else {
                ignored.insert(key.as_str());
                continue;
            };
            let entry = columns.entry(field).or_default();
            if let Some(v) = value.as_f64() {
                entry.push((*date, v));
            } else if !value.is_null() {
                return Err(VnflowError::InvalidData(format!("{key} on {date} is not a number")));
            }
        }
    }
    if !ignored.is_empty() {
        debug!(columns = ?ignored, "ignoring unknown columns");
    }

    let mut builder = PanelBuilder::new();
    if let Some(t) = ticker.as_deref().or(default_ticker) {
        builder = builder.ticker(t);
    }
    for (field, pairs) in columns {
        builder = builder.series(field, TimeSeries::from_pairs(pairs)?);
    }
    builder.build()
}

/// Load a panel file; the file stem is the fallback ticker.
pub(crate) fn load_panel(path: &Path) -> Result<MergedPanel, VnflowError> {
    let json = std::fs::read_to_string(path)?;
    let stem = path.file_stem().and_then(|s| s.to_str());
    parse_panel(&json, stem)
}

/// Restrict a panel to an optional date range.
pub(crate) fn clip(
    panel: MergedPanel,
    start: Option<&str>,
    end: Option<&str>,
) -> Result<MergedPanel, VnflowError> {
    if start.is_none() && end.is_none() {
        return Ok(panel);
    }
    let start = start.map(parse_date).transpose()?.unwrap_or(NaiveDate::MIN);
    let end = end.map(parse_date).transpose()?.unwrap_or(NaiveDate::MAX);
    Ok(panel.between(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-01-15").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_date_invalid() {
        let result = parse_date("invalid");
        assert!(matches!(result, Err(VnflowError::InvalidDate(_))));
    }

    #[test]
    fn test_parse_rows() {
        let json = r#"[
            {"date": "2024-01-03", "close": 11.0, "foreign_net_buy_val": null, "sector": "steel"},
            {"date": "2024-01-02", "close": 10.0, "foreign_net_buy_val": 5.0}
        ]"#;
        let panel = parse_panel(json, Some("HPG")).unwrap();
        assert_eq!(panel.ticker(), Some("HPG"));
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.get(Field::Close).unwrap(), &[Some(10.0), Some(11.0)]);
        assert_eq!(panel.foreign_flow().unwrap(), &[Some(5.0), None]);
    }

    #[test]
    fn test_parse_tagged_and_alias() {
        let json = r#"{"ticker": "VCB", "rows": [
            {"date": "2024-01-02", "close": 90.0, "vnindex_close": 1150.0},
            {"date": "2024-01-03", "vnindex_close": 1160.0}
        ]}"#;
        let panel = parse_panel(json, Some("ignored")).unwrap();
        assert_eq!(panel.ticker(), Some("VCB"));
        // Close is a price and carries forward.
        assert_eq!(panel.get(Field::Close).unwrap(), &[Some(90.0), Some(90.0)]);
        assert!(panel.has(Field::BenchmarkClose));
    }

    #[test]
    fn test_parse_rejects_bad_rows() {
        assert!(parse_panel(r#"[{"close": 1.0}]"#, None).is_err());
        assert!(parse_panel(r#"[{"date": "2024-01-02", "close": "x"}]"#, None).is_err());
        let dup = r#"[{"date": "2024-01-02", "close": 1.0}, {"date": "2024-01-02", "close": 2.0}]"#;
        assert!(matches!(parse_panel(dup, None), Err(VnflowError::InvalidDate(_))));
    }

    #[test]
    fn test_clip() {
        let json = r#"[
            {"date": "2024-01-02", "close": 1.0},
            {"date": "2024-01-03", "close": 2.0},
            {"date": "2024-01-04", "close": 3.0}
        ]"#;
        let panel = parse_panel(json, None).unwrap();
        assert_eq!(clip(panel.clone(), None, None).unwrap().len(), 3);
        assert_eq!(clip(panel.clone(), Some("2024-01-03"), None).unwrap().len(), 2);
        assert_eq!(clip(panel, Some("2024-01-03"), Some("2024-01-03")).unwrap().len(), 1);
    }
}
