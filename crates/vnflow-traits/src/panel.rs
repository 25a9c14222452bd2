//! Per-ticker merged panel.
//!
//! A [`MergedPanel`] aligns every input [`Field`] of one ticker on a shared,
//! strictly increasing date index. It is produced by [`PanelBuilder`] from
//! individual [`TimeSeries`], or converted from a polars `DataFrame`.

use crate::schema::{DATE_COLUMN, Field};
use crate::stats::pct_change;
use crate::types::{Date, Ticker, TimeSeries, date_from_epoch_days};
use crate::{Result, VnflowError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Date-aligned table of input fields for a single ticker.
///
/// Fields absent from the source are absent from the panel (not columns of
/// nulls), so a missing data source is visible through [`MergedPanel::has`]
/// and the capability views below.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPanel {
    ticker: Option<Ticker>,
    dates: Vec<Date>,
    columns: BTreeMap<Field, Vec<Option<f64>>>,
}

/// What self-trading data a panel carries.
#[derive(Debug, Clone, Copy)]
pub enum SelfTradingData<'a> {
    /// Net, gross buy, and gross sell values.
    Full {
        /// Net buy value.
        net: &'a [Option<f64>],
        /// Gross buy value.
        buy: &'a [Option<f64>],
        /// Gross sell value.
        sell: &'a [Option<f64>],
    },
    /// Only the net buy value.
    NetOnly {
        /// Net buy value.
        net: &'a [Option<f64>],
    },
    /// No self-trading data.
    Unavailable,
}

impl<'a> SelfTradingData<'a> {
    /// Net buy values, when present.
    pub const fn net(&self) -> Option<&'a [Option<f64>]> {
        match *self {
            Self::Full { net, .. } | Self::NetOnly { net } => Some(net),
            Self::Unavailable => None,
        }
    }

    /// Whether gross buy and sell values are present.
    pub const fn has_gross(&self) -> bool {
        matches!(self, Self::Full { .. })
    }
}

impl MergedPanel {
    /// Creates a panel from a date index and field columns.
    ///
    /// # Errors
    ///
    /// Returns [`VnflowError::InvalidDate`] for unsorted or duplicate dates
    /// and [`VnflowError::InvalidData`] when a column's length differs from
    /// the date index.
    pub fn new(
        dates: Vec<Date>,
        columns: impl IntoIterator<Item = (Field, Vec<Option<f64>>)>,
    ) -> Result<Self> {
        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(VnflowError::InvalidDate(format!(
                "panel dates must be strictly increasing, found {} followed by {}",
                w[0], w[1]
            )));
        }
        let mut map = BTreeMap::new();
        for (field, values) in columns {
            if values.len() != dates.len() {
                return Err(VnflowError::InvalidData(format!(
                    "column {field} has {} rows, expected {}",
                    values.len(),
                    dates.len()
                )));
            }
            let values = values.into_iter().map(|v| v.filter(|x| x.is_finite())).collect();
            map.insert(field, values);
        }
        Ok(Self {
            ticker: None,
            dates,
            columns: map,
        })
    }

    /// Attaches a ticker label.
    #[must_use]
    pub fn with_ticker(mut self, ticker: impl Into<Ticker>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// The ticker label, if set.
    pub fn ticker(&self) -> Option<&str> {
        self.ticker.as_deref()
    }

    /// The date index.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Number of rows.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the panel has no rows.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Fields present in the panel, in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = Field> + '_ {
        self.columns.keys().copied()
    }

    /// Whether `field` is present.
    pub fn has(&self, field: Field) -> bool {
        self.columns.contains_key(&field)
    }

    /// Values of `field`, if present.
    pub fn get(&self, field: Field) -> Option<&[Option<f64>]> {
        self.columns.get(&field).map(Vec::as_slice)
    }

    /// Values of `field`.
    ///
    /// # Errors
    ///
    /// Returns [`VnflowError::MissingColumn`] when the field is absent.
    pub fn require(&self, field: Field) -> Result<&[Option<f64>]> {
        self.get(field)
            .ok_or_else(|| VnflowError::MissingColumn(field.name().to_string()))
    }

    /// Foreign net buy values, if present.
    pub fn foreign_flow(&self) -> Option<&[Option<f64>]> {
        self.get(Field::ForeignNetBuyVal)
    }

    /// Which self-trading data the panel carries.
    pub fn self_trading(&self) -> SelfTradingData<'_> {
        let Some(net) = self.get(Field::SelfNetBuyVal) else {
            return SelfTradingData::Unavailable;
        };
        match (self.get(Field::SelfBuyVal), self.get(Field::SelfSellVal)) {
            (Some(buy), Some(sell)) => SelfTradingData::Full { net, buy, sell },
            _ => SelfTradingData::NetOnly { net },
        }
    }

    /// Daily close-to-close returns of the ticker.
    ///
    /// # Errors
    ///
    /// Returns [`VnflowError::MissingColumn`] without a close column.
    pub fn returns(&self) -> Result<Vec<Option<f64>>> {
        Ok(pct_change(self.require(Field::Close)?, 1))
    }

    /// Daily returns of the benchmark.
    ///
    /// # Errors
    ///
    /// Returns [`VnflowError::MissingColumn`] without a benchmark column.
    pub fn benchmark_returns(&self) -> Result<Vec<Option<f64>>> {
        Ok(pct_change(self.require(Field::BenchmarkClose)?, 1))
    }

    /// Daily ticker return minus benchmark return.
    ///
    /// # Errors
    ///
    /// Returns [`VnflowError::MissingColumn`] when either price column is absent.
    pub fn excess_returns(&self) -> Result<Vec<Option<f64>>> {
        let r = self.returns()?;
        let b = self.benchmark_returns()?;
        Ok(r.iter().zip(&b).map(|(r, b)| Some((*r)? - (*b)?)).collect())
    }

    /// Restricts the panel to rows whose date falls in `[start, end]`.
    #[must_use]
    pub fn between(&self, start: Date, end: Date) -> Self {
        let lo = self.dates.partition_point(|d| *d < start);
        let hi = self.dates.partition_point(|d| *d <= end).max(lo);
        Self {
            ticker: self.ticker.clone(),
            dates: self.dates[lo..hi].to_vec(),
            columns: self
                .columns
                .iter()
                .map(|(f, v)| (*f, v[lo..hi].to_vec()))
                .collect(),
        }
    }

    /// Coverage summary of every present field.
    pub fn summary(&self) -> PanelSummary {
        let rows = self.len();
        let fields = self
            .columns
            .iter()
            .map(|(field, values)| {
                let non_null = values.iter().filter(|v| v.is_some()).count();
                let missing_pct = if rows == 0 {
                    0.0
                } else {
                    (rows - non_null) as f64 / rows as f64 * 100.0
                };
                FieldCoverage {
                    field: *field,
                    non_null,
                    missing_pct,
                }
            })
            .collect();
        PanelSummary {
            ticker: self.ticker.clone(),
            rows,
            start: self.dates.first().copied(),
            end: self.dates.last().copied(),
            fields,
        }
    }

    /// Builds a panel from a polars frame with a `date` column.
    ///
    /// Numeric columns whose names are recognized [`Field`]s are read; other
    /// columns are ignored. Rows must already be sorted by date.
    ///
    /// # Errors
    ///
    /// Returns an error if the date column is missing or unreadable, if a
    /// field column cannot be cast to `f64`, or if dates are not increasing.
    pub fn from_dataframe(df: &DataFrame) -> Result<Self> {
        let date_col = df
            .column(DATE_COLUMN)
            .map_err(|_| VnflowError::MissingColumn(DATE_COLUMN.to_string()))?;
        let dates = date_col
            .cast(&DataType::Date)?
            .as_materialized_series()
            .date()?
            .into_iter()
            .map(|d: Option<i32>| {
                d.and_then(date_from_epoch_days)
                    .ok_or_else(|| VnflowError::InvalidDate("null or out-of-range date".to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut columns = Vec::new();
        for name in df.get_column_names() {
            let Some(field) = Field::from_name(name.as_str()) else {
                continue;
            };
            let values: Vec<Option<f64>> = df
                .column(name.as_str())?
                .cast(&DataType::Float64)?
                .as_materialized_series()
                .f64()?
                .into_iter()
                .collect();
            columns.push((field, values));
        }
        Self::new(dates, columns)
    }

    /// Converts the panel into a polars frame with a `date` column first.
    ///
    /// # Errors
    ///
    /// Returns an error if polars rejects the frame.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut cols: Vec<Column> = Vec::with_capacity(self.columns.len() + 1);
        cols.push(Column::new(DATE_COLUMN.into(), self.dates.as_slice()));
        for (field, values) in &self.columns {
            cols.push(Column::new(field.name().into(), values.as_slice()));
        }
        Ok(DataFrame::new(cols)?)
    }
}

/// Non-null count and missing share of one field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldCoverage {
    /// The field.
    pub field: Field,
    /// Number of non-null values.
    pub non_null: usize,
    /// Share of rows that are null, in percent.
    pub missing_pct: f64,
}

/// Data-quality overview of a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelSummary {
    /// Ticker label.
    pub ticker: Option<Ticker>,
    /// Number of rows.
    pub rows: usize,
    /// First date.
    pub start: Option<Date>,
    /// Last date.
    pub end: Option<Date>,
    /// Per-field coverage.
    pub fields: Vec<FieldCoverage>,
}

/// Outer-joins per-field series into a [`MergedPanel`].
///
/// The merged date index is the union of all input dates. Price fields are
/// forward-filled across the union; flow and valuation fields are not, so
/// a session missing from their source stays `None`.
///
/// # Example
///
/// ```rust,ignore
/// let panel = PanelBuilder::new()
///     .ticker("HPG")
///     .series(Field::Close, close)
///     .series(Field::ForeignNetBuyVal, foreign)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct PanelBuilder {
    ticker: Option<Ticker>,
    series: Vec<(Field, TimeSeries)>,
}

impl PanelBuilder {
    /// Creates an empty builder.
    pub const fn new() -> Self {
        Self {
            ticker: None,
            series: Vec::new(),
        }
    }

    /// Sets the ticker label.
    #[must_use]
    pub fn ticker(mut self, ticker: impl Into<Ticker>) -> Self {
        self.ticker = Some(ticker.into());
        self
    }

    /// Adds the series for one field.
    #[must_use]
    pub fn series(mut self, field: Field, series: TimeSeries) -> Self {
        self.series.push((field, series));
        self
    }

    /// Performs the outer join.
    ///
    /// # Errors
    ///
    /// Returns [`VnflowError::InvalidData`] if a field was supplied twice.
    pub fn build(self) -> Result<MergedPanel> {
        let mut seen = BTreeSet::new();
        for (field, _) in &self.series {
            if !seen.insert(*field) {
                return Err(VnflowError::InvalidData(format!("field {field} supplied twice")));
            }
        }

        let dates: Vec<Date> = self
            .series
            .iter()
            .flat_map(|(_, s)| s.dates().iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let columns = self.series.iter().map(|(field, s)| {
            let mut aligned: Vec<Option<f64>> = dates.iter().map(|d| s.get(*d)).collect();
            if field.kind().forward_fill() {
                forward_fill(&mut aligned);
            }
            (*field, aligned)
        });
        let panel = MergedPanel::new(dates.clone(), columns.collect::<Vec<_>>())?;
        tracing::debug!(
            ticker = self.ticker.as_deref().unwrap_or("-"),
            rows = panel.len(),
            fields = self.series.len(),
            "merged panel"
        );
        Ok(match self.ticker {
            Some(t) => panel.with_ticker(t),
            None => panel,
        })
    }
}

fn forward_fill(values: &mut [Option<f64>]) {
    let mut last = None;
    for v in values.iter_mut() {
        match v {
            Some(x) => last = Some(*x),
            None => *v = last,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn d(day: u32) -> Date {
        Date::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn ts(pairs: &[(u32, f64)]) -> TimeSeries {
        TimeSeries::from_pairs(pairs.iter().map(|(day, v)| (d(*day), *v))).unwrap()
    }

    #[test]
    fn test_builder_fill_policy() {
        let panel = PanelBuilder::new()
            .ticker("HPG")
            .series(Field::Close, ts(&[(1, 10.0), (3, 11.0)]))
            .series(Field::ForeignNetBuyVal, ts(&[(2, 5.0), (3, -1.0)]))
            .series(Field::Pe, ts(&[(1, 8.0)]))
            .build()
            .unwrap();

        assert_eq!(panel.ticker(), Some("HPG"));
        assert_eq!(panel.dates(), &[d(1), d(2), d(3)]);
        // price carried into day 2
        assert_eq!(panel.get(Field::Close).unwrap(), &[Some(10.0), Some(10.0), Some(11.0)]);
        // flow gap on day 1 stays missing
        assert_eq!(panel.foreign_flow().unwrap(), &[None, Some(5.0), Some(-1.0)]);
        // valuation gap stays missing
        assert_eq!(panel.get(Field::Pe).unwrap(), &[Some(8.0), None, None]);
    }

    #[test]
    fn test_builder_rejects_duplicate_field() {
        let err = PanelBuilder::new()
            .series(Field::Close, ts(&[(1, 1.0)]))
            .series(Field::Close, ts(&[(2, 1.0)]))
            .build()
            .unwrap_err();
        assert!(matches!(err, VnflowError::InvalidData(_)));
    }

    #[test]
    fn test_leading_price_gap_not_backfilled() {
        let panel = PanelBuilder::new()
            .series(Field::Close, ts(&[(2, 10.0)]))
            .series(Field::Pb, ts(&[(1, 1.5)]))
            .build()
            .unwrap();
        assert_eq!(panel.get(Field::Close).unwrap(), &[None, Some(10.0)]);
    }

    #[test]
    fn test_require_missing_column() {
        let panel = MergedPanel::new(vec![d(1)], vec![(Field::Close, vec![Some(1.0)])]).unwrap();
        let err = panel.require(Field::Pe).unwrap_err();
        assert!(matches!(err, VnflowError::MissingColumn(ref c) if c == "pe"));
    }

    #[test]
    fn test_self_trading_capability() {
        let dates = vec![d(1)];
        let net_only =
            MergedPanel::new(dates.clone(), vec![(Field::SelfNetBuyVal, vec![Some(1.0)])]).unwrap();
        assert!(matches!(net_only.self_trading(), SelfTradingData::NetOnly { .. }));
        assert!(!net_only.self_trading().has_gross());

        let full = MergedPanel::new(
            dates.clone(),
            vec![
                (Field::SelfNetBuyVal, vec![Some(1.0)]),
                (Field::SelfBuyVal, vec![Some(3.0)]),
                (Field::SelfSellVal, vec![Some(2.0)]),
            ],
        )
        .unwrap();
        assert!(full.self_trading().has_gross());

        let none = MergedPanel::new(dates, vec![(Field::Close, vec![Some(1.0)])]).unwrap();
        assert!(matches!(none.self_trading(), SelfTradingData::Unavailable));
        assert!(none.self_trading().net().is_none());
    }

    #[test]
    fn test_excess_returns() {
        let panel = MergedPanel::new(
            vec![d(1), d(2)],
            vec![
                (Field::Close, vec![Some(10.0), Some(11.0)]),
                (Field::BenchmarkClose, vec![Some(100.0), Some(105.0)]),
            ],
        )
        .unwrap();
        let excess = panel.excess_returns().unwrap();
        assert!(excess[0].is_none());
        assert_relative_eq!(excess[1].unwrap(), 0.05, epsilon = 1e-12);
    }

    #[test]
    fn test_nan_stored_as_none() {
        let panel =
            MergedPanel::new(vec![d(1)], vec![(Field::Pe, vec![Some(f64::NAN)])]).unwrap();
        assert_eq!(panel.get(Field::Pe).unwrap(), &[None]);
    }

    #[test]
    fn test_summary() {
        let panel = MergedPanel::new(
            vec![d(1), d(2), d(3), d(4)],
            vec![(Field::Pe, vec![Some(1.0), None, None, Some(2.0)])],
        )
        .unwrap();
        let summary = panel.summary();
        assert_eq!(summary.rows, 4);
        assert_eq!(summary.start, Some(d(1)));
        assert_eq!(summary.fields[0].non_null, 2);
        assert_relative_eq!(summary.fields[0].missing_pct, 50.0);
    }

    #[test]
    fn test_between() {
        let panel = MergedPanel::new(
            vec![d(1), d(2), d(3)],
            vec![(Field::Close, vec![Some(1.0), Some(2.0), Some(3.0)])],
        )
        .unwrap();
        let sub = panel.between(d(2), d(3));
        assert_eq!(sub.dates(), &[d(2), d(3)]);
        assert_eq!(sub.get(Field::Close).unwrap(), &[Some(2.0), Some(3.0)]);
    }

    #[test]
    fn test_dataframe_round_trip() {
        let df = df! {
            "date" => &[d(1), d(2)],
            "close" => &[10.0, 11.0],
            "pe" => &[Some(8.0), None],
            "volume" => &[1_i64, 2],
        }
        .unwrap();

        let panel = MergedPanel::from_dataframe(&df).unwrap();
        assert_eq!(panel.len(), 2);
        assert!(panel.has(Field::Close));
        assert_eq!(panel.get(Field::Pe).unwrap(), &[Some(8.0), None]);
        assert_eq!(panel.fields().count(), 2);

        let out = panel.to_dataframe().unwrap();
        assert_eq!(out.height(), 2);
        assert_eq!(out.width(), 3);
        assert!(out.column("close").is_ok());
    }

    #[test]
    fn test_from_dataframe_missing_date() {
        let df = df! { "close" => &[1.0] }.unwrap();
        let err = MergedPanel::from_dataframe(&df).unwrap_err();
        assert!(matches!(err, VnflowError::MissingColumn(_)));
    }
}
