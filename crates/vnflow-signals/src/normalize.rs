//! One-pass construction of every available signal for a panel.

use crate::registry::build_signals;
use polars::prelude::*;
use std::collections::BTreeMap;
use vnflow_traits::{AnalysisConfig, DATE_COLUMN, Date, MergedPanel, Result, SignalField};

/// Derived signal columns aligned with a panel's date index.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalFrame {
    dates: Vec<Date>,
    columns: BTreeMap<SignalField, Vec<Option<f64>>>,
    skipped: Vec<(SignalField, String)>,
}

impl SignalFrame {
    /// Creates an empty frame over `dates`.
    pub const fn empty(dates: Vec<Date>) -> Self {
        Self {
            dates,
            columns: BTreeMap::new(),
            skipped: Vec::new(),
        }
    }

    /// The date index.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Number of rows.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Whether the frame has no rows.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Values of a signal, if it was computed.
    pub fn get(&self, field: SignalField) -> Option<&[Option<f64>]> {
        self.columns.get(&field).map(Vec::as_slice)
    }

    /// Computed signals, in column order.
    pub fn fields(&self) -> impl Iterator<Item = SignalField> + '_ {
        self.columns.keys().copied()
    }

    /// Signals that could not be computed, with the reason.
    pub fn skipped(&self) -> &[(SignalField, String)] {
        &self.skipped
    }

    /// Adds or replaces a column.
    ///
    /// # Panics
    ///
    /// Panics if `values` is not aligned with the date index.
    pub fn insert(&mut self, field: SignalField, values: Vec<Option<f64>>) {
        assert_eq!(values.len(), self.dates.len(), "signal column must match the date index");
        self.skipped.retain(|(f, _)| *f != field);
        self.columns.insert(field, values);
    }

    /// Records a signal that could not be computed.
    pub fn mark_skipped(&mut self, field: SignalField, reason: impl Into<String>) {
        self.skipped.push((field, reason.into()));
    }

    /// Converts the frame into a polars frame with a `date` column first.
    ///
    /// # Errors
    ///
    /// Returns an error if polars rejects the frame.
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let mut cols = vec![Column::new(DATE_COLUMN.into(), self.dates.as_slice())];
        cols.extend(
            self.columns
                .iter()
                .map(|(field, values)| Column::new(field.name().into(), values.as_slice())),
        );
        Ok(DataFrame::new(cols)?)
    }
}

/// Computes every registered signal the panel has inputs for.
///
/// Signals whose inputs are absent are skipped and listed in
/// [`SignalFrame::skipped`]; they never fail the whole pass.
///
/// # Errors
///
/// Only non-recoverable errors from a signal are returned.
pub fn normalize_all(panel: &MergedPanel, config: &AnalysisConfig) -> Result<SignalFrame> {
    let mut frame = SignalFrame::empty(panel.dates().to_vec());
    for signal in build_signals(config) {
        match signal.compute(panel) {
            Ok(values) => frame.insert(signal.output(), values),
            Err(e) if e.is_recoverable() => {
                tracing::debug!(
                    ticker = panel.ticker().unwrap_or("-"),
                    signal = signal.name(),
                    reason = %e,
                    "signal skipped"
                );
                frame.mark_skipped(signal.output(), e.to_string());
            }
            Err(e) => return Err(e),
        }
    }
    Ok(frame)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vnflow_traits::Field;

    fn panel(with_self: bool) -> MergedPanel {
        let n = 40;
        let dates: Vec<Date> = (0..n)
            .map(|i| Date::from_num_days_from_ce_opt(738_000 + i).unwrap())
            .collect();
        let mut columns = vec![
            (Field::Close, vec![Some(20.0); n as usize]),
            (
                Field::ForeignNetBuyVal,
                (0..n).map(|i| Some(((i * 13) % 7) as f64 - 3.0)).collect(),
            ),
            (Field::Pe, (0..n).map(|i| Some(8.0 + (i % 5) as f64)).collect()),
        ];
        if with_self {
            columns.push((Field::SelfNetBuyVal, (0..n).map(|i| Some((i % 3) as f64 - 1.0)).collect()));
        }
        MergedPanel::new(dates, columns).unwrap()
    }

    #[test]
    fn test_normalize_skips_missing_sources() {
        let config = AnalysisConfig {
            zscore_window: 20,
            percentile_window: 20,
            ..Default::default()
        };
        let frame = normalize_all(&panel(false), &config).unwrap();

        assert!(frame.get(SignalField::ForeignSignalAdv20).is_some());
        assert!(frame.get(SignalField::ForeignZscore).is_some());
        assert!(frame.get(SignalField::PePercentile).is_some());
        assert!(frame.get(SignalField::SelfSignalAdv20).is_none());
        assert!(frame.get(SignalField::SelfSignalGtgd).is_none());
        assert!(frame.get(SignalField::PbPercentile).is_none());

        let skipped: Vec<_> = frame.skipped().iter().map(|(f, _)| *f).collect();
        assert!(skipped.contains(&SignalField::SelfZscore));
        assert!(skipped.contains(&SignalField::PcfsPercentile));
    }

    #[test]
    fn test_normalize_with_self_trading() {
        let frame = normalize_all(&panel(true), &AnalysisConfig::default()).unwrap();
        assert!(frame.get(SignalField::SelfSignalAdv20).is_some());
        assert!(frame.get(SignalField::SelfZscore).is_some());
        // net only, no gross values
        assert!(frame.get(SignalField::SelfSignalGtgd).is_none());
    }

    #[test]
    fn test_to_dataframe() {
        let frame = normalize_all(&panel(true), &AnalysisConfig::default()).unwrap();
        let df = frame.to_dataframe().unwrap();
        assert_eq!(df.height(), 40);
        assert_eq!(df.width(), frame.fields().count() + 1);
        assert!(df.column("foreign_signal_adv20").is_ok());
    }

    #[test]
    fn test_insert_clears_skip() {
        let mut frame = SignalFrame::empty(vec![Date::from_ymd_opt(2024, 1, 2).unwrap()]);
        frame.mark_skipped(SignalField::CompositeScore, "no inputs");
        frame.insert(SignalField::CompositeScore, vec![Some(1.0)]);
        assert!(frame.skipped().is_empty());
    }
}
