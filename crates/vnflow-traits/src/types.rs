//! Common types used throughout the vnflow toolkit.
//!
//! This module defines dates, ticker identifiers, and the validated
//! [`TimeSeries`] container that every per-ticker input arrives as.

use crate::{Result, VnflowError};
use serde::{Deserialize, Serialize};

// Re-export date type from chrono
pub use chrono::NaiveDate as Date;

/// A ticker identifier such as "HPG" or "VCB".
pub type Ticker = String;

/// Offset between chrono's day-of-common-era count and the Unix epoch.
///
/// Polars `Date` columns store days since 1970-01-01.
pub const CE_TO_UNIX_EPOCH_DAYS: i32 = 719_163;

/// Converts a polars date value (days since the Unix epoch) into a [`Date`].
pub fn date_from_epoch_days(days: i32) -> Option<Date> {
    Date::from_num_days_from_ce_opt(days + CE_TO_UNIX_EPOCH_DAYS)
}

/// Converts a [`Date`] into days since the Unix epoch.
pub fn date_to_epoch_days(date: Date) -> i32 {
    use chrono::Datelike;
    date.num_days_from_ce() - CE_TO_UNIX_EPOCH_DAYS
}

/// An ordered sequence of `(date, value)` observations for one ticker.
///
/// Dates are unique and strictly increasing. Missing sessions are absent
/// dates; a present date may still carry a `None` value when the source
/// reported the session without a number. Non-finite inputs are stored as
/// `None` so that "no data" is never confused with zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    dates: Vec<Date>,
    values: Vec<Option<f64>>,
}

impl TimeSeries {
    /// Creates a new series after validating the date index.
    ///
    /// # Errors
    ///
    /// Returns [`VnflowError::InvalidData`] when the two vectors differ in
    /// length and [`VnflowError::InvalidDate`] when dates are not strictly
    /// increasing.
    pub fn new(dates: Vec<Date>, values: Vec<Option<f64>>) -> Result<Self> {
        if dates.len() != values.len() {
            return Err(VnflowError::InvalidData(format!(
                "{} dates but {} values",
                dates.len(),
                values.len()
            )));
        }
        if let Some(w) = dates.windows(2).find(|w| w[0] >= w[1]) {
            return Err(VnflowError::InvalidDate(format!(
                "dates must be strictly increasing, found {} followed by {}",
                w[0], w[1]
            )));
        }
        let values = values
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect();
        Ok(Self { dates, values })
    }

    /// Builds a series from `(date, value)` pairs, treating NaN as missing.
    ///
    /// # Errors
    ///
    /// Same as [`TimeSeries::new`].
    pub fn from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Date, f64)>,
    {
        let (dates, values): (Vec<_>, Vec<_>) = pairs.into_iter().map(|(d, v)| (d, Some(v))).unzip();
        Self::new(dates, values)
    }

    /// Returns the date index.
    pub fn dates(&self) -> &[Date] {
        &self.dates
    }

    /// Returns the values aligned with [`TimeSeries::dates`].
    pub fn values(&self) -> &[Option<f64>] {
        &self.values
    }

    /// Returns the number of observations.
    pub const fn len(&self) -> usize {
        self.dates.len()
    }

    /// Returns whether the series has no observations.
    pub const fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Looks up the value recorded on `date`.
    pub fn get(&self, date: Date) -> Option<f64> {
        self.dates
            .binary_search(&date)
            .ok()
            .and_then(|i| self.values[i])
    }

    /// Number of non-null values.
    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// Iterates over `(date, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Date, Option<f64>)> + '_ {
        self.dates.iter().copied().zip(self.values.iter().copied())
    }
}
