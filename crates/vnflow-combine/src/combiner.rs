//! Core trait definition for signal combiners.

use ndarray::Array1;
use vnflow_traits::{Result, SignalField, VnflowError};

/// One signal column prepared for combination.
///
/// Scores are dense: missing values have already been replaced by the fill
/// value the combiner's missing-data policy asks for.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalScore {
    /// Which signal the scores came from.
    pub field: SignalField,

    /// One score per session.
    pub scores: Array1<f64>,
}

impl SignalScore {
    /// Builds a dense score column, replacing missing values with `fill`.
    pub fn from_nullable(field: SignalField, values: &[Option<f64>], fill: f64) -> Self {
        Self {
            field,
            scores: values.iter().map(|v| v.unwrap_or(fill)).collect(),
        }
    }
}

/// Common length of a set of score columns.
///
/// # Errors
///
/// Returns [`VnflowError::InvalidData`] if `signals` is empty or the
/// columns differ in length.
pub fn common_length(signals: &[SignalScore]) -> Result<usize> {
    let first = signals
        .first()
        .ok_or_else(|| VnflowError::InvalidData("no signals to combine".into()))?;
    let n = first.scores.len();
    if let Some(bad) = signals.iter().find(|s| s.scores.len() != n) {
        return Err(VnflowError::InvalidData(format!(
            "signal {} has {} rows, expected {n}",
            bad.field,
            bad.scores.len()
        )));
    }
    Ok(n)
}

/// Combines multiple signal columns into one score.
///
/// Implementations must be thread-safe so universes can be scored in parallel.
///
/// # Examples
///
/// ```rust,no_run
/// use ndarray::Array1;
/// use vnflow_combine::{Combiner, SignalScore};
///
/// struct FirstOnly;
///
/// impl Combiner for FirstOnly {
///     fn combine(&self, signals: &[SignalScore]) -> vnflow_traits::Result<Array1<f64>> {
///         Ok(signals[0].scores.clone())
///     }
///
///     fn name(&self) -> &str {
///         "first_only"
///     }
/// }
/// ```
pub trait Combiner: Send + Sync {
    /// Combine score columns into one column of the same length.
    ///
    /// # Errors
    ///
    /// Returns an error if no signals are given, the columns differ in
    /// length, or a column is not an input this combiner understands.
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>>;

    /// Name of this combination strategy.
    fn name(&self) -> &str;
}
