//! Signal trait for deriving per-session series from a panel.
//!
//! A [`Signal`] turns the raw fields of one [`MergedPanel`] into a derived
//! series aligned 1:1 with the panel's date index. Implementations are pure
//! functions of the panel and their own parameters; the output may contain
//! more nulls than the inputs because of rolling warm-up periods.

use crate::schema::{Field, SignalField};
use crate::{MergedPanel, Result, VnflowError};

/// A derived per-session series.
///
/// # Example
///
/// ```no_run
/// use vnflow_traits::{Field, MergedPanel, Result, Signal, SignalField};
///
/// struct RawForeignFlow;
///
/// impl Signal for RawForeignFlow {
///     fn name(&self) -> &str {
///         "foreign_raw"
///     }
///
///     fn output(&self) -> SignalField {
///         SignalField::ForeignSignalAdv20
///     }
///
///     fn lookback(&self) -> usize {
///         0
///     }
///
///     fn required_fields(&self) -> &[Field] {
///         &[Field::ForeignNetBuyVal]
///     }
///
///     fn compute(&self, panel: &MergedPanel) -> Result<Vec<Option<f64>>> {
///         Ok(panel.require(Field::ForeignNetBuyVal)?.to_vec())
///     }
/// }
/// ```
pub trait Signal: Send + Sync {
    /// Returns the name of this signal.
    ///
    /// Used for identification in logs and the signal registry.
    fn name(&self) -> &str;

    /// The derived column this signal fills.
    fn output(&self) -> SignalField;

    /// Number of sessions of history the signal's window spans.
    fn lookback(&self) -> usize;

    /// Input fields that must be present in the panel.
    fn required_fields(&self) -> &[Field];

    /// Computes the signal, one value per panel row.
    ///
    /// # Errors
    ///
    /// Returns [`VnflowError::MissingColumn`] when a required field is
    /// absent. Data gaps never produce an error; they produce `None`.
    fn compute(&self, panel: &MergedPanel) -> Result<Vec<Option<f64>>>;

    /// Checks that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`VnflowError::MissingColumn`] naming the first absent field.
    fn validate(&self, panel: &MergedPanel) -> Result<()> {
        match self.required_fields().iter().find(|f| !panel.has(**f)) {
            Some(field) => Err(VnflowError::MissingColumn(field.name().to_string())),
            None => Ok(()),
        }
    }

    /// Number of sessions before the first value can appear.
    fn warm_up(&self) -> usize {
        crate::stats::min_periods(self.lookback().max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Date;

    struct Passthrough;

    impl Signal for Passthrough {
        fn name(&self) -> &str {
            "passthrough"
        }

        fn output(&self) -> SignalField {
            SignalField::ForeignZscore
        }

        fn lookback(&self) -> usize {
            20
        }

        fn required_fields(&self) -> &[Field] {
            &[Field::ForeignNetBuyVal]
        }

        fn compute(&self, panel: &MergedPanel) -> Result<Vec<Option<f64>>> {
            self.validate(panel)?;
            Ok(panel.require(Field::ForeignNetBuyVal)?.to_vec())
        }
    }

    fn panel(field: Field) -> MergedPanel {
        let date = Date::from_ymd_opt(2024, 1, 2).unwrap();
        MergedPanel::new(vec![date], vec![(field, vec![Some(1.0)])]).unwrap()
    }

    #[test]
    fn test_signal_trait_basic() {
        let signal = Passthrough;
        assert_eq!(signal.name(), "passthrough");
        assert_eq!(signal.lookback(), 20);
        assert_eq!(signal.warm_up(), 10);
        assert_eq!(signal.compute(&panel(Field::ForeignNetBuyVal)).unwrap(), vec![Some(1.0)]);
    }

    #[test]
    fn test_validate_missing_field() {
        let err = Passthrough.compute(&panel(Field::Close)).unwrap_err();
        assert!(matches!(err, VnflowError::MissingColumn(ref c) if c == "foreign_net_buy_val"));
    }

    #[test]
    fn test_trait_object() {
        let signals: Vec<Box<dyn Signal>> = vec![Box::new(Passthrough)];
        assert_eq!(signals[0].required_fields(), &[Field::ForeignNetBuyVal]);
    }
}
