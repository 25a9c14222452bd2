//! Signal creation utilities for the vnflow CLI.

use vnflow_signals::build_signals;
use vnflow_traits::{AnalysisConfig, Signal, VnflowError};

/// Create a signal instance by name.
///
/// Accepts either the output column (`foreign_signal_adv20`) or the signal
/// name (`foreign_adv_relative`). Windows come from `config`.
pub(crate) fn create_signal(name: &str, config: &AnalysisConfig) -> Result<Box<dyn Signal>, VnflowError> {
    if name == "composite_score" {
        return Err(VnflowError::InvalidData(
            "composite_score combines other signals; run the backtest without --signal".to_string(),
        ));
    }
    build_signals(config)
        .into_iter()
        .find(|s| s.output().name() == name || s.name() == name)
        .ok_or_else(|| {
            VnflowError::SignalNotFound(format!(
                "Unknown signal: '{name}'. Use 'vnflow signals' to list available signals."
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vnflow_traits::SignalField;

    #[test]
    fn test_create_by_column_and_name() {
        let config = AnalysisConfig::default();
        let by_column = create_signal("self_signal_gtgd", &config).unwrap();
        assert_eq!(by_column.output(), SignalField::SelfSignalGtgd);

        let by_name = create_signal("foreign_zscore", &config).unwrap();
        assert_eq!(by_name.lookback(), config.zscore_window);

        assert!(create_signal("pe_percentile", &config).is_ok());
    }

    #[test]
    fn test_unknown_signal() {
        let result = create_signal("momentum_12m", &AnalysisConfig::default());
        assert!(matches!(result, Err(VnflowError::SignalNotFound(_))));
    }

    #[test]
    fn test_composite_is_not_a_single_signal() {
        let result = create_signal("composite_score", &AnalysisConfig::default());
        assert!(matches!(result, Err(VnflowError::InvalidData(_))));
    }
}
