//! Signal registry for discovering and categorizing available signals.
//!
//! This module provides metadata about every derived column and builds the
//! configured set of [`Signal`] implementations.

use crate::flow::{AdvRelative, FlowSource, FlowZScore, GtgdRelative};
use crate::valuation::ValuationPercentile;
use serde::{Deserialize, Serialize};
use vnflow_traits::{AnalysisConfig, Field, Signal, SignalField};

/// Signal category classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalCategory {
    /// Normalized trading flow
    Flow,
    /// Valuation percentile
    Valuation,
    /// Combination of other signals
    Composite,
}

impl SignalCategory {
    /// Get a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &str {
        match self {
            Self::Flow => "Foreign and proprietary net flow, normalized",
            Self::Valuation => "Valuation multiples ranked against their own history",
            Self::Composite => "Weighted combination of flow and valuation signals",
        }
    }
}

/// Metadata about a signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignalInfo {
    /// Output column
    pub field: SignalField,

    /// Category classification
    pub category: SignalCategory,

    /// Human-readable description
    pub description: &'static str,

    /// Window in sessions under the default configuration
    pub typical_lookback: usize,

    /// Input fields the signal reads
    pub inputs: Vec<Field>,
}

/// Get information about all available signals.
#[must_use]
pub fn available_signals() -> Vec<SignalInfo> {
    let defaults = AnalysisConfig::default();
    vec![
        SignalInfo {
            field: SignalField::ForeignSignalAdv20,
            category: SignalCategory::Flow,
            description: "Foreign net buy as a multiple of average daily volume",
            typical_lookback: defaults.adv_window,
            inputs: vec![Field::ForeignNetBuyVal, Field::Close],
        },
        SignalInfo {
            field: SignalField::SelfSignalAdv20,
            category: SignalCategory::Flow,
            description: "Self-trading net buy as a multiple of average daily volume",
            typical_lookback: defaults.adv_window,
            inputs: vec![Field::SelfNetBuyVal, Field::Close],
        },
        SignalInfo {
            field: SignalField::SelfSignalGtgd,
            category: SignalCategory::Flow,
            description: "Self-trading net buy over gross self-trading value",
            typical_lookback: 0,
            inputs: vec![Field::SelfNetBuyVal, Field::SelfBuyVal, Field::SelfSellVal],
        },
        SignalInfo {
            field: SignalField::ForeignZscore,
            category: SignalCategory::Flow,
            description: "One-year rolling z-score of foreign net buy",
            typical_lookback: defaults.zscore_window,
            inputs: vec![Field::ForeignNetBuyVal],
        },
        SignalInfo {
            field: SignalField::SelfZscore,
            category: SignalCategory::Flow,
            description: "One-year rolling z-score of self-trading net buy",
            typical_lookback: defaults.zscore_window,
            inputs: vec![Field::SelfNetBuyVal],
        },
        SignalInfo {
            field: SignalField::PePercentile,
            category: SignalCategory::Valuation,
            description: "Three-year rolling percentile of PE",
            typical_lookback: defaults.percentile_window,
            inputs: vec![Field::Pe],
        },
        SignalInfo {
            field: SignalField::PbPercentile,
            category: SignalCategory::Valuation,
            description: "Three-year rolling percentile of PB",
            typical_lookback: defaults.percentile_window,
            inputs: vec![Field::Pb],
        },
        SignalInfo {
            field: SignalField::PcfsPercentile,
            category: SignalCategory::Valuation,
            description: "Three-year rolling percentile of price to cash flow",
            typical_lookback: defaults.percentile_window,
            inputs: vec![Field::Pcfs],
        },
        SignalInfo {
            field: SignalField::CompositeScore,
            category: SignalCategory::Composite,
            description: "Flow z-scores minus average valuation percentile",
            typical_lookback: defaults.percentile_window,
            inputs: vec![Field::ForeignNetBuyVal, Field::SelfNetBuyVal, Field::Pe, Field::Pb],
        },
    ]
}

/// Get all signals in a specific category.
#[must_use]
pub fn signals_by_category(category: &SignalCategory) -> Vec<SignalInfo> {
    available_signals()
        .into_iter()
        .filter(|info| &info.category == category)
        .collect()
}

/// Get information about a specific signal by column name.
#[must_use]
pub fn get_signal_info(name: &str) -> Option<SignalInfo> {
    available_signals()
        .into_iter()
        .find(|info| info.field.name() == name)
}

/// Builds every per-panel signal with windows taken from `config`.
///
/// The composite score is not included; it combines the outputs of these
/// signals and lives with the combiners.
pub fn build_signals(config: &AnalysisConfig) -> Vec<Box<dyn Signal>> {
    let mut signals: Vec<Box<dyn Signal>> = vec![
        Box::new(AdvRelative::foreign(config.adv_window)),
        Box::new(AdvRelative::self_trading(config.adv_window)),
        Box::new(GtgdRelative),
        Box::new(FlowZScore::of(FlowSource::Foreign, config.zscore_window)),
        Box::new(FlowZScore::of(FlowSource::SelfTrading, config.zscore_window)),
    ];
    for p in ValuationPercentile::all(config.percentile_window) {
        signals.push(Box::new(p));
    }
    signals
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_available_signals() {
        let signals = available_signals();
        assert_eq!(signals.len(), SignalField::ALL.len());

        let categories: Vec<_> = signals.iter().map(|s| s.category).collect();
        assert!(categories.contains(&SignalCategory::Flow));
        assert!(categories.contains(&SignalCategory::Valuation));
        assert!(categories.contains(&SignalCategory::Composite));
    }

    #[test]
    fn test_signals_by_category() {
        assert_eq!(signals_by_category(&SignalCategory::Flow).len(), 5);
        assert_eq!(signals_by_category(&SignalCategory::Valuation).len(), 3);
        assert_eq!(signals_by_category(&SignalCategory::Composite).len(), 1);
    }

    #[test]
    fn test_get_signal_info() {
        let info = get_signal_info("self_signal_gtgd").unwrap();
        assert_eq!(info.category, SignalCategory::Flow);
        assert_eq!(info.inputs.len(), 3);
        assert!(get_signal_info("momentum").is_none());
    }

    #[test]
    fn test_build_signals_outputs_match_registry() {
        let built = build_signals(&AnalysisConfig::default());
        assert_eq!(built.len(), 8);
        for signal in &built {
            let info = get_signal_info(signal.output().name()).unwrap();
            assert_eq!(signal.lookback(), info.typical_lookback);
            assert!(signal.required_fields().len() <= info.inputs.len());
        }
    }

    #[test]
    fn test_category_description() {
        assert!(!SignalCategory::Valuation.description().is_empty());
    }
}
