//! Rolling z-score of raw net flow.

use super::FlowSource;
use serde::{Deserialize, Serialize};
use vnflow_traits::stats::rolling_zscore;
use vnflow_traits::{Field, MergedPanel, Result, Signal, SignalField};

/// Configuration for the flow z-score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowZScoreConfig {
    /// Flow source to standardize.
    pub source: FlowSource,
    /// Rolling window (default: 252 sessions, one year).
    pub window: usize,
}

impl Default for FlowZScoreConfig {
    fn default() -> Self {
        Self {
            source: FlowSource::Foreign,
            window: 252,
        }
    }
}

/// Rolling z-score of a net-buy-value series.
///
/// Puts foreign and self flows on a comparable scale before they are summed
/// into the composite score.
#[derive(Debug, Clone)]
pub struct FlowZScore {
    config: FlowZScoreConfig,
    required: [Field; 1],
}

impl FlowZScore {
    /// Create a new z-score signal with the given configuration.
    #[must_use]
    pub const fn new(config: FlowZScoreConfig) -> Self {
        let required = [config.source.net_field()];
        Self { config, required }
    }

    /// Z-score of the given source over `window` sessions.
    #[must_use]
    pub const fn of(source: FlowSource, window: usize) -> Self {
        Self::new(FlowZScoreConfig { source, window })
    }
}

impl Default for FlowZScore {
    fn default() -> Self {
        Self::new(FlowZScoreConfig::default())
    }
}

impl Signal for FlowZScore {
    fn name(&self) -> &str {
        match self.config.source {
            FlowSource::Foreign => "foreign_zscore",
            FlowSource::SelfTrading => "self_zscore",
        }
    }

    fn output(&self) -> SignalField {
        self.config.source.zscore_output()
    }

    fn lookback(&self) -> usize {
        self.config.window
    }

    fn required_fields(&self) -> &[Field] {
        &self.required
    }

    fn compute(&self, panel: &MergedPanel) -> Result<Vec<Option<f64>>> {
        self.validate(panel)?;
        let net = panel.require(self.config.source.net_field())?;
        Ok(rolling_zscore(net, self.config.window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vnflow_traits::Date;

    #[test]
    fn test_zscore_signal() {
        let n = 30;
        let dates: Vec<Date> = (0..n)
            .map(|i| Date::from_num_days_from_ce_opt(738_000 + i).unwrap())
            .collect();
        let flow: Vec<Option<f64>> = (0..n).map(|i| Some(((i * 7) % 11) as f64)).collect();
        let panel = MergedPanel::new(dates, vec![(Field::ForeignNetBuyVal, flow)]).unwrap();

        let signal = FlowZScore::of(FlowSource::Foreign, 10);
        assert_eq!(signal.output(), SignalField::ForeignZscore);
        let z = signal.compute(&panel).unwrap();
        assert!(z[..4].iter().all(Option::is_none));
        assert!(z[4..].iter().all(Option::is_some));
    }
}
