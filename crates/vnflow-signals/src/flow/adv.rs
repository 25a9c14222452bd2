//! ADV-relative flow signal.

use super::FlowSource;
use serde::{Deserialize, Serialize};
use vnflow_traits::stats::rolling_mean;
use vnflow_traits::{Field, MergedPanel, Result, Signal, SignalField};

/// Configuration for the ADV-relative signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvRelativeConfig {
    /// Flow source to normalize.
    pub source: FlowSource,
    /// Rolling window of the average absolute volume (default: 20 sessions).
    pub window: usize,
}

impl Default for AdvRelativeConfig {
    fn default() -> Self {
        Self {
            source: FlowSource::Foreign,
            window: 20,
        }
    }
}

/// Net flow expressed as a multiple of typical daily flow.
///
/// Estimated share volume is `net_buy_value / close`; the signal divides it
/// by the trailing mean of the absolute estimated volume.
///
/// # Example
///
/// ```ignore
/// use vnflow_signals::flow::{AdvRelative, AdvRelativeConfig, FlowSource};
///
/// let signal = AdvRelative::new(AdvRelativeConfig { source: FlowSource::SelfTrading, window: 20 });
/// let values = signal.compute(&panel)?;
/// ```
#[derive(Debug, Clone)]
pub struct AdvRelative {
    config: AdvRelativeConfig,
    required: [Field; 2],
}

impl AdvRelative {
    /// Create a new ADV-relative signal with the given configuration.
    #[must_use]
    pub const fn new(config: AdvRelativeConfig) -> Self {
        let required = [config.source.net_field(), Field::Close];
        Self { config, required }
    }

    /// Foreign-flow signal with the given window.
    #[must_use]
    pub const fn foreign(window: usize) -> Self {
        Self::new(AdvRelativeConfig {
            source: FlowSource::Foreign,
            window,
        })
    }

    /// Self-trading signal with the given window.
    #[must_use]
    pub const fn self_trading(window: usize) -> Self {
        Self::new(AdvRelativeConfig {
            source: FlowSource::SelfTrading,
            window,
        })
    }
}

impl Default for AdvRelative {
    fn default() -> Self {
        Self::new(AdvRelativeConfig::default())
    }
}

impl Signal for AdvRelative {
    fn name(&self) -> &str {
        match self.config.source {
            FlowSource::Foreign => "foreign_adv_relative",
            FlowSource::SelfTrading => "self_adv_relative",
        }
    }

    fn output(&self) -> SignalField {
        self.config.source.adv_output()
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
        let close = panel.require(Field::Close)?;
        Ok(adv_relative(net, close, self.config.window))
    }
}

/// Computes `volume / rolling_mean(|volume|)` with `volume = net / close`.
///
/// A null or zero close leaves that row's volume null. A zero average
/// absolute volume yields null rather than infinity.
///
/// # Panics
///
/// Panics if `window` is zero or the slices differ in length.
pub fn adv_relative(net: &[Option<f64>], close: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    assert_eq!(net.len(), close.len(), "net and close must be aligned");
    let volume: Vec<Option<f64>> = net
        .iter()
        .zip(close)
        .map(|(n, c)| {
            let c = (*c).filter(|c| *c != 0.0)?;
            Some((*n)? / c)
        })
        .collect();
    let abs_volume: Vec<Option<f64>> = volume.iter().map(|v| v.map(f64::abs)).collect();
    let avg = rolling_mean(&abs_volume, window);
    volume
        .iter()
        .zip(&avg)
        .map(|(v, a)| {
            let a = (*a).filter(|a| *a > 0.0)?;
            Some((*v)? / a)
        })
        .collect()
}
