//! IC decay across forward-return horizons.
//!
//! Shows how quickly a signal's predictive power fades as the holding period
//! grows, which tells a researcher which horizon to trade it at.

use crate::correlation::{CorrelationMethod, IcResult, information_coefficient};
use crate::forward::ForwardReturns;
use crate::result::SignificanceConfig;
use serde::{Deserialize, Serialize};

/// IC measured at each horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayCurve {
    /// Horizons in sessions, ascending.
    pub horizons: Vec<usize>,
    /// IC per horizon; `None` where it could not be computed.
    pub ic_values: Vec<Option<f64>>,
}

impl DecayCurve {
    /// Pairs horizons with their ICs.
    ///
    /// # Panics
    ///
    /// Panics if the two vectors differ in length.
    pub fn new(horizons: Vec<usize>, ic_values: Vec<Option<f64>>) -> Self {
        assert_eq!(horizons.len(), ic_values.len(), "one IC per horizon");
        Self { horizons, ic_values }
    }

    /// IC at `horizon`, linearly interpolated between measured neighbours.
    pub fn ic_at_horizon(&self, horizon: usize) -> Option<f64> {
        if let Some(pos) = self.horizons.iter().position(|&h| h == horizon) {
            return self.ic_values[pos];
        }

        self.horizons.windows(2).zip(self.ic_values.windows(2)).find_map(|(h, ic)| {
            if !(h[0] < horizon && horizon < h[1]) {
                return None;
            }
            let (ic1, ic2) = (ic[0]?, ic[1]?);
            let weight = (horizon - h[0]) as f64 / (h[1] - h[0]) as f64;
            Some(ic1 + weight * (ic2 - ic1))
        })
    }

    /// Horizon at which |IC| first falls to half its value at the shortest horizon.
    ///
    /// Interpolates between the two horizons that bracket the crossing.
    /// Returns `None` if the first IC is missing or |IC| never halves.
    pub fn half_life(&self) -> Option<f64> {
        let half = self.ic_values.first().copied().flatten()?.abs() / 2.0;

        self.horizons.windows(2).zip(self.ic_values.windows(2)).find_map(|(h, ic)| {
            let (a, b) = (ic[0]?.abs(), ic[1]?.abs());
            if a >= half && b <= half && a > b {
                let weight = (a - half) / (a - b);
                Some(h[0] as f64 + weight * (h[1] - h[0]) as f64)
            } else {
                None
            }
        })
    }
}

/// Decay summary for one signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecayAnalysis {
    /// IC by horizon.
    pub curve: DecayCurve,
    /// Full IC results by horizon.
    pub results: Vec<IcResult>,
    /// Half-life in sessions.
    pub half_life: Option<f64>,
    /// Horizon with the largest |IC| and that IC.
    pub peak: Option<(usize, f64)>,
    /// |IC| never increases with horizon.
    pub is_monotonic: bool,
}

impl DecayAnalysis {
    /// Builds the analysis from one IC result per horizon.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use vnflow_eval::DecayAnalysis;
    ///
    /// let analysis = DecayAnalysis::analyze(&[1, 5, 10, 20], |h| ic_at(h));
    /// ```
    pub fn analyze<F>(horizons: &[usize], mut ic_at: F) -> Self
    where
        F: FnMut(usize) -> IcResult,
    {
        let results: Vec<IcResult> = horizons.iter().map(|h| ic_at(*h)).collect();
        let ic_values: Vec<Option<f64>> = results.iter().map(|r| r.ic).collect();
        let curve = DecayCurve::new(horizons.to_vec(), ic_values);

        let peak = curve
            .horizons
            .iter()
            .zip(&curve.ic_values)
            .filter_map(|(h, ic)| ic.map(|ic| (*h, ic)))
            .max_by(|a, b| a.1.abs().total_cmp(&b.1.abs()));
        let measured: Vec<f64> = curve.ic_values.iter().flatten().map(|ic| ic.abs()).collect();
        let is_monotonic = measured.windows(2).all(|w| w[0] >= w[1]);

        Self {
            half_life: curve.half_life(),
            curve,
            results,
            peak,
            is_monotonic,
        }
    }
}

/// IC decay of `signal` against each horizon of a forward-return table.
pub fn ic_decay(
    signal: &[Option<f64>],
    forward: &ForwardReturns,
    method: CorrelationMethod,
    config: &SignificanceConfig,
) -> DecayAnalysis {
    DecayAnalysis::analyze(forward.horizons(), |h| {
        let returns = forward.get(h).unwrap_or_default();
        information_coefficient(signal, returns, method, config)
    })
}
