//! Flow-minus-valuation composite score.
//!
//! `score = z(foreign) [+ z(self)] - mean(pe_percentile, pb_percentile) / 100`
//!
//! Heavy buying raises the score and an expensive valuation lowers it. A
//! session missing a flow z-score contributes zero for it and a missing
//! percentile is read as the neutral 50th, so every session gets a score
//! from whatever inputs it has. A valuation column absent from the frame
//! altogether is left out of the average.

use crate::combiner::{Combiner, SignalScore, common_length};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vnflow_signals::SignalFrame;
use vnflow_traits::{Result, SignalField, VnflowError};

/// Configuration for the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeConfig {
    /// Add the self-trading z-score to the foreign one.
    pub use_self_trading: bool,
    /// Percentile assumed where a valuation percentile is missing.
    pub neutral_percentile: f64,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            use_self_trading: true,
            neutral_percentile: 50.0,
        }
    }
}

/// Builds the composite score from a [`SignalFrame`].
#[derive(Debug, Clone, Default)]
pub struct CompositeScorer {
    config: CompositeConfig,
}

impl CompositeScorer {
    /// Create a new scorer with the given configuration.
    pub const fn new(config: CompositeConfig) -> Self {
        Self { config }
    }

    /// Flow fields added to the score.
    fn flow_fields(&self) -> &'static [SignalField] {
        if self.config.use_self_trading {
            &[SignalField::ForeignZscore, SignalField::SelfZscore]
        } else {
            &[SignalField::ForeignZscore]
        }
    }

    /// Dense inputs available in `frame`, with missing values filled.
    pub fn inputs(&self, frame: &SignalFrame) -> Vec<SignalScore> {
        let flows = self
            .flow_fields()
            .iter()
            .filter_map(|f| frame.get(*f).map(|v| SignalScore::from_nullable(*f, v, 0.0)));
        let valuations = [SignalField::PePercentile, SignalField::PbPercentile]
            .into_iter()
            .filter_map(|f| {
                frame
                    .get(f)
                    .map(|v| SignalScore::from_nullable(f, v, self.config.neutral_percentile))
            });
        flows.chain(valuations).collect()
    }

    /// Composite score for every session of `frame`.
    ///
    /// A frame with none of the inputs scores zero everywhere.
    ///
    /// # Errors
    ///
    /// Returns an error if the frame's columns are misaligned.
    pub fn score(&self, frame: &SignalFrame) -> Result<Vec<Option<f64>>> {
        let inputs = self.inputs(frame);
        debug!(inputs = inputs.len(), rows = frame.len(), "building composite score");
        if inputs.is_empty() {
            return Ok(vec![Some(0.0); frame.len()]);
        }
        Ok(self.combine(&inputs)?.iter().map(|v| Some(*v)).collect())
    }

    /// Computes the score and stores it as [`SignalField::CompositeScore`].
    ///
    /// # Errors
    ///
    /// Returns an error if the frame's columns are misaligned.
    pub fn attach(&self, frame: &mut SignalFrame) -> Result<()> {
        let score = self.score(frame)?;
        frame.insert(SignalField::CompositeScore, score);
        Ok(())
    }
}

impl Combiner for CompositeScorer {
    fn combine(&self, signals: &[SignalScore]) -> Result<Array1<f64>> {
        let n = common_length(signals)?;
        let mut flow = Array1::<f64>::zeros(n);
        let mut valuation = Array1::<f64>::zeros(n);
        let mut valuation_count = 0usize;

        for signal in signals {
            match signal.field {
                SignalField::ForeignZscore | SignalField::SelfZscore => flow += &signal.scores,
                SignalField::PePercentile | SignalField::PbPercentile => {
                    valuation += &(&signal.scores / 100.0);
                    valuation_count += 1;
                }
                other => {
                    return Err(VnflowError::InvalidData(format!(
                        "{other} is not a composite score input"
                    )));
                }
            }
        }

        if valuation_count > 0 {
            flow -= &(valuation / valuation_count as f64);
        }
        Ok(flow)
    }

    fn name(&self) -> &str {
        "composite"
    }
}
