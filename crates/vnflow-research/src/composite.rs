//! Does the flow-minus-valuation composite earn a spread?
//!
//! Normalizes every signal the panel supports, scores each session, runs the
//! quintile backtest, and attributes the top quintile's forward returns to
//! the market with CAPM.

use serde::{Deserialize, Serialize};
use vnflow_combine::{CompositeConfig, CompositeScorer};
use vnflow_eval::{
    Backtest, BacktestConfig, BacktestResult, CapmResult, QuantileScheme, bin_scheme, capm, forward_return,
};
use vnflow_signals::normalize_all;
use vnflow_traits::{AnalysisConfig, Field, MergedPanel, Outcome, Result, SignalField, VnflowError};

/// Holding period of the composite backtest.
pub const BACKTEST_HORIZON: usize = 5;

/// Composite report for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeReport {
    /// Signals that fed the score.
    pub inputs: Vec<SignalField>,
    /// Score of the last session.
    pub latest_score: Option<f64>,
    /// Quintile backtest of the score.
    pub backtest: BacktestResult,
    /// CAPM of top-quintile forward returns against the benchmark; skipped
    /// without a benchmark or with too few pairs.
    pub capm: Outcome<CapmResult>,
}

/// Composite score of every session, plus the fields it was built from.
///
/// # Errors
///
/// Returns [`VnflowError::InsufficientData`] when the panel supports none of
/// the score inputs.
pub fn composite_score(panel: &MergedPanel, config: &AnalysisConfig) -> Result<(Vec<SignalField>, Vec<Option<f64>>)> {
    let mut frame = normalize_all(panel, config)?;
    let scorer = CompositeScorer::new(CompositeConfig::default());
    let inputs: Vec<SignalField> = scorer.inputs(&frame).iter().map(|s| s.field).collect();
    if inputs.is_empty() {
        return Err(VnflowError::InsufficientData("no flow z-score or valuation percentile to score".into()));
    }
    scorer.attach(&mut frame)?;
    let score = frame
        .get(SignalField::CompositeScore)
        .map(<[Option<f64>]>::to_vec)
        .unwrap_or_default();
    Ok((inputs, score))
}

/// Runs the composite question.
///
/// # Errors
///
/// Returns [`VnflowError::MissingColumn`] without close prices and
/// [`VnflowError::InsufficientData`] when nothing can be scored.
pub fn composite_analysis(panel: &MergedPanel, config: &AnalysisConfig) -> Result<CompositeReport> {
    let close = panel.require(Field::Close)?;
    let (inputs, score) = composite_score(panel, config)?;

    let forward = forward_return(close, BACKTEST_HORIZON);
    let backtest = Backtest::new(BacktestConfig::from_analysis(config, BACKTEST_HORIZON)).run_with_returns(&score, &forward);

    let bins = bin_scheme(&score, QuantileScheme::Quintile);
    let top = bins.n_groups();
    let top_returns: Vec<Option<f64>> = bins
        .groups()
        .iter()
        .zip(&forward)
        .map(|(g, r)| if *g == Some(top) { *r } else { None })
        .collect();
    let capm = Outcome::from_result(panel.require(Field::BenchmarkClose).and_then(|benchmark| {
        capm(
            &top_returns,
            &forward_return(benchmark, BACKTEST_HORIZON),
            config.capm_min_observations,
            config.trading_days_per_year as f64,
        )
    }))?;

    Ok(CompositeReport {
        inputs,
        latest_score: score.last().copied().flatten(),
        backtest,
        capm,
    })
}
