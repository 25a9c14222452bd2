//! Does buying cheap pay off?
//!
//! Each valuation multiple's rolling percentile is split into deciles and
//! compared against 30-session forward returns. Cheap deciles should earn
//! more than expensive ones, so the decile means are tested for a
//! decreasing trend.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vnflow_eval::{
    AnovaResult, GroupStats, MonotonicDirection, MonotonicityResult, QuantileScheme, SignificanceConfig, anova,
    bin_scheme, forward_return, group_stats, monotonicity, split_by_group,
};
use vnflow_signals::{ValuationPercentile, ValuationZone};
use vnflow_traits::stats::{drop_null_pairs, mean};
use vnflow_traits::{AnalysisConfig, Date, Field, MergedPanel, Outcome, Result, Signal, VnflowError};

/// Forward-return horizon of the decile analysis.
pub const DECILE_HORIZON: usize = 30;

/// Percentile at or below which a multiple counts as cheap.
pub const CHEAP_PERCENTILE: f64 = 20.0;

/// Percentile at or above which a multiple counts as expensive.
pub const EXPENSIVE_PERCENTILE: f64 = 80.0;

const Z_95: f64 = 1.96;

/// Forward returns by valuation-percentile decile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecileAnalysis {
    /// Multiple analyzed.
    pub field: Field,
    /// Forward-return horizon in sessions.
    pub horizon: usize,
    /// Rows with both a percentile and a forward return.
    pub rows: usize,
    /// Forward return per decile, cheapest first.
    pub deciles: Vec<GroupStats>,
    /// Test for returns falling as valuation rises.
    pub monotonicity: MonotonicityResult,
    /// One-way ANOVA across deciles.
    pub anova: AnovaResult,
    /// Mean forward return in the cheap zone.
    pub cheap_return: Option<f64>,
    /// Mean forward return in the expensive zone.
    pub expensive_return: Option<f64>,
    /// Cheap minus expensive.
    pub cheap_expensive_spread: Option<f64>,
}

/// Splits `percentile` into deciles against `returns`.
///
/// # Errors
///
/// Returns [`VnflowError::InsufficientData`] with fewer than
/// `min_decile_observations` complete rows.
pub fn analyze_deciles(
    field: Field,
    percentile: &[Option<f64>],
    returns: &[Option<f64>],
    horizon: usize,
    config: &AnalysisConfig,
) -> Result<DecileAnalysis> {
    let (p, r) = drop_null_pairs(percentile, returns);
    let rows = p.len();
    if rows < config.min_decile_observations {
        return Err(VnflowError::InsufficientData(format!(
            "{rows} {field} percentile observations, need {}",
            config.min_decile_observations
        )));
    }

    let paired: Vec<Option<f64>> = percentile
        .iter()
        .zip(returns)
        .map(|(p, r)| r.and(*p))
        .collect();
    let sig = SignificanceConfig::from(config);
    let scheme = QuantileScheme::Decile;
    let labels = scheme.labels();
    let bins = bin_scheme(&paired, scheme);
    let deciles = group_stats(bins.groups(), returns, &labels);
    let means: Vec<Option<f64>> = deciles.iter().map(|d| d.mean).collect();

    let zone_mean = |keep: fn(f64) -> bool| {
        let v: Vec<f64> = p.iter().zip(&r).filter(|(p, _)| keep(**p)).map(|(_, r)| *r).collect();
        mean(&v)
    };
    let cheap_return = zone_mean(|p| p <= CHEAP_PERCENTILE);
    let expensive_return = zone_mean(|p| p >= EXPENSIVE_PERCENTILE);

    Ok(DecileAnalysis {
        field,
        horizon,
        rows,
        monotonicity: monotonicity(&means, MonotonicDirection::Decreasing, &sig),
        anova: anova(&split_by_group(bins.groups(), returns, labels.len()), &sig),
        cheap_return,
        expensive_return,
        cheap_expensive_spread: cheap_return.zip(expensive_return).map(|(c, e)| c - e),
        deciles,
    })
}

/// Latest valuation reading of one multiple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    /// Multiple.
    pub field: Field,
    /// Session of the reading.
    pub date: Date,
    /// Multiple value.
    pub value: f64,
    /// Rolling percentile, when the window had enough history.
    pub percentile: Option<f64>,
    /// Zone of the percentile.
    pub zone: ValuationZone,
}

/// Summarizes the last session that has a value for the multiple.
pub fn current_valuation(
    field: Field,
    dates: &[Date],
    values: &[Option<f64>],
    percentile: &[Option<f64>],
) -> Option<ValuationSummary> {
    let i = values.iter().rposition(Option::is_some)?;
    let p = percentile.get(i).copied().flatten();
    Some(ValuationSummary {
        field,
        date: *dates.get(i)?,
        value: values[i]?,
        percentile: p,
        zone: ValuationZone::classify(p),
    })
}

/// Expected forward return for a valuation percentile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReturnPrediction {
    /// Percentile the prediction is for.
    pub percentile: f64,
    /// Decile it falls in, 1 to 10.
    pub decile: usize,
    /// Historical mean forward return of that decile.
    pub expected_return: f64,
    /// Lower end of the 95% confidence band.
    pub lower: f64,
    /// Upper end of the 95% confidence band.
    pub upper: f64,
    /// Observations in the decile.
    pub sample_size: usize,
}

/// Looks up the decile of `percentile` and returns its mean with a
/// normal-approximation 95% band.
///
/// Returns `None` when the decile has no mean or standard deviation.
pub fn predict_forward_return(deciles: &[GroupStats], percentile: f64) -> Option<ReturnPrediction> {
    let decile = ((percentile / 10.0).floor().max(0.0) as usize + 1).min(10);
    let stats = deciles.get(decile - 1)?;
    let (mean, std) = (stats.mean?, stats.std?);
    let half_width = Z_95 * std / (stats.count as f64).sqrt();
    Some(ReturnPrediction {
        percentile,
        decile,
        expected_return: mean,
        lower: mean - half_width,
        upper: mean + half_width,
        sample_size: stats.count,
    })
}

/// Everything computed for one multiple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldValuation {
    /// Multiple.
    pub field: Field,
    /// Latest reading.
    pub current: Option<ValuationSummary>,
    /// Decile analysis.
    pub deciles: Outcome<DecileAnalysis>,
    /// Expected return at the current percentile.
    pub prediction: Option<ReturnPrediction>,
}

/// Valuation report for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationReport {
    /// One entry per multiple the panel carries.
    pub fields: Vec<FieldValuation>,
}

/// Runs the valuation question over every multiple in the panel.
///
/// # Errors
///
/// Returns [`VnflowError::MissingColumn`] when the panel has no valuation
/// multiple or no close prices.
pub fn valuation_analysis(panel: &MergedPanel, config: &AnalysisConfig) -> Result<ValuationReport> {
    let present: Vec<Field> = Field::VALUATION.into_iter().filter(|f| panel.has(*f)).collect();
    if present.is_empty() {
        return Err(VnflowError::MissingColumn("pe, pb or pcfs".into()));
    }
    let fwd = forward_return(panel.require(Field::Close)?, DECILE_HORIZON);

    let mut fields = Vec::with_capacity(present.len());
    for field in present {
        let signal = ValuationPercentile::new(field, config.percentile_window)?;
        let percentile = signal.compute(panel)?;
        let values = panel.require(field)?;

        let current = current_valuation(field, panel.dates(), values, &percentile);
        let deciles = Outcome::from_result(analyze_deciles(field, &percentile, &fwd, DECILE_HORIZON, config))?;
        let prediction = match (&current, deciles.computed()) {
            (Some(ValuationSummary { percentile: Some(p), .. }), Some(d)) => predict_forward_return(&d.deciles, *p),
            _ => None,
        };
        debug!(%field, computed = deciles.is_computed(), "valuation deciles");

        fields.push(FieldValuation {
            field,
            current,
            deciles,
            prediction,
        });
    }
    Ok(ValuationReport { fields })
}
