//! Do foreign investors lead returns?
//!
//! Foreign net buying is bucketed into quintiles and compared against
//! forward excess returns at every configured horizon. The ADV window used
//! to normalize the flow is searched for the one with the strongest IC, and
//! the headline horizon is re-run separately in bull and bear markets. The
//! per-horizon ICs double as the flow's IC decay curve.

use crate::common::{QuantileSpread, forward_excess_or_raw, mask, quantile_spread};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vnflow_eval::{
    CorrelationMethod, DecayAnalysis, IcResult, QuantileScheme, SignificanceConfig, ic_decay, information_coefficient,
};
use vnflow_signals::{MarketRegime, adv_relative, panel_regimes};
use vnflow_traits::{AnalysisConfig, Field, MergedPanel, Outcome, Result, VnflowError};

/// Horizon used for the window search and the regime split.
pub const HEADLINE_HORIZON: usize = 5;

/// Quintile spread and IC of foreign flow at one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonResult {
    /// Forward-return horizon in sessions.
    pub horizon: usize,
    /// Forward excess return by flow quintile.
    pub quintiles: QuantileSpread,
    /// IC of raw foreign net buying against the forward return.
    pub ic: IcResult,
}

/// IC of the ADV-normalized flow for one candidate window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowScore {
    /// ADV window in sessions.
    pub window: usize,
    /// IC at the headline horizon.
    pub ic: IcResult,
}

/// Result of the normalization window search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowSearch {
    /// Horizon the candidates were scored at.
    pub horizon: usize,
    /// Every candidate, in configured order.
    pub candidates: Vec<WindowScore>,
    /// Window with the largest |IC|, or the configured ADV window when no
    /// candidate produced one.
    pub best_window: usize,
}

/// Lead-lag statistics restricted to one market regime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeResult {
    /// The regime.
    pub regime: MarketRegime,
    /// Sessions in the regime.
    pub rows: usize,
    /// Quintile spread inside the regime.
    pub quintiles: QuantileSpread,
    /// IC inside the regime.
    pub ic: IcResult,
}

/// Bull and bear results side by side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeSplit {
    /// Bull market sessions.
    pub bull: Outcome<RegimeResult>,
    /// Bear market sessions.
    pub bear: Outcome<RegimeResult>,
}

/// Full lead-lag report for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeadLagReport {
    /// One entry per configured horizon.
    pub horizons: Vec<HorizonResult>,
    /// Normalization window search.
    pub window_search: WindowSearch,
    /// Regime split; skipped without a benchmark.
    pub regimes: Outcome<RegimeSplit>,
    /// IC of raw foreign flow across the configured horizons.
    pub decay: DecayAnalysis,
}

impl LeadLagReport {
    /// Horizons whose Q5-Q1 spread is significant.
    pub fn significant_horizons(&self) -> Vec<usize> {
        self.horizons
            .iter()
            .filter(|h| h.quintiles.spread.test.significant)
            .map(|h| h.horizon)
            .collect()
    }
}

fn headline_horizon(config: &AnalysisConfig) -> usize {
    if config.forward_horizons.contains(&HEADLINE_HORIZON) {
        HEADLINE_HORIZON
    } else {
        config.forward_horizons.first().copied().unwrap_or(HEADLINE_HORIZON)
    }
}

/// Runs the lead-lag question.
///
/// # Errors
///
/// Returns [`VnflowError::MissingColumn`] when the panel lacks foreign flow
/// or close prices.
pub fn lead_lag_analysis(panel: &MergedPanel, config: &AnalysisConfig) -> Result<LeadLagReport> {
    let flow = panel
        .foreign_flow()
        .ok_or_else(|| VnflowError::MissingColumn(Field::ForeignNetBuyVal.name().into()))?;
    let close = panel.require(Field::Close)?;
    let sig = SignificanceConfig::from(config);

    let forward = forward_excess_or_raw(panel, &config.forward_horizons)?;
    let decay = ic_decay(flow, &forward, CorrelationMethod::Pearson, &sig);
    let horizons: Vec<HorizonResult> = forward
        .iter()
        .zip(&decay.results)
        .map(|((h, fwd), ic)| HorizonResult {
            horizon: h,
            quintiles: quantile_spread(flow, fwd, h, QuantileScheme::Quintile, &sig),
            ic: ic.clone(),
        })
        .collect();
    debug!(half_life = ?decay.half_life, peak = ?decay.peak, "foreign flow IC decay");

    let horizon = headline_horizon(config);
    let headline = forward_excess_or_raw(panel, &[horizon])?;
    let fwd = headline.get(horizon).unwrap_or_default();
    let window_search = optimal_normalization_window(flow, close, fwd, horizon, config);
    let regimes = Outcome::from_result(regime_split(panel, flow, fwd, horizon, config))?;

    Ok(LeadLagReport {
        horizons,
        window_search,
        regimes,
        decay,
    })
}

/// Scores every candidate ADV window by the IC of the normalized flow.
pub fn optimal_normalization_window(
    flow: &[Option<f64>],
    close: &[Option<f64>],
    forward: &[Option<f64>],
    horizon: usize,
    config: &AnalysisConfig,
) -> WindowSearch {
    let sig = SignificanceConfig::from(config);
    let candidates: Vec<WindowScore> = config
        .normalization_windows
        .iter()
        .map(|&window| WindowScore {
            window,
            ic: information_coefficient(&adv_relative(flow, close, window), forward, CorrelationMethod::Pearson, &sig),
        })
        .collect();

    let best_window = candidates
        .iter()
        .filter_map(|c| c.ic.ic.map(|ic| (c.window, ic.abs())))
        .fold(None, |best: Option<(usize, f64)>, (w, ic)| match best {
            Some((_, b)) if b >= ic => best,
            _ => Some((w, ic)),
        })
        .map_or(config.adv_window, |(w, _)| w);

    debug!(best_window, horizon, "normalization window search done");
    WindowSearch {
        horizon,
        candidates,
        best_window,
    }
}

fn regime_split(
    panel: &MergedPanel,
    flow: &[Option<f64>],
    forward: &[Option<f64>],
    horizon: usize,
    config: &AnalysisConfig,
) -> Result<RegimeSplit> {
    let regimes = panel_regimes(panel, config.regime_ma_window)?;
    let sig = SignificanceConfig::from(config);

    let one = |regime: MarketRegime| -> Outcome<RegimeResult> {
        let rows = regimes.iter().filter(|r| **r == Some(regime)).count();
        if rows < config.min_sample_size {
            return Outcome::from(VnflowError::InsufficientData(format!(
                "{rows} {regime} sessions, need {}",
                config.min_sample_size
            )));
        }
        let in_regime = |i: usize| regimes[i] == Some(regime);
        let flow = mask(flow, in_regime);
        let fwd = mask(forward, in_regime);
        Outcome::Computed(RegimeResult {
            regime,
            rows,
            quintiles: quantile_spread(&flow, &fwd, horizon, QuantileScheme::Quintile, &sig),
            ic: information_coefficient(&flow, &fwd, CorrelationMethod::Pearson, &sig),
        })
    };

    Ok(RegimeSplit {
        bull: one(MarketRegime::Bull),
        bear: one(MarketRegime::Bear),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use vnflow_traits::Date;

    fn dates(n: usize) -> Vec<Date> {
        (0..n)
            .map(|i| Date::from_num_days_from_ce_opt(738_000 + i as i32).unwrap())
            .collect()
    }

    /// Foreign flow today equals the next session's return, scaled.
    fn leading_panel(n: usize, with_benchmark: bool) -> MergedPanel {
        let mut state = 7u64;
        let mut noise = || {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5
        };
        let rets: Vec<f64> = (0..n).map(|_| noise() * 0.04).collect();
        let mut close = Vec::with_capacity(n);
        let mut price = 100.0;
        for r in &rets {
            close.push(Some(price));
            price *= 1.0 + r;
        }
        let flow: Vec<Option<f64>> = (0..n)
            .map(|i| Some(rets.get(i).copied().unwrap_or(0.0) * 1e9))
            .collect();
        let mut columns = vec![(Field::Close, close), (Field::ForeignNetBuyVal, flow)];
        if with_benchmark {
            let bench = (0..n).map(|i| Some(1000.0 + (i as f64 / 10.0).sin() * 50.0)).collect();
            columns.push((Field::BenchmarkClose, bench));
        }
        MergedPanel::new(dates(n), columns).unwrap()
    }

    #[test]
    fn test_missing_foreign_flow() {
        let panel = MergedPanel::new(dates(3), vec![(Field::Close, vec![Some(1.0); 3])]).unwrap();
        let err = lead_lag_analysis(&panel, &AnalysisConfig::default()).unwrap_err();
        assert!(matches!(err, VnflowError::MissingColumn(_)));
    }

    #[test]
    fn test_flow_leads_one_day_returns() {
        let panel = leading_panel(300, false);
        let report = lead_lag_analysis(&panel, &AnalysisConfig::default()).unwrap();
        assert_eq!(report.horizons.len(), 6);

        let h1 = &report.horizons[0];
        assert_eq!(h1.horizon, 1);
        assert!(h1.ic.ic.unwrap() > 0.99);
        assert!(h1.quintiles.spread.spread.unwrap() > 0.0);
        assert!(report.significant_horizons().contains(&1));

        // No benchmark means no regimes.
        assert!(!report.regimes.is_computed());
    }

    #[test]
    fn test_window_search_picks_a_candidate() {
        let panel = leading_panel(300, true);
        let config = AnalysisConfig::default();
        let report = lead_lag_analysis(&panel, &config).unwrap();
        assert_eq!(report.window_search.horizon, HEADLINE_HORIZON);
        assert_eq!(report.window_search.candidates.len(), config.normalization_windows.len());
        assert!(config.normalization_windows.contains(&report.window_search.best_window));
    }

    #[test]
    fn test_window_search_falls_back() {
        let config = AnalysisConfig::default();
        let search = optimal_normalization_window(&[None; 4], &[Some(1.0); 4], &[Some(0.1); 4], 5, &config);
        assert_eq!(search.best_window, config.adv_window);
    }

    #[test]
    fn test_regime_split_with_benchmark() {
        let panel = leading_panel(400, true);
        let report = lead_lag_analysis(&panel, &AnalysisConfig::default()).unwrap();
        let Outcome::Computed(split) = &report.regimes else {
            panic!("regime split should run with a benchmark");
        };
        let computed = [&split.bull, &split.bear]
            .iter()
            .filter_map(|o| o.computed())
            .map(|r| r.rows)
            .sum::<usize>();
        assert!(computed > 0);
        if let Some(bull) = split.bull.computed() {
            assert_eq!(bull.regime, MarketRegime::Bull);
            assert!(bull.rows >= 30);
        }
    }

    #[test]
    fn test_decay_matches_horizon_ics() {
        let panel = leading_panel(300, false);
        let config = AnalysisConfig::default();
        let report = lead_lag_analysis(&panel, &config).unwrap();
        assert_eq!(report.decay.curve.horizons, config.forward_horizons);
        for (h, ic) in report.horizons.iter().zip(&report.decay.curve.ic_values) {
            assert_eq!(h.ic.ic, *ic);
        }
        // Flow predicts only the next session, so |IC| collapses after horizon 1.
        assert_eq!(report.decay.peak.unwrap().0, 1);
        let half_life = report.decay.half_life.unwrap();
        assert!(half_life > 1.0 && half_life < 10.0);
    }
}
