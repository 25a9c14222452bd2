//! Is proprietary (self) trading informative?
//!
//! Self-trading flow is normalized two ways, by ADV and by gross traded
//! value (GTGD), and each version is split into terciles against forward
//! returns. The normalization with the higher mean |IC| across horizons wins.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;
use vnflow_eval::{
    AnovaResult, CorrelationMethod, GroupStats, IcResult, MonotonicDirection, QuantileScheme, SignificanceConfig,
    anova, bin_scheme, forward_return, group_stats, information_coefficient, is_strictly_monotonic, split_by_group,
};
use vnflow_signals::{adv_relative, gtgd_relative};
use vnflow_traits::stats::drop_null_pairs;
use vnflow_traits::{AnalysisConfig, Date, Field, MergedPanel, Outcome, Result, SelfTradingData, VnflowError};

/// How much self-trading history a panel carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Availability {
    /// Enough points to analyze.
    pub available: bool,
    /// Sessions with a self net-buy value.
    pub data_points: usize,
    /// Sessions in the panel.
    pub total_points: usize,
    /// `data_points / total_points` in percent.
    pub coverage: f64,
    /// First session with data.
    pub start: Option<Date>,
    /// Last session with data.
    pub end: Option<Date>,
    /// Gross buy and sell values are present.
    pub has_gross: bool,
    /// Why the data is unusable, when it is.
    pub reason: Option<String>,
}

/// Checks self-trading coverage against `min_self_trading_points`.
pub fn check_availability(panel: &MergedPanel, config: &AnalysisConfig) -> Availability {
    let data = panel.self_trading();
    let total_points = panel.len();
    let Some(net) = data.net() else {
        return Availability {
            available: false,
            data_points: 0,
            total_points,
            coverage: 0.0,
            start: None,
            end: None,
            has_gross: false,
            reason: Some("No self-trading data".into()),
        };
    };

    let present: Vec<usize> = net
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|_| i))
        .collect();
    let data_points = present.len();
    let coverage = if total_points == 0 {
        0.0
    } else {
        data_points as f64 / total_points as f64 * 100.0
    };
    let available = data_points >= config.min_self_trading_points;

    Availability {
        available,
        data_points,
        total_points,
        coverage,
        start: present.first().map(|&i| panel.dates()[i]),
        end: present.last().map(|&i| panel.dates()[i]),
        has_gross: data.has_gross(),
        reason: (!available).then(|| {
            format!(
                "Only {data_points} self-trading points, need {}",
                config.min_self_trading_points
            )
        }),
    }
}

/// Normalization applied to self-trading net flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NormalizationMethod {
    /// Net flow over rolling average daily volume.
    Adv,
    /// Net flow over gross traded value.
    Gtgd,
}

impl fmt::Display for NormalizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Adv => f.write_str("ADV"),
            Self::Gtgd => f.write_str("GTGD"),
        }
    }
}

/// Tercile split of one normalized signal at one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TercileAnalysis {
    /// Normalization used.
    pub method: NormalizationMethod,
    /// Forward-return horizon in sessions.
    pub horizon: usize,
    /// Rows with both a signal and a forward return.
    pub rows: usize,
    /// Forward return per tercile, sell first.
    pub groups: Vec<GroupStats>,
    /// One-way ANOVA across terciles.
    pub anova: AnovaResult,
    /// IC of the signal against the forward return.
    pub ic: IcResult,
    /// Tercile means strictly increase from sell to buy.
    pub is_monotonic: bool,
}

/// Splits `signal` into terciles and tests forward returns across them.
///
/// # Errors
///
/// Returns [`VnflowError::InsufficientData`] when fewer than
/// `min_tercile_observations` rows have both values.
pub fn analyze_terciles(
    signal: &[Option<f64>],
    returns: &[Option<f64>],
    method: NormalizationMethod,
    horizon: usize,
    config: &AnalysisConfig,
) -> Result<TercileAnalysis> {
    let rows = drop_null_pairs(signal, returns).0.len();
    if rows < config.min_tercile_observations {
        return Err(VnflowError::InsufficientData(format!(
            "{rows} {method} observations at horizon {horizon}, need {}",
            config.min_tercile_observations
        )));
    }

    // Rows without a forward return must not take a tercile slot.
    let paired: Vec<Option<f64>> = signal
        .iter()
        .zip(returns)
        .map(|(s, r)| r.and(*s))
        .collect();
    let sig = SignificanceConfig::from(config);
    let scheme = QuantileScheme::Tercile;
    let labels = scheme.labels();
    let bins = bin_scheme(&paired, scheme);
    let groups = group_stats(bins.groups(), returns, &labels);
    let means: Vec<Option<f64>> = groups.iter().map(|g| g.mean).collect();

    Ok(TercileAnalysis {
        method,
        horizon,
        rows,
        anova: anova(&split_by_group(bins.groups(), returns, labels.len()), &sig),
        ic: information_coefficient(&paired, returns, CorrelationMethod::Pearson, &sig),
        is_monotonic: is_strictly_monotonic(&means, MonotonicDirection::Increasing),
        groups,
    })
}

/// ADV and GTGD tercile analyses at one horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodComparison {
    /// Forward-return horizon in sessions.
    pub horizon: usize,
    /// ADV-normalized flow.
    pub adv: Outcome<TercileAnalysis>,
    /// GTGD-normalized flow; skipped without gross values.
    pub gtgd: Outcome<TercileAnalysis>,
}

/// Self-trading report for one ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelfTradingReport {
    /// Data coverage.
    pub availability: Availability,
    /// One comparison per configured horizon.
    pub comparisons: Vec<MethodComparison>,
    /// Mean |IC| of the ADV signal over horizons where it was computed.
    pub mean_abs_ic_adv: Option<f64>,
    /// Mean |IC| of the GTGD signal over horizons where it was computed.
    pub mean_abs_ic_gtgd: Option<f64>,
    /// Normalization with the higher mean |IC|.
    pub best_method: Option<NormalizationMethod>,
}

fn mean_abs_ic<'a>(analyses: impl Iterator<Item = &'a Outcome<TercileAnalysis>>) -> Option<f64> {
    let ics: Vec<f64> = analyses
        .filter_map(|o| o.computed()?.ic.ic)
        .map(f64::abs)
        .collect();
    (!ics.is_empty()).then(|| ics.iter().sum::<f64>() / ics.len() as f64)
}

/// ADV wins only when strictly better.
const fn pick_method(adv: Option<f64>, gtgd: Option<f64>) -> Option<NormalizationMethod> {
    match (adv, gtgd) {
        (Some(a), Some(g)) if a > g => Some(NormalizationMethod::Adv),
        (Some(_), Some(_)) | (None, Some(_)) => Some(NormalizationMethod::Gtgd),
        (Some(_), None) => Some(NormalizationMethod::Adv),
        (None, None) => None,
    }
}

/// Runs the self-trading question.
///
/// # Errors
///
/// Returns [`VnflowError::InsufficientData`] when the availability check
/// fails and [`VnflowError::MissingColumn`] without close prices.
pub fn self_trading_analysis(panel: &MergedPanel, config: &AnalysisConfig) -> Result<SelfTradingReport> {
    let availability = check_availability(panel, config);
    if !availability.available {
        return Err(VnflowError::InsufficientData(
            availability.reason.clone().unwrap_or_default(),
        ));
    }

    let close = panel.require(Field::Close)?;
    let data = panel.self_trading();
    let (adv_signal, gtgd_signal) = match data {
        SelfTradingData::Full { net, buy, sell } => (
            adv_relative(net, close, config.adv_window),
            Some(gtgd_relative(net, buy, sell)),
        ),
        SelfTradingData::NetOnly { net } => (adv_relative(net, close, config.adv_window), None),
        SelfTradingData::Unavailable => {
            return Err(VnflowError::MissingColumn(Field::SelfNetBuyVal.name().into()));
        }
    };

    let mut comparisons = Vec::with_capacity(config.forward_horizons.len());
    for &h in &config.forward_horizons {
        let fwd = forward_return(close, h);
        let adv = Outcome::from_result(analyze_terciles(&adv_signal, &fwd, NormalizationMethod::Adv, h, config))?;
        let gtgd = match &gtgd_signal {
            Some(signal) => Outcome::from_result(analyze_terciles(signal, &fwd, NormalizationMethod::Gtgd, h, config))?,
            None => Outcome::skipped("No gross self-trading values"),
        };
        comparisons.push(MethodComparison { horizon: h, adv, gtgd });
    }

    let mean_abs_ic_adv = mean_abs_ic(comparisons.iter().map(|c| &c.adv));
    let mean_abs_ic_gtgd = mean_abs_ic(comparisons.iter().map(|c| &c.gtgd));
    let best_method = pick_method(mean_abs_ic_adv, mean_abs_ic_gtgd);
    debug!(?best_method, ?mean_abs_ic_adv, ?mean_abs_ic_gtgd, "self-trading normalization compared");

    Ok(SelfTradingReport {
        availability,
        comparisons,
        mean_abs_ic_adv,
        mean_abs_ic_gtgd,
        best_method,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::with_rising_benchmark;

    fn dates(n: usize) -> Vec<Date> {
        (0..n)
            .map(|i| Date::from_num_days_from_ce_opt(738_000 + i as i32).unwrap())
            .collect()
    }

    fn panel(n: usize, gross: bool) -> MergedPanel {
        let close: Vec<Option<f64>> = (0..n).map(|i| Some(50.0 + ((i * 7) % 11) as f64)).collect();
        let net: Vec<Option<f64>> = (0..n)
            .map(|i| (i % 10 != 0).then(|| ((i * 37) % 19) as f64 - 9.0))
            .collect();
        let mut columns = vec![(Field::Close, close), (Field::SelfNetBuyVal, net.clone())];
        if gross {
            let buy = net.iter().map(|v| v.map(|v| 20.0 + v.max(0.0))).collect();
            let sell = net.iter().map(|v| v.map(|v| 20.0 + (-v).max(0.0))).collect();
            columns.push((Field::SelfBuyVal, buy));
            columns.push((Field::SelfSellVal, sell));
        }
        MergedPanel::new(dates(n), columns).unwrap()
    }

    #[test]
    fn test_availability() {
        let config = AnalysisConfig::default();
        let a = check_availability(&panel(200, false), &config);
        assert!(a.available);
        assert_eq!(a.data_points, 180);
        assert_eq!(a.total_points, 200);
        assert!((a.coverage - 90.0).abs() < 1e-10);
        assert_eq!(a.start, Some(dates(200)[1]));
        assert!(!a.has_gross);

        let short = check_availability(&panel(50, true), &config);
        assert!(!short.available);
        assert!(short.reason.unwrap().contains("need 100"));

        let none = MergedPanel::new(dates(5), vec![(Field::Close, vec![Some(1.0); 5])]).unwrap();
        assert_eq!(check_availability(&none, &config).reason.as_deref(), Some("No self-trading data"));
    }

    #[test]
    fn test_unavailable_is_insufficient_data() {
        let err = self_trading_analysis(&panel(50, true), &AnalysisConfig::default()).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_terciles_monotonic_signal() {
        let signal: Vec<Option<f64>> = (0..90).map(|i| Some(i as f64)).collect();
        let returns: Vec<Option<f64>> = (0..90).map(|i| Some(i as f64 / 1000.0)).collect();
        let t = analyze_terciles(&signal, &returns, NormalizationMethod::Adv, 5, &AnalysisConfig::default()).unwrap();
        assert_eq!(t.rows, 90);
        assert_eq!(t.groups.len(), 3);
        assert_eq!(t.groups[0].label, "T1 (Sell)");
        assert!(t.is_monotonic);
        assert!(t.anova.significant);
        assert!(t.ic.ic.unwrap() > 0.99);
    }

    #[test]
    fn test_terciles_too_few_rows() {
        let signal = vec![Some(1.0); 10];
        let err = analyze_terciles(&signal, &signal, NormalizationMethod::Gtgd, 1, &AnalysisConfig::default())
            .unwrap_err();
        assert!(matches!(err, VnflowError::InsufficientData(_)));
    }

    #[test]
    fn test_pick_method() {
        assert_eq!(pick_method(Some(0.2), Some(0.1)), Some(NormalizationMethod::Adv));
        assert_eq!(pick_method(Some(0.1), Some(0.1)), Some(NormalizationMethod::Gtgd));
        assert_eq!(pick_method(None, Some(0.1)), Some(NormalizationMethod::Gtgd));
        assert_eq!(pick_method(Some(0.1), None), Some(NormalizationMethod::Adv));
        assert_eq!(pick_method(None, None), None);
    }

    #[test]
    fn test_net_only_skips_gtgd() {
        let report = self_trading_analysis(&panel(300, false), &AnalysisConfig::default()).unwrap();
        assert_eq!(report.comparisons.len(), 6);
        assert!(report.comparisons.iter().all(|c| !c.gtgd.is_computed()));
        assert!(report.comparisons.iter().all(|c| c.adv.is_computed()));
        assert_eq!(report.best_method, Some(NormalizationMethod::Adv));
    }

    #[test]
    fn test_full_data_compares_both() {
        let report = self_trading_analysis(&panel(300, true), &AnalysisConfig::default()).unwrap();
        assert!(report.comparisons.iter().all(|c| c.gtgd.is_computed()));
        assert!(report.mean_abs_ic_gtgd.is_some());
        assert!(report.best_method.is_some());
    }

    #[test]
    fn test_terciles_use_raw_forward_returns() {
        let plain = panel(300, false);
        let benchmarked = with_rising_benchmark(&plain);
        let config = AnalysisConfig::default();
        let report = self_trading_analysis(&benchmarked, &config).unwrap();
        assert_eq!(report, self_trading_analysis(&plain, &config).unwrap());

        let close = plain.require(Field::Close).unwrap();
        let net = plain.self_trading().net().unwrap();
        let signal = adv_relative(net, close, config.adv_window);
        for c in &report.comparisons {
            let raw = forward_return(close, c.horizon);
            let expected = analyze_terciles(&signal, &raw, NormalizationMethod::Adv, c.horizon, &config).unwrap();
            let got = c.adv.computed().unwrap();
            for (g, e) in got.groups.iter().zip(&expected.groups) {
                assert_eq!(g.count, e.count);
                assert_eq!(g.mean, e.mean);
            }
        }
    }
}
