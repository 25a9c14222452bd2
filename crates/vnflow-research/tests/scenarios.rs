//! End-to-end behavior across the signal, evaluation, and combination crates.

use approx::assert_relative_eq;
use vnflow_combine::{CompositeConfig, CompositeScorer};
use vnflow_eval::{
    Backtest, BacktestConfig, CorrelationMethod, QuantileScheme, SignificanceConfig, bin_scheme, forward_return,
    information_coefficient, ttest,
};
use vnflow_research::{Question, composite_score, run_ticker};
use vnflow_signals::{adv_relative, gtgd_relative, normalize_all};
use vnflow_traits::stats::{rolling_mean, rolling_std, rolling_zscore};
use vnflow_traits::{AnalysisConfig, Date, Field, MergedPanel};

fn dates(n: usize) -> Vec<Date> {
    (0..n)
        .map(|i| Date::from_num_days_from_ce_opt(738_000 + i as i32).unwrap())
        .collect()
}

/// Deterministic uniform noise in [-0.5, 0.5).
fn noise(seed: u64, n: usize) -> Vec<f64> {
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            ((state >> 33) as f64 / (1u64 << 31) as f64) - 0.5
        })
        .collect()
}

fn random_walk(seed: u64, n: usize) -> Vec<Option<f64>> {
    let mut price = 50.0;
    noise(seed, n)
        .into_iter()
        .map(|r| {
            price *= 1.0 + r * 0.06;
            Some(price)
        })
        .collect()
}

fn full_panel(n: usize) -> MergedPanel {
    let foreign: Vec<Option<f64>> = noise(3, n).into_iter().map(|v| Some(v * 1e9)).collect();
    let self_net: Vec<Option<f64>> = noise(5, n).into_iter().map(|v| Some(v * 2e8)).collect();
    let buy: Vec<Option<f64>> = self_net.iter().map(|v| v.map(|v| 3e8 + v.max(0.0))).collect();
    let sell: Vec<Option<f64>> = self_net.iter().map(|v| v.map(|v| 3e8 + (-v).max(0.0))).collect();
    let pe: Vec<Option<f64>> = noise(7, n).into_iter().map(|v| Some(10.0 + v * 4.0)).collect();
    let pb: Vec<Option<f64>> = noise(9, n).into_iter().map(|v| Some(1.5 + v)).collect();
    MergedPanel::new(
        dates(n),
        vec![
            (Field::Close, random_walk(1, n)),
            (Field::BenchmarkClose, random_walk(2, n)),
            (Field::ForeignNetBuyVal, foreign),
            (Field::SelfNetBuyVal, self_net),
            (Field::SelfBuyVal, buy),
            (Field::SelfSellVal, sell),
            (Field::Pe, pe),
            (Field::Pb, pb),
        ],
    )
    .unwrap()
    .with_ticker("HPG")
}

#[test]
fn adv_signal_worked_example() {
    let net = vec![Some(100.0), Some(-50.0), Some(200.0), Some(0.0), None];
    let close = vec![Some(10.0); 5];
    let signal = adv_relative(&net, &close, 3);

    // Volumes 10, -5, 20; mean absolute volume at index 2 is 35 / 3.
    assert_relative_eq!(signal[0].unwrap(), 1.0, epsilon = 1e-12);
    assert_relative_eq!(signal[2].unwrap(), 20.0 / (35.0 / 3.0), epsilon = 1e-12);
    assert_relative_eq!(signal[2].unwrap(), 1.714, epsilon = 1e-3);
    assert_eq!(signal[3], Some(0.0));
    assert_eq!(signal[4], None);
}

#[test]
fn gtgd_zero_trading_day_is_null() {
    let net = vec![Some(5.0), Some(0.0), Some(-2.0)];
    let buy = vec![Some(10.0), Some(0.0), Some(4.0)];
    let sell = vec![Some(5.0), Some(0.0), Some(6.0)];
    let signal = gtgd_relative(&net, &buy, &sell);
    assert_relative_eq!(signal[0].unwrap(), 5.0 / 15.0, epsilon = 1e-12);
    assert_eq!(signal[1], None);
    assert_relative_eq!(signal[2].unwrap(), -0.2, epsilon = 1e-12);
}

#[test]
fn rolling_warm_up_is_half_the_window() {
    let values: Vec<Option<f64>> = noise(11, 40).into_iter().map(Some).collect();
    for window in [4, 10, 21] {
        let warm = window / 2 - 1;
        for series in [
            rolling_mean(&values, window),
            rolling_std(&values, window),
            rolling_zscore(&values, window),
        ] {
            assert!(series[..warm].iter().all(Option::is_none), "window {window}");
            assert!(series[warm..].iter().all(Option::is_some), "window {window}");
        }
    }
}

#[test]
fn forward_returns_match_prices() {
    let prices = random_walk(4, 50);
    for h in [1, 5, 20] {
        let fwd = forward_return(&prices, h);
        for t in 0..50 - h {
            assert_eq!(fwd[t], Some(prices[t + h].unwrap() / prices[t].unwrap() - 1.0));
        }
        assert!(fwd[50 - h..].iter().all(Option::is_none));
    }
}

#[test]
fn perfect_score_backtest() {
    let prices = random_walk(8, 500);
    let score = forward_return(&prices, 5);
    let result = Backtest::new(BacktestConfig::default()).run(&score, &prices);

    let means: Vec<f64> = result.quintile_returns.iter().map(|q| q.mean.unwrap()).collect();
    assert!(means.windows(2).all(|w| w[1] > w[0]), "{means:?}");
    assert!(result.monotonicity.is_monotonic);
    assert!(result.spread_test.test.p_value.unwrap() < 0.05);
    assert!(result.spread_test.test.significant);
    assert!(result.sharpe_ratio.unwrap() > 0.0);
}

#[test]
fn ic_with_one_overlap_is_a_warning() {
    let signal = vec![Some(1.0), None, Some(3.0)];
    let returns = vec![None, Some(0.1), Some(0.2)];
    let ic = information_coefficient(&signal, &returns, CorrelationMethod::Pearson, &SignificanceConfig::default());
    assert!(ic.ic.is_none());
    assert!(ic.n <= 1);
    assert!(ic.warning.is_some());
    assert!(!ic.significant);
}

#[test]
fn ic_of_a_series_with_itself() {
    let signal: Vec<Option<f64>> = noise(12, 60).into_iter().map(Some).collect();
    for method in [CorrelationMethod::Pearson, CorrelationMethod::Spearman] {
        let ic = information_coefficient(&signal, &signal, method, &SignificanceConfig::default());
        assert_relative_eq!(ic.ic.unwrap(), 1.0, epsilon = 1e-12);
        assert!(ic.t_statistic.unwrap().is_infinite());
        assert_eq!(ic.p_value, Some(0.0));
    }
}

#[test]
fn ttest_is_antisymmetric() {
    let a: Vec<f64> = noise(13, 40).into_iter().map(|v| v + 0.2).collect();
    let b = noise(14, 55);
    let config = SignificanceConfig::default();
    let ab = ttest(&a, &b, &config);
    let ba = ttest(&b, &a, &config);
    assert_relative_eq!(ab.mean_diff.unwrap(), -ba.mean_diff.unwrap(), epsilon = 1e-15);
    assert_relative_eq!(ab.t_statistic.unwrap(), -ba.t_statistic.unwrap(), epsilon = 1e-12);
    assert_relative_eq!(ab.p_value.unwrap(), ba.p_value.unwrap(), epsilon = 1e-12);
}

#[test]
fn quantile_groups_are_balanced() {
    let mut values: Vec<Option<f64>> = noise(15, 103).into_iter().map(Some).collect();
    values[10] = None;
    values[50] = None;
    for scheme in [QuantileScheme::Tercile, QuantileScheme::Quintile, QuantileScheme::Decile] {
        let bins = bin_scheme(&values, scheme);
        let counts = bins.counts();
        assert_eq!(counts.len(), scheme.n_groups());
        assert_eq!(counts.iter().sum::<usize>(), 101);
        let (lo, hi) = (counts.iter().min().unwrap(), counts.iter().max().unwrap());
        assert!(hi - lo <= 1, "{scheme:?}: {counts:?}");
        for (v, g) in values.iter().zip(bins.groups()) {
            assert_eq!(v.is_some(), g.is_some());
        }
    }
}

#[test]
fn composite_score_is_bit_identical_across_runs() {
    let panel = full_panel(300);
    let config = AnalysisConfig {
        zscore_window: 60,
        percentile_window: 120,
        ..Default::default()
    };
    let (_, first) = composite_score(&panel, &config).unwrap();
    let (_, second) = composite_score(&panel, &config).unwrap();
    let bits = |v: &[Option<f64>]| v.iter().map(|x| x.map(f64::to_bits)).collect::<Vec<_>>();
    assert_eq!(bits(&first), bits(&second));

    let mut frame = normalize_all(&panel, &config).unwrap();
    CompositeScorer::new(CompositeConfig::default()).attach(&mut frame).unwrap();
    assert_eq!(frame.len(), first.len());
}

#[test]
fn full_panel_answers_every_question() {
    let config = AnalysisConfig {
        zscore_window: 60,
        percentile_window: 120,
        regime_ma_window: 50,
        ..Default::default()
    };
    let report = run_ticker(&full_panel(400), &config, &Question::ALL).unwrap();
    assert_eq!(report.ticker, "HPG");
    assert_eq!(report.summary.rows, 400);
    assert_eq!(report.computed(), Question::ALL.to_vec());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["lead_lag"]["status"], "computed");
    assert_eq!(json["composite"]["status"], "computed");
    assert_eq!(json["conflicts"]["regimes"]["status"], "computed");
    assert_eq!(json["lead_lag"]["decay"]["curve"]["horizons"].as_array().unwrap().len(), 6);
}
