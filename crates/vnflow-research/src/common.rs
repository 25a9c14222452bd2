//! Building blocks shared by the research questions.

use serde::{Deserialize, Serialize};
use vnflow_eval::{
    ForwardReturns, GroupStats, QuantileScheme, SignificanceConfig, SpreadTest, bin_scheme, group_stats,
    quintile_spread_test,
};
use vnflow_traits::{Field, MergedPanel, Result};

/// Forward excess returns over the benchmark, or raw forward returns when
/// the panel has no benchmark.
pub(crate) fn forward_excess_or_raw(panel: &MergedPanel, horizons: &[usize]) -> Result<ForwardReturns> {
    let close = panel.require(Field::Close)?;
    Ok(match panel.get(Field::BenchmarkClose) {
        Some(benchmark) => ForwardReturns::excess(close, benchmark, horizons),
        None => ForwardReturns::compute(close, horizons),
    })
}

/// Copy of `panel` with a benchmark that rises 1% a session.
#[cfg(test)]
pub(crate) fn with_rising_benchmark(panel: &MergedPanel) -> MergedPanel {
    let mut columns: Vec<(Field, Vec<Option<f64>>)> = panel
        .fields()
        .filter_map(|f| Some((f, panel.get(f)?.to_vec())))
        .collect();
    let bench = (0..panel.len()).map(|i| Some(1000.0 * 1.01f64.powi(i as i32))).collect();
    columns.push((Field::BenchmarkClose, bench));
    MergedPanel::new(panel.dates().to_vec(), columns).unwrap()
}

/// Keeps values where `keep` is true and blanks the rest.
pub(crate) fn mask(values: &[Option<f64>], keep: impl Fn(usize) -> bool) -> Vec<Option<f64>> {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| if keep(i) { *v } else { None })
        .collect()
}

/// Forward returns grouped by quantile of a signal, with the top-minus-bottom test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileSpread {
    /// Forward-return horizon in sessions.
    pub horizon: usize,
    /// Return summary per group, lowest signal first.
    pub group_stats: Vec<GroupStats>,
    /// Top group against bottom group.
    pub spread: SpreadTest,
}

/// Bins `signal` with `scheme` and summarizes `returns` per group.
pub(crate) fn quantile_spread(
    signal: &[Option<f64>],
    returns: &[Option<f64>],
    horizon: usize,
    scheme: QuantileScheme,
    config: &SignificanceConfig,
) -> QuantileSpread {
    let labels = scheme.labels();
    let bins = bin_scheme(signal, scheme);
    QuantileSpread {
        horizon,
        group_stats: group_stats(bins.groups(), returns, &labels),
        spread: quintile_spread_test(bins.groups(), returns, &labels, config),
    }
}
