//! Quantile binning.
//!
//! Non-null values are split into `n` equal-population groups by rank, group
//! 1 holding the lowest values. When there are fewer distinct values than
//! groups the equal-population cut points collide, and binning falls back to
//! bucketing the percentile rank instead of failing.

use crate::correlation::compute_ranks;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Standard group counts with their display labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantileScheme {
    /// Five groups, `Q1..Q5`.
    Quintile,
    /// Three groups, `T1 (Sell)`, `T2 (Neutral)`, `T3 (Buy)`.
    Tercile,
    /// Ten groups, `D1..D10`.
    Decile,
}

impl QuantileScheme {
    /// Number of groups.
    pub const fn n_groups(self) -> usize {
        match self {
            Self::Quintile => 5,
            Self::Tercile => 3,
            Self::Decile => 10,
        }
    }

    /// Labels in ascending value order.
    pub fn labels(self) -> Vec<String> {
        match self {
            Self::Quintile => (1..=5).map(|i| format!("Q{i}")).collect(),
            Self::Tercile => ["T1 (Sell)", "T2 (Neutral)", "T3 (Buy)"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            Self::Decile => (1..=10).map(|i| format!("D{i}")).collect(),
        }
    }
}

/// How a binning was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinningMethod {
    /// Rank-ordered equal-population groups.
    EqualPopulation,
    /// `ceil(percentile_rank * n / 100)` buckets, used for degenerate inputs.
    PercentileBucket,
}

/// Group membership of every row of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantileBinning {
    groups: Vec<Option<usize>>,
    labels: Vec<String>,
    method: BinningMethod,
}

impl QuantileBinning {
    /// 1-based group per row; `None` where the input was missing.
    pub fn groups(&self) -> &[Option<usize>] {
        &self.groups
    }

    /// Group labels, lowest first.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of groups.
    pub fn n_groups(&self) -> usize {
        self.labels.len()
    }

    /// Whether the degenerate-input fallback was used.
    pub const fn method(&self) -> BinningMethod {
        self.method
    }

    /// Label of the group row `i` fell in.
    pub fn label_at(&self, i: usize) -> Option<&str> {
        let g = (*self.groups.get(i)?)?;
        Some(self.labels[g - 1].as_str())
    }

    /// Rows per group.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.labels.len()];
        for g in self.groups.iter().flatten() {
            counts[g - 1] += 1;
        }
        counts
    }
}

/// Bins `values` into `labels.len()` groups.
///
/// Rows are ordered by value and then by position, so equal values are split
/// deterministically and group sizes differ by at most one. With fewer
/// distinct values than groups each row goes to bucket
/// `ceil(percentile_rank * n / 100)` of its average-rank percentile.
///
/// # Panics
///
/// Panics if `labels` is empty.
///
/// # Example
///
/// ```
/// use vnflow_eval::quantile::{QuantileScheme, bin_into_quantiles};
///
/// let values: Vec<Option<f64>> = (0..10).map(|i| Some(f64::from(i))).collect();
/// let bins = bin_into_quantiles(&values, &QuantileScheme::Quintile.labels());
/// assert_eq!(bins.label_at(0), Some("Q1"));
/// assert_eq!(bins.label_at(9), Some("Q5"));
/// ```
pub fn bin_into_quantiles(values: &[Option<f64>], labels: &[String]) -> QuantileBinning {
    let n_groups = labels.len();
    assert!(n_groups > 0, "quantile binning needs at least one group");

    let present: Vec<(usize, f64)> = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| (i, v)))
        .collect();
    let count = present.len();
    let mut groups = vec![None; values.len()];

    let mut order: Vec<usize> = (0..count).collect();
    order.sort_by(|a, b| present[*a].1.total_cmp(&present[*b].1).then(a.cmp(b)));
    let distinct = 1 + order
        .windows(2)
        .filter(|w| present[w[0]].1 != present[w[1]].1)
        .count();

    let method = if count == 0 || distinct >= n_groups {
        for (pos, k) in order.iter().enumerate() {
            groups[present[*k].0] = Some(pos * n_groups / count + 1);
        }
        BinningMethod::EqualPopulation
    } else {
        warn!(
            distinct,
            n_groups, "too few distinct values for equal-population groups, bucketing percentile ranks"
        );
        let raw: Vec<f64> = present.iter().map(|(_, v)| *v).collect();
        for ((row, _), rank) in present.iter().zip(compute_ranks(&raw)) {
            let pct = rank / count as f64 * 100.0;
            let bucket = (pct * n_groups as f64 / 100.0).ceil() as usize;
            groups[*row] = Some(bucket.clamp(1, n_groups));
        }
        BinningMethod::PercentileBucket
    };

    QuantileBinning {
        groups,
        labels: labels.to_vec(),
        method,
    }
}

/// Bins `values` with one of the standard schemes.
pub fn bin_scheme(values: &[Option<f64>], scheme: QuantileScheme) -> QuantileBinning {
    bin_into_quantiles(values, &scheme.labels())
}
