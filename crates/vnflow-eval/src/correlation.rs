//! Correlation and Information Coefficient (IC) calculations.
//!
//! IC is the correlation between a signal and the forward return it is meant
//! to predict. Both Pearson and Spearman (rank) correlation are supported.

use crate::distribution::t_two_sided;
use crate::result::SignificanceConfig;
use serde::{Deserialize, Serialize};
use vnflow_traits::stats::drop_null_pairs;

/// Distance from ±1 below which a correlation is treated as exact.
const PERFECT_CORRELATION_EPS: f64 = 1e-12;

/// Correlation flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrelationMethod {
    /// Linear correlation of the raw values.
    #[default]
    Pearson,
    /// Linear correlation of the average ranks.
    Spearman,
}

/// Compute 1-based ranks of values, giving ties their average rank.
///
/// Ordering is deterministic: ties are resolved by equality only, never by
/// position.
pub fn compute_ranks(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    let mut indexed: Vec<(usize, f64)> = values.iter().copied().enumerate().collect();

    // Sort by value
    indexed.sort_by(|a, b| a.1.total_cmp(&b.1));

    let mut ranks = vec![0.0; n];
    let mut i = 0;

    while i < n {
        let mut j = i;
        // Find ties
        while j < n && indexed[j].1 == indexed[i].1 {
            j += 1;
        }

        // Average rank for ties
        let avg_rank = (i + j + 1) as f64 / 2.0;
        for item in &indexed[i..j] {
            ranks[item.0] = avg_rank;
        }

        i = j;
    }

    ranks
}

/// Pearson correlation of two equally long slices.
///
/// Returns `None` for fewer than two points or when either side is constant.
pub fn pearson(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }

    let n = x.len() as f64;
    let mean_x = x.iter().sum::<f64>() / n;
    let mean_y = y.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;

    for (xi, yi) in x.iter().zip(y) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some((cov / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Spearman rank correlation of two equally long slices.
pub fn spearman(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() {
        return None;
    }
    pearson(&compute_ranks(x), &compute_ranks(y))
}

/// A correlation with its significance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationTest {
    /// Correlation coefficient.
    pub correlation: f64,
    /// `r * sqrt((n - 2) / (1 - r²))`; infinite when `|r| == 1`.
    pub t_statistic: f64,
    /// Two-sided p-value from Student's t with `n - 2` degrees of freedom.
    pub p_value: f64,
    /// Number of pairs.
    pub n: usize,
}

/// Correlation and its t-test.
///
/// Returns `None` when the correlation is undefined (fewer than two points
/// or a constant input). With exactly two points the correlation is ±1 and
/// carries no evidence, so the p-value is 1.
pub fn correlation_test(x: &[f64], y: &[f64], method: CorrelationMethod) -> Option<CorrelationTest> {
    let r = match method {
        CorrelationMethod::Pearson => pearson(x, y)?,
        CorrelationMethod::Spearman => spearman(x, y)?,
    };
    let n = x.len();
    let perfect = 1.0 - r.abs() < PERFECT_CORRELATION_EPS;
    let r = if perfect { r.signum() } else { r };
    let df = (n - 2) as f64;

    let t_statistic = if perfect {
        f64::INFINITY.copysign(r)
    } else {
        r * (df / (1.0 - r * r)).sqrt()
    };
    let p_value = if n == 2 {
        1.0
    } else if perfect {
        0.0
    } else {
        t_two_sided(t_statistic, df)?
    };

    Some(CorrelationTest {
        correlation: r,
        t_statistic,
        p_value,
        n,
    })
}

/// Information Coefficient of a signal against its paired forward return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcResult {
    /// Correlation method used.
    pub method: CorrelationMethod,
    /// Information coefficient.
    pub ic: Option<f64>,
    /// t statistic of the IC.
    pub t_statistic: Option<f64>,
    /// Two-sided p-value.
    pub p_value: Option<f64>,
    /// Paired observations used.
    pub n: usize,
    /// `p_value < alpha`.
    pub significant: bool,
    /// Data-quality note.
    pub warning: Option<String>,
}

/// Calculate the Information Coefficient between a signal and forward returns.
///
/// Rows where either side is missing are dropped first. Fewer than two
/// remaining pairs gives a null IC with an "Insufficient data" warning; a
/// sample below the configured minimum still runs but is flagged.
///
/// # Arguments
///
/// * `signal` - Signal values, aligned with `forward_returns`
/// * `forward_returns` - Forward returns stored at the signal's session
/// * `method` - Pearson or Spearman
/// * `config` - Significance level and minimum sample size
///
/// # Example
///
/// ```rust,ignore
/// use vnflow_eval::{CorrelationMethod, SignificanceConfig, information_coefficient};
///
/// let ic = information_coefficient(&signal, &fwd_5d, CorrelationMethod::Spearman, &SignificanceConfig::default());
/// ```
pub fn information_coefficient(
    signal: &[Option<f64>],
    forward_returns: &[Option<f64>],
    method: CorrelationMethod,
    config: &SignificanceConfig,
) -> IcResult {
    let (x, y) = drop_null_pairs(signal, forward_returns);
    let n = x.len();
    let empty = |n, warning: &str| IcResult {
        method,
        ic: None,
        t_statistic: None,
        p_value: None,
        n,
        significant: false,
        warning: Some(warning.to_string()),
    };

    if n < 2 {
        return empty(n, "Insufficient data");
    }
    let Some(test) = correlation_test(&x, &y, method) else {
        return empty(n, "Constant input, correlation undefined");
    };

    IcResult {
        method,
        ic: Some(test.correlation),
        t_statistic: Some(test.t_statistic),
        p_value: Some(test.p_value),
        n,
        significant: config.is_significant(Some(test.p_value)),
        warning: (n < config.min_sample_size).then(|| format!("Small sample size (n={n})")),
    }
}
