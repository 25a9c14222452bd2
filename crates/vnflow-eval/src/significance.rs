//! Hypothesis tests used to judge whether a signal separates returns.
//!
//! Every test returns a result struct even when the sample is too short or
//! degenerate: the statistic and p-value are `None` and `warning` says why.

use crate::correlation::{CorrelationMethod, correlation_test};
use crate::distribution::{f_upper, t_two_sided};
use crate::result::{SignificanceConfig, TestResult, split_by_group};
use serde::{Deserialize, Serialize};
use vnflow_traits::stats::{non_null, sample_moments};

/// Two-sample t-test outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TTestResult {
    /// t statistic of `mean_a - mean_b`.
    pub t_statistic: Option<f64>,
    /// Two-sided p-value.
    pub p_value: Option<f64>,
    /// Size of the first group.
    pub n_a: usize,
    /// Size of the second group.
    pub n_b: usize,
    /// Mean of the first group.
    pub mean_a: Option<f64>,
    /// Mean of the second group.
    pub mean_b: Option<f64>,
    /// `mean_a - mean_b`.
    pub mean_diff: Option<f64>,
    /// `p_value < alpha`.
    pub significant: bool,
    /// Data-quality note.
    pub warning: Option<String>,
}

/// Two-sample t-test of `a` against `b`.
///
/// Uses Welch's unequal-variance test unless `config.equal_var` is set.
/// Either group with fewer than two values gives an all-null result with an
/// "Insufficient sample size" warning. Groups below the minimum sample size
/// are still tested but flagged.
///
/// # Example
///
/// ```
/// use vnflow_eval::{SignificanceConfig, ttest};
///
/// let high = [0.03, 0.05, 0.04, 0.06];
/// let low = [-0.01, 0.00, -0.02, 0.01];
/// let result = ttest(&high, &low, &SignificanceConfig::default());
/// assert!(result.mean_diff.unwrap() > 0.0);
/// ```
pub fn ttest(a: &[f64], b: &[f64], config: &SignificanceConfig) -> TTestResult {
    let (n_a, n_b) = (a.len(), b.len());
    let mut result = TTestResult {
        t_statistic: None,
        p_value: None,
        n_a,
        n_b,
        mean_a: None,
        mean_b: None,
        mean_diff: None,
        significant: false,
        warning: None,
    };

    let (Some(ma), Some(mb)) = (sample_moments(a), sample_moments(b)) else {
        result.warning = Some("Insufficient sample size".to_string());
        return result;
    };
    let (Some(sa), Some(sb)) = (ma.std, mb.std) else {
        result.warning = Some("Insufficient sample size".to_string());
        return result;
    };

    result.mean_a = Some(ma.mean);
    result.mean_b = Some(mb.mean);
    let diff = ma.mean - mb.mean;
    result.mean_diff = Some(diff);

    let (na, nb) = (n_a as f64, n_b as f64);
    let (va, vb) = (sa * sa, sb * sb);
    let (se, df) = if config.equal_var {
        let dof = na + nb - 2.0;
        let pooled = ((na - 1.0) * va + (nb - 1.0) * vb) / dof;
        ((pooled * (1.0 / na + 1.0 / nb)).sqrt(), dof)
    } else {
        let qa = va / na;
        let qb = vb / nb;
        let dof = (qa + qb).powi(2) / (qa * qa / (na - 1.0) + qb * qb / (nb - 1.0));
        ((qa + qb).sqrt(), dof)
    };

    if se == 0.0 {
        result.warning = Some("Zero variance in both groups".to_string());
        return result;
    }

    let t = diff / se;
    result.t_statistic = Some(t);
    result.p_value = t_two_sided(t, df);
    result.significant = config.is_significant(result.p_value);
    if n_a < config.min_sample_size || n_b < config.min_sample_size {
        result.warning = Some(format!("Small sample size (n1={n_a}, n2={n_b})"));
    }
    result
}

/// One-sample t-test of the mean of `values` against `mu`.
pub fn one_sample_ttest(values: &[f64], mu: f64, config: &SignificanceConfig) -> TestResult {
    let n = values.len();
    let Some((mean, std)) = sample_moments(values).and_then(|m| m.std.map(|s| (m.mean, s))) else {
        return TestResult::unavailable(n, "Insufficient sample size");
    };
    if std == 0.0 {
        return TestResult::unavailable(n, "Zero variance");
    }

    let t = (mean - mu) / (std / (n as f64).sqrt());
    let p_value = t_two_sided(t, (n - 1) as f64);
    TestResult {
        statistic: Some(t),
        p_value,
        n,
        significant: config.is_significant(p_value),
        warning: (n < config.min_sample_size).then(|| format!("Small sample size (n={n})")),
    }
}

/// One-way ANOVA outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnovaResult {
    /// F statistic.
    pub f_statistic: Option<f64>,
    /// Upper-tail p-value.
    pub p_value: Option<f64>,
    /// Observations per group.
    pub group_sizes: Vec<usize>,
    /// Mean per group; all `None` when the test could not run.
    pub group_means: Vec<Option<f64>>,
    /// `p_value < alpha`.
    pub significant: bool,
    /// Data-quality note.
    pub warning: Option<String>,
}

/// One-way ANOVA across `groups`.
///
/// Fewer than two groups, or any group with fewer than two values, gives a
/// null result with a warning. If every group is internally constant the
/// F statistic is undefined and reported as `None`.
pub fn anova(groups: &[Vec<f64>], config: &SignificanceConfig) -> AnovaResult {
    let group_sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
    let unavailable = |warning: &str| AnovaResult {
        f_statistic: None,
        p_value: None,
        group_sizes: group_sizes.clone(),
        group_means: vec![None; groups.len()],
        significant: false,
        warning: Some(warning.to_string()),
    };

    if groups.len() < 2 {
        return unavailable("Need at least two groups");
    }
    if group_sizes.iter().any(|n| *n < 2) {
        return unavailable("Insufficient sample size in one or more groups");
    }

    let means: Vec<f64> = groups
        .iter()
        .map(|g| g.iter().sum::<f64>() / g.len() as f64)
        .collect();
    let total: usize = group_sizes.iter().sum();
    let grand_mean = groups.iter().flatten().sum::<f64>() / total as f64;

    let ss_between: f64 = means
        .iter()
        .zip(&group_sizes)
        .map(|(m, n)| *n as f64 * (m - grand_mean).powi(2))
        .sum();
    let ss_within: f64 = groups
        .iter()
        .zip(&means)
        .map(|(g, m)| g.iter().map(|x| (x - m).powi(2)).sum::<f64>())
        .sum();

    let k = groups.len() as f64;
    let d1 = k - 1.0;
    let d2 = total as f64 - k;
    let group_means = means.iter().copied().map(Some).collect();

    if ss_within == 0.0 {
        return AnovaResult {
            f_statistic: None,
            p_value: None,
            group_sizes,
            group_means,
            significant: false,
            warning: Some("Zero within-group variance".to_string()),
        };
    }

    let f = (ss_between / d1) / (ss_within / d2);
    let p_value = f_upper(f, d1, d2);
    let smallest = group_sizes.iter().copied().min().unwrap_or(0);
    AnovaResult {
        f_statistic: Some(f),
        p_value,
        group_sizes,
        group_means,
        significant: config.is_significant(p_value),
        warning: (smallest < config.min_sample_size)
            .then(|| format!("Small sample size (smallest group n={smallest})")),
    }
}

/// Expected direction of an ordered sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonotonicDirection {
    /// Values should rise with group rank.
    Increasing,
    /// Values should fall with group rank.
    Decreasing,
}

/// Monotonicity test outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonotonicityResult {
    /// Hypothesised direction.
    pub direction: MonotonicDirection,
    /// Spearman correlation between group rank and value.
    pub correlation: Option<f64>,
    /// Two-sided p-value of the correlation.
    pub p_value: Option<f64>,
    /// Correlation has the expected sign and `p_value < alpha`.
    pub is_monotonic: bool,
    /// Groups with a value.
    pub n: usize,
    /// Data-quality note.
    pub warning: Option<String>,
}

/// Tests whether ordered group values trend in `direction`.
///
/// `values[i]` belongs to group rank `i + 1`; missing values are dropped
/// while the remaining ranks are kept. At least three values are required.
pub fn monotonicity(
    values: &[Option<f64>],
    direction: MonotonicDirection,
    config: &SignificanceConfig,
) -> MonotonicityResult {
    let (ranks, observed): (Vec<f64>, Vec<f64>) = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| v.map(|v| ((i + 1) as f64, v)))
        .unzip();
    let n = observed.len();
    let mut result = MonotonicityResult {
        direction,
        correlation: None,
        p_value: None,
        is_monotonic: false,
        n,
        warning: None,
    };

    if n < 3 {
        result.warning = Some("Too few points for monotonicity test".to_string());
        return result;
    }
    let Some(test) = correlation_test(&ranks, &observed, CorrelationMethod::Spearman) else {
        result.warning = Some("Constant values, correlation undefined".to_string());
        return result;
    };

    let sign_ok = match direction {
        MonotonicDirection::Increasing => test.correlation > 0.0,
        MonotonicDirection::Decreasing => test.correlation < 0.0,
    };
    result.correlation = Some(test.correlation);
    result.p_value = Some(test.p_value);
    result.is_monotonic = sign_ok && test.p_value < config.alpha;
    result
}

/// Whether every consecutive pair moves strictly in `direction`.
///
/// Missing values break the chain, so any `None` returns `false`.
pub fn is_strictly_monotonic(values: &[Option<f64>], direction: MonotonicDirection) -> bool {
    values.windows(2).all(|w| match (w[0], w[1], direction) {
        (Some(a), Some(b), MonotonicDirection::Increasing) => b > a,
        (Some(a), Some(b), MonotonicDirection::Decreasing) => b < a,
        _ => false,
    })
}

/// Annualized Sharpe ratio of a return series with a test of its mean against zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharpeSignificance {
    /// `mean * periods / (std * sqrt(periods))`.
    pub sharpe: Option<f64>,
    /// Annualized mean return.
    pub annual_return: Option<f64>,
    /// Annualized volatility.
    pub annual_volatility: Option<f64>,
    /// One-sample t-test of the mean return against zero.
    pub test: TestResult,
}

/// Annualized Sharpe ratio of `returns` and whether their mean differs from zero.
pub fn sharpe_significance(
    returns: &[Option<f64>],
    periods_per_year: f64,
    config: &SignificanceConfig,
) -> SharpeSignificance {
    let clean = non_null(returns);
    let moments = sample_moments(&clean);
    let annual_return = moments.map(|m| m.mean * periods_per_year);
    let annual_volatility = moments.and_then(|m| m.std).map(|s| s * periods_per_year.sqrt());
    let sharpe = match (annual_return, annual_volatility) {
        (Some(r), Some(v)) if v > 0.0 => Some(r / v),
        _ => None,
    };

    SharpeSignificance {
        sharpe,
        annual_return,
        annual_volatility,
        test: one_sample_ttest(&clean, 0.0, config),
    }
}

/// Top-minus-bottom group spread with its t-test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpreadTest {
    /// Label of the top group.
    pub top_label: String,
    /// Label of the bottom group.
    pub bottom_label: String,
    /// `mean(top) - mean(bottom)`.
    pub spread: Option<f64>,
    /// Welch (or pooled) t-test of top against bottom.
    pub test: TTestResult,
}

/// Tests whether the highest group's returns exceed the lowest group's.
///
/// `groups` holds 1-based group indices aligned with `returns`; the top group
/// is the last label and the bottom group the first.
///
/// # Panics
///
/// Panics if `groups` and `returns` differ in length or `labels` is empty.
pub fn quintile_spread_test(
    groups: &[Option<usize>],
    returns: &[Option<f64>],
    labels: &[String],
    config: &SignificanceConfig,
) -> SpreadTest {
    assert!(!labels.is_empty(), "at least one group label is required");
    let split = split_by_group(groups, returns, labels.len());
    let top = labels.len() - 1;
    let test = ttest(&split[top], &split[0], config);

    SpreadTest {
        top_label: labels[top].clone(),
        bottom_label: labels[0].clone(),
        spread: test.mean_diff,
        test,
    }
}
