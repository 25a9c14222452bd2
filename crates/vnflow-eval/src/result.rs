//! Shared result records and test configuration.

use serde::{Deserialize, Serialize};
use vnflow_traits::AnalysisConfig;
use vnflow_traits::stats::{median, sample_moments};

/// Parameters every hypothesis test reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignificanceConfig {
    /// Significance level.
    pub alpha: f64,
    /// Sample size below which a result carries a reliability warning.
    pub min_sample_size: usize,
    /// Use the pooled-variance t-test instead of Welch's.
    pub equal_var: bool,
}

impl Default for SignificanceConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            min_sample_size: 30,
            equal_var: false,
        }
    }
}

impl From<&AnalysisConfig> for SignificanceConfig {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            alpha: config.significance_level,
            min_sample_size: config.min_sample_size,
            equal_var: false,
        }
    }
}

impl SignificanceConfig {
    /// Whether `p` is below the significance level. A missing p-value is never significant.
    pub fn is_significant(&self, p: Option<f64>) -> bool {
        p.is_some_and(|p| p < self.alpha)
    }
}

/// Generic outcome of one hypothesis test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Test statistic.
    pub statistic: Option<f64>,
    /// p-value.
    pub p_value: Option<f64>,
    /// Observations used.
    pub n: usize,
    /// `p_value < alpha`.
    pub significant: bool,
    /// Data-quality note, when the sample was short or degenerate.
    pub warning: Option<String>,
}

impl TestResult {
    /// A result with no statistic and an explanation.
    pub fn unavailable(n: usize, warning: impl Into<String>) -> Self {
        Self {
            statistic: None,
            p_value: None,
            n,
            significant: false,
            warning: Some(warning.into()),
        }
    }
}

/// Summary of the values falling in one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    /// Group label.
    pub label: String,
    /// Mean value.
    pub mean: Option<f64>,
    /// Sample standard deviation.
    pub std: Option<f64>,
    /// Number of values.
    pub count: usize,
    /// Median value.
    pub median: Option<f64>,
}

impl GroupStats {
    /// Summarizes `values` under `label`.
    pub fn from_values(label: impl Into<String>, values: &[f64]) -> Self {
        let moments = sample_moments(values);
        Self {
            label: label.into(),
            mean: moments.map(|m| m.mean),
            std: moments.and_then(|m| m.std),
            count: values.len(),
            median: median(values),
        }
    }
}

/// Splits `values` by 1-based group index, dropping rows with a missing group or value.
///
/// # Panics
///
/// Panics if `groups` and `values` differ in length.
pub fn split_by_group(groups: &[Option<usize>], values: &[Option<f64>], n_groups: usize) -> Vec<Vec<f64>> {
    assert_eq!(groups.len(), values.len(), "groups and values must be aligned");
    let mut out = vec![Vec::new(); n_groups];
    for (g, v) in groups.iter().zip(values) {
        if let (Some(g), Some(v)) = (g, v)
            && (1..=n_groups).contains(g)
        {
            out[g - 1].push(*v);
        }
    }
    out
}

/// Per-group summaries for labelled groups.
///
/// # Panics
///
/// Panics if `groups` and `values` differ in length.
pub fn group_stats(groups: &[Option<usize>], values: &[Option<f64>], labels: &[String]) -> Vec<GroupStats> {
    split_by_group(groups, values, labels.len())
        .iter()
        .zip(labels)
        .map(|(v, label)| GroupStats::from_values(label.clone(), v))
        .collect()
}
