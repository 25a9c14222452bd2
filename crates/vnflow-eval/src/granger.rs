//! Lagged-correlation scan.
//!
//! A lightweight stand-in for a Granger-causality test: for each lag the
//! candidate leader is shifted forward and correlated with the dependent
//! series. No own-lag regression or F-test is fitted, so a significant lag is
//! evidence of a leading relationship, not proof of one.

use crate::correlation::{CorrelationMethod, correlation_test};
use crate::result::SignificanceConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;
use vnflow_traits::stats::drop_null_pairs;

/// Correlation of the leader, shifted by `lag`, with the dependent series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LagCorrelation {
    /// Sessions the leader is shifted by.
    pub lag: usize,
    /// Pearson correlation at this lag.
    pub correlation: Option<f64>,
    /// Two-sided p-value.
    pub p_value: Option<f64>,
    /// Aligned pairs used.
    pub n: usize,
    /// `p_value < alpha`.
    pub significant: bool,
    /// Set only on the placeholder row of a short-circuited scan.
    pub warning: Option<String>,
}

/// Parameters of a lag scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LagScanConfig {
    /// Largest lag tested.
    pub max_lag: usize,
    /// Minimum aligned pairs for a lag to be reported.
    pub min_observations: usize,
}

impl Default for LagScanConfig {
    fn default() -> Self {
        Self {
            max_lag: 10,
            min_observations: 20,
        }
    }
}

/// Scans lags `1..=max_lag` for correlation between `leader[t - lag]` and `dependent[t]`.
///
/// Rows where either series is missing are dropped before shifting, so a lag
/// counts paired observations rather than calendar sessions. If fewer than
/// `max_lag + min_observations` pairs remain, a single placeholder row at lag
/// 1 carries the warning "Insufficient data for Granger test". Lags whose
/// aligned sample falls below `min_observations` are left out.
///
/// # Example
///
/// ```rust,ignore
/// use vnflow_eval::{LagScanConfig, SignificanceConfig, lagged_correlation_scan};
///
/// let rows = lagged_correlation_scan(&foreign, &self_flow, &LagScanConfig::default(), &SignificanceConfig::default());
/// let leading: Vec<_> = rows.iter().filter(|r| r.significant).map(|r| r.lag).collect();
/// ```
pub fn lagged_correlation_scan(
    leader: &[Option<f64>],
    dependent: &[Option<f64>],
    scan: &LagScanConfig,
    config: &SignificanceConfig,
) -> Vec<LagCorrelation> {
    let (x, y) = drop_null_pairs(leader, dependent);

    if x.len() < scan.max_lag + scan.min_observations {
        debug!(pairs = x.len(), max_lag = scan.max_lag, "lag scan short-circuited");
        return vec![LagCorrelation {
            lag: 1,
            correlation: None,
            p_value: None,
            n: x.len(),
            significant: false,
            warning: Some("Insufficient data for Granger test".to_string()),
        }];
    }

    (1..=scan.max_lag)
        .filter_map(|lag| {
            let shifted = &x[..x.len() - lag];
            let aligned = &y[lag..];
            if aligned.len() < scan.min_observations {
                return None;
            }
            let test = correlation_test(shifted, aligned, CorrelationMethod::Pearson);
            let p_value = test.map(|t| t.p_value);
            Some(LagCorrelation {
                lag,
                correlation: test.map(|t| t.correlation),
                p_value,
                n: aligned.len(),
                significant: config.is_significant(p_value),
                warning: None,
            })
        })
        .collect()
}

/// The lag with the strongest significant correlation, if any.
pub fn strongest_lag(rows: &[LagCorrelation]) -> Option<&LagCorrelation> {
    rows.iter()
        .filter(|r| r.significant)
        .filter_map(|r| r.correlation.map(|c| (r, c.abs())))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(r, _)| r)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Deterministic pseudo-noise in [-1, 1].
    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
                ((state >> 33) as f64 / (1u64 << 31) as f64) * 2.0 - 1.0
            })
            .collect()
    }

    #[test]
    fn test_detects_leading_series() {
        let x = noise(200, 7);
        let eps = noise(200, 11);
        // y[t] = x[t - 2] plus a little noise
        let y: Vec<Option<f64>> = (0..200)
            .map(|t| if t < 2 { None } else { Some(x[t - 2] + 0.1 * eps[t]) })
            .collect();
        let x: Vec<Option<f64>> = x.into_iter().map(Some).collect();

        let rows = lagged_correlation_scan(&x, &y, &LagScanConfig::default(), &SignificanceConfig::default());
        assert_eq!(rows.len(), 10);
        let best = strongest_lag(&rows).unwrap();
        assert_eq!(best.lag, 2);
        assert!(best.correlation.unwrap() > 0.9);
    }

    #[test]
    fn test_short_series_placeholder() {
        let x: Vec<Option<f64>> = (0..25).map(|i| Some(f64::from(i))).collect();
        let rows = lagged_correlation_scan(&x, &x, &LagScanConfig::default(), &SignificanceConfig::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].lag, 1);
        assert!(rows[0].correlation.is_none());
        assert_eq!(rows[0].warning.as_deref(), Some("Insufficient data for Granger test"));
    }

    #[test]
    fn test_lags_below_minimum_skipped() {
        let scan = LagScanConfig {
            max_lag: 5,
            min_observations: 20,
        };
        let x: Vec<Option<f64>> = noise(26, 3).into_iter().map(Some).collect();
        let y: Vec<Option<f64>> = noise(26, 5).into_iter().map(Some).collect();
        let rows = lagged_correlation_scan(&x, &y, &scan, &SignificanceConfig::default());
        // 26 pairs: lags 1..=5 leave 25..=21 aligned pairs
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.n >= 20 && r.warning.is_none()));
    }
}
