//! Rolling-window and summary statistics over nullable series.
//!
//! Series are `&[Option<f64>]` indexed by session. A `None` is missing data,
//! never zero. Every rolling function looks only at the trailing window that
//! ends at (and includes) the current position, and requires at least
//! [`min_periods`] non-null observations before it emits a value.

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values at or below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Minimum number of non-null observations a window of `window` sessions needs.
///
/// This is `window / 2`, floored at one.
pub const fn min_periods(window: usize) -> usize {
    let half = window / 2;
    if half == 0 { 1 } else { half }
}

/// Sample moments of a set of finite observations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleMoments {
    /// Arithmetic mean.
    pub mean: f64,
    /// Sample standard deviation (N-1 denominator); `None` with fewer than two values.
    pub std: Option<f64>,
    /// Number of observations.
    pub count: usize,
}

/// Computes mean and sample standard deviation in two passes.
///
/// Returns `None` for an empty slice.
pub fn sample_moments(values: &[f64]) -> Option<SampleMoments> {
    let count = values.len();
    if count == 0 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / count as f64;
    let std = (count > 1).then(|| {
        let ss = values.iter().map(|x| (x - mean).powi(2)).sum::<f64>();
        (ss / (count - 1) as f64).sqrt()
    });
    Some(SampleMoments { mean, std, count })
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    sample_moments(values).map(|m| m.mean)
}

/// Sample standard deviation (ddof = 1), `None` with fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    sample_moments(values).and_then(|m| m.std)
}

/// Sample covariance (ddof = 1) of two equally long slices.
///
/// Returns `None` when the slices differ in length or have fewer than two values.
pub fn sample_covariance(x: &[f64], y: &[f64]) -> Option<f64> {
    if x.len() != y.len() || x.len() < 2 {
        return None;
    }
    let mx = mean(x)?;
    let my = mean(y)?;
    let s = x.iter().zip(y).map(|(a, b)| (a - mx) * (b - my)).sum::<f64>();
    Some(s / (x.len() - 1) as f64)
}

/// Median of a set of observations, `None` for an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Percentile (0-100) of `score` relative to `reference`, "rank" convention.
///
/// Ties contribute half weight, so a score equal to every reference value
/// lands at 50 plus half a bucket. Returns `None` for an empty reference set.
pub fn percentile_of_score(reference: &[f64], score: f64) -> Option<f64> {
    if reference.is_empty() {
        return None;
    }
    let left = reference.iter().filter(|&&x| x < score).count();
    let right = reference.iter().filter(|&&x| x <= score).count();
    let bump = usize::from(right > left);
    Some((left + right + bump) as f64 * 50.0 / reference.len() as f64)
}

/// Keeps only the positions where both series carry a value.
pub fn drop_null_pairs(x: &[Option<f64>], y: &[Option<f64>]) -> (Vec<f64>, Vec<f64>) {
    x.iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .unzip()
}

/// Non-null values of a series, in order.
pub fn non_null(values: &[Option<f64>]) -> Vec<f64> {
    values.iter().flatten().copied().collect()
}

/// Period-over-period percentage change, `values[t] / values[t - periods] - 1`.
///
/// Null when either end is missing or the base is zero.
///
/// # Panics
///
/// Panics if `periods` is zero.
pub fn pct_change(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    assert!(periods > 0, "pct_change periods must be positive");
    (0..values.len())
        .map(|t| {
            let base = values[t.checked_sub(periods)?]?;
            let now = values[t]?;
            (base != 0.0).then(|| now / base - 1.0)
        })
        .collect()
}

fn window_values(values: &[Option<f64>], end: usize, window: usize) -> Vec<f64> {
    let start = (end + 1).saturating_sub(window);
    non_null(&values[start..=end])
}

/// Trailing rolling mean with a `window / 2` minimum-periods floor.
///
/// # Panics
///
/// Panics if `window` is zero.
pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    assert!(window > 0, "rolling window must be positive");
    let floor = min_periods(window);
    (0..values.len())
        .map(|i| {
            let w = window_values(values, i, window);
            if w.len() < floor { None } else { mean(&w) }
        })
        .collect()
}

/// Trailing rolling sample standard deviation with a `window / 2` floor.
///
/// At least two observations are always required.
///
/// # Panics
///
/// Panics if `window` is zero.
pub fn rolling_std(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    assert!(window > 0, "rolling window must be positive");
    let floor = min_periods(window);
    (0..values.len())
        .map(|i| {
            let w = window_values(values, i, window);
            if w.len() < floor { None } else { sample_std(&w) }
        })
        .collect()
}

/// Trailing rolling z-score, `(x - rolling_mean) / rolling_std`.
///
/// The window includes the current observation. A missing current value, a
/// window below the minimum-periods floor, or a window whose standard
/// deviation is at or below [`MIN_STD_THRESHOLD`] all produce `None`.
///
/// # Panics
///
/// Panics if `window` is zero.
///
/// # Example
///
/// ```
/// use vnflow_traits::stats::rolling_zscore;
///
/// let values = vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)];
/// let z = rolling_zscore(&values, 4);
/// assert!(z[0].is_none());
/// assert!((z[3].unwrap() - 1.161_895).abs() < 1e-6);
/// ```
pub fn rolling_zscore(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    assert!(window > 0, "rolling window must be positive");
    let floor = min_periods(window);
    (0..values.len())
        .map(|i| {
            let x = values[i]?;
            let w = window_values(values, i, window);
            if w.len() < floor {
                return None;
            }
            let m = sample_moments(&w)?;
            let std = m.std.filter(|s| *s > MIN_STD_THRESHOLD)?;
            Some((x - m.mean) / std)
        })
        .collect()
}

/// Trailing rolling percentile rank (0-100) of each observation.
///
/// The window covers the most recent `window` sessions ending at the current
/// index. The current value is ranked against the *prior* non-null values of
/// that window only, so no observation is ever compared with itself or with
/// anything later. A missing current value, no prior values, or a window
/// below the minimum-periods floor produce `None`.
///
/// # Panics
///
/// Panics if `window` is zero.
pub fn rolling_percentile_rank(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    assert!(window > 0, "rolling window must be positive");
    let floor = min_periods(window);
    (0..values.len())
        .map(|i| {
            let x = values[i]?;
            let start = (i + 1).saturating_sub(window);
            let prior = non_null(&values[start..i]);
            if prior.len() + 1 < floor {
                return None;
            }
            percentile_of_score(&prior, x)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().map(|v| Some(*v)).collect()
    }

    #[test]
    fn test_min_periods() {
        assert_eq!(min_periods(1), 1);
        assert_eq!(min_periods(3), 1);
        assert_eq!(min_periods(20), 10);
        assert_eq!(min_periods(252), 126);
    }

    #[test]
    fn test_sample_moments() {
        let m = sample_moments(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_relative_eq!(m.mean, 3.0);
        assert_relative_eq!(m.std.unwrap(), 2.5_f64.sqrt());
        assert_eq!(m.count, 5);

        assert!(sample_moments(&[]).is_none());
        assert!(sample_moments(&[1.0]).unwrap().std.is_none());
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn test_covariance() {
        let x = [1.0, 2.0, 3.0];
        let y = [2.0, 4.0, 6.0];
        assert_relative_eq!(sample_covariance(&x, &y).unwrap(), 2.0);
        assert!(sample_covariance(&x, &y[..2]).is_none());
    }

    #[test]
    fn test_percentile_of_score() {
        let reference = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile_of_score(&reference, 3.0).unwrap(), 62.5);
        assert_relative_eq!(percentile_of_score(&reference, 10.0).unwrap(), 100.0);
        assert_relative_eq!(percentile_of_score(&reference, 0.0).unwrap(), 0.0);
        assert!(percentile_of_score(&[], 1.0).is_none());
    }

    #[test]
    fn test_pct_change() {
        let prices = vec![Some(10.0), Some(11.0), None, Some(12.1), Some(0.0), Some(1.0)];
        let r = pct_change(&prices, 1);
        assert!(r[0].is_none());
        assert_relative_eq!(r[1].unwrap(), 0.1, epsilon = 1e-12);
        assert!(r[2].is_none());
        assert!(r[3].is_none());
        assert!(r[5].is_none());
    }

    #[test]
    fn test_rolling_mean_warm_up() {
        let values = some(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let m = rolling_mean(&values, 4);
        assert!(m[0].is_none());
        assert_relative_eq!(m[1].unwrap(), 1.5);
        assert_relative_eq!(m[5].unwrap(), 4.5);
    }

    #[test]
    fn test_rolling_mean_skips_nulls() {
        let values = vec![Some(1.0), None, Some(3.0)];
        let m = rolling_mean(&values, 3);
        assert_relative_eq!(m[2].unwrap(), 2.0);
        assert_relative_eq!(m[1].unwrap(), 1.0);
    }

    #[test]
    fn test_rolling_std() {
        let values = some(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        let s = rolling_std(&values, 8);
        assert!(s[2].is_none());
        assert_relative_eq!(s[7].unwrap(), (32.0_f64 / 7.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_rolling_zscore_null_prefix() {
        let values: Vec<Option<f64>> = (0..40).map(|i| Some((i as f64).sin())).collect();
        let window = 20;
        let z = rolling_zscore(&values, window);
        for v in &z[..window / 2 - 1] {
            assert!(v.is_none());
        }
        for v in &z[window / 2 - 1..] {
            assert!(v.is_some());
        }
    }

    #[test]
    fn test_rolling_zscore_constant_window_is_null() {
        let values = some(&[5.0, 5.0, 5.0, 5.0]);
        let z = rolling_zscore(&values, 4);
        assert!(z.iter().all(Option::is_none));
    }

    #[test]
    fn test_rolling_zscore_missing_current() {
        let values = vec![Some(1.0), Some(2.0), None, Some(4.0)];
        let z = rolling_zscore(&values, 4);
        assert!(z[2].is_none());
        assert!(z[3].is_some());
    }

    #[test]
    fn test_rolling_percentile_excludes_current() {
        let values = some(&[1.0, 2.0, 3.0, 4.0]);
        let p = rolling_percentile_rank(&values, 4);
        // first observation has no history
        assert!(p[0].is_none());
        // 2.0 against [1.0]
        assert_relative_eq!(p[1].unwrap(), 100.0);
        // 4.0 against [1.0, 2.0, 3.0]
        assert_relative_eq!(p[3].unwrap(), 100.0);
    }

    #[test]
    fn test_rolling_percentile_ignores_future() {
        let mut values = some(&[3.0, 1.0, 2.0, 5.0]);
        let before = rolling_percentile_rank(&values, 4);
        values.push(Some(-100.0));
        let after = rolling_percentile_rank(&values, 4);
        assert_eq!(&before[..], &after[..4]);
    }

    #[test]
    fn test_rolling_percentile_window_slides() {
        let values = some(&[10.0, 1.0, 2.0, 3.0]);
        let p = rolling_percentile_rank(&values, 3);
        // window at index 3 is [1.0, 2.0, 3.0]; 10.0 has dropped out
        assert_relative_eq!(p[3].unwrap(), 100.0);
        // window at index 2 is [10.0, 1.0, 2.0]; 2.0 beats one of two priors
        assert_relative_eq!(p[2].unwrap(), 50.0);
    }

    #[test]
    #[should_panic(expected = "rolling window must be positive")]
    fn test_zero_window_panics() {
        let _ = rolling_mean(&[Some(1.0)], 0);
    }
}
