//! Forward (look-ahead) returns.
//!
//! The value stored at session `t` is the return realized between `t` and
//! `t + h`. These series exist only to score signals in backtests and tests;
//! they must never feed a signal for the same or an earlier session.

use serde::{Deserialize, Serialize};

/// Forward return over `horizon` sessions, stored at the origin session.
///
/// `out[t] = prices[t + horizon] / prices[t] - 1`. The last `horizon`
/// positions, and any position whose start or end price is missing or whose
/// start price is zero, are `None`.
///
/// # Panics
///
/// Panics if `horizon` is zero.
///
/// # Example
///
/// ```
/// use vnflow_eval::forward::forward_return;
///
/// let prices = vec![Some(10.0), Some(11.0), Some(12.1)];
/// let fwd = forward_return(&prices, 1);
/// assert!((fwd[0].unwrap() - 0.1).abs() < 1e-12);
/// assert!(fwd[2].is_none());
/// ```
pub fn forward_return(prices: &[Option<f64>], horizon: usize) -> Vec<Option<f64>> {
    assert!(horizon > 0, "forward horizon must be positive");
    (0..prices.len())
        .map(|t| {
            let start = prices[t].filter(|p| *p != 0.0)?;
            let end = (*prices.get(t + horizon)?)?;
            Some(end / start - 1.0)
        })
        .collect()
}

/// Forward return of `prices` minus the benchmark's forward return.
///
/// # Panics
///
/// Panics if `horizon` is zero or the series differ in length.
pub fn forward_excess_return(
    prices: &[Option<f64>],
    benchmark: &[Option<f64>],
    horizon: usize,
) -> Vec<Option<f64>> {
    assert_eq!(prices.len(), benchmark.len(), "price and benchmark must be aligned");
    let stock = forward_return(prices, horizon);
    let market = forward_return(benchmark, horizon);
    stock
        .iter()
        .zip(&market)
        .map(|(s, m)| Some((*s)? - (*m)?))
        .collect()
}

/// Forward returns over several horizons, computed once and shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForwardReturns {
    horizons: Vec<usize>,
    columns: Vec<Vec<Option<f64>>>,
}

impl ForwardReturns {
    /// Forward returns of `prices` for each horizon.
    ///
    /// # Panics
    ///
    /// Panics if any horizon is zero.
    pub fn compute(prices: &[Option<f64>], horizons: &[usize]) -> Self {
        Self {
            horizons: horizons.to_vec(),
            columns: horizons.iter().map(|h| forward_return(prices, *h)).collect(),
        }
    }

    /// Forward excess returns against `benchmark` for each horizon.
    ///
    /// # Panics
    ///
    /// Panics if any horizon is zero or the series differ in length.
    pub fn excess(prices: &[Option<f64>], benchmark: &[Option<f64>], horizons: &[usize]) -> Self {
        Self {
            horizons: horizons.to_vec(),
            columns: horizons
                .iter()
                .map(|h| forward_excess_return(prices, benchmark, *h))
                .collect(),
        }
    }

    /// Horizons in the order requested.
    pub fn horizons(&self) -> &[usize] {
        &self.horizons
    }

    /// Returns for one horizon, if it was computed.
    pub fn get(&self, horizon: usize) -> Option<&[Option<f64>]> {
        self.horizons
            .iter()
            .position(|h| *h == horizon)
            .map(|i| self.columns[i].as_slice())
    }

    /// Iterates over `(horizon, returns)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Option<f64>])> + '_ {
        self.horizons
            .iter()
            .copied()
            .zip(self.columns.iter().map(Vec::as_slice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn prices() -> Vec<Option<f64>> {
        [100.0, 101.5, 99.0, 104.2, 107.0, 103.3, 110.0]
            .iter()
            .map(|p| Some(*p))
            .collect()
    }

    #[test]
    fn test_forward_return_exact() {
        let p = prices();
        for h in [1, 2, 3] {
            let fwd = forward_return(&p, h);
            for t in 0..p.len() {
                if t + h < p.len() {
                    assert_eq!(fwd[t], Some(p[t + h].unwrap() / p[t].unwrap() - 1.0));
                } else {
                    assert!(fwd[t].is_none());
                }
            }
        }
    }

    #[test]
    fn test_missing_prices() {
        let p = vec![Some(10.0), None, Some(12.0), Some(0.0), Some(5.0)];
        let fwd = forward_return(&p, 2);
        assert_relative_eq!(fwd[0].unwrap(), 0.2, epsilon = 1e-12);
        assert!(fwd[1].is_none());
        assert!(fwd[3].is_none());
    }

    #[test]
    fn test_excess() {
        let p = vec![Some(10.0), Some(11.0)];
        let b = vec![Some(100.0), Some(105.0)];
        let ex = forward_excess_return(&p, &b, 1);
        assert_relative_eq!(ex[0].unwrap(), 0.05, epsilon = 1e-12);
        assert!(ex[1].is_none());
    }

    #[test]
    fn test_forward_returns_table() {
        let table = ForwardReturns::compute(&prices(), &[1, 5]);
        assert_eq!(table.horizons(), &[1, 5]);
        assert_eq!(table.get(5).unwrap().iter().flatten().count(), 2);
        assert!(table.get(3).is_none());
        assert_eq!(table.iter().count(), 2);
    }

    #[test]
    #[should_panic(expected = "forward horizon must be positive")]
    fn test_zero_horizon() {
        let _ = forward_return(&prices(), 0);
    }
}
