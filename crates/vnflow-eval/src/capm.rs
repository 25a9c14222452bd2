//! Single-factor CAPM attribution of strategy returns.

use ndarray::Array1;
use serde::{Deserialize, Serialize};
use vnflow_traits::stats::drop_null_pairs;
use vnflow_traits::{Result, VnflowError};

/// Alpha and beta of a strategy against the market.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapmResult {
    /// Per-period alpha, `mean(strategy) - beta * mean(market)`.
    pub alpha: f64,
    /// Alpha times the periods per year.
    pub alpha_annual: f64,
    /// `cov(strategy, market) / var(market)`; zero when the market is constant.
    pub beta: f64,
    /// Per-period mean strategy return.
    pub mean_return: f64,
    /// Mean strategy return times the periods per year.
    pub mean_return_annual: f64,
    /// Paired observations used.
    pub sample_size: usize,
}

/// Regresses `strategy` on `market` returns.
///
/// Rows missing either return are dropped. Beta uses sample (N-1)
/// covariance and variance.
///
/// # Errors
///
/// Returns [`VnflowError::InsufficientData`] when fewer than
/// `min_observations` pairs remain.
///
/// # Example
///
/// ```rust,ignore
/// use vnflow_eval::capm;
///
/// let result = capm(&q5_returns, &market_returns, 10, 252.0)?;
/// println!("alpha {:.4} beta {:.2}", result.alpha_annual, result.beta);
/// ```
pub fn capm(
    strategy: &[Option<f64>],
    market: &[Option<f64>],
    min_observations: usize,
    periods_per_year: f64,
) -> Result<CapmResult> {
    let (s, m) = drop_null_pairs(strategy, market);
    let n = s.len();
    if n < min_observations.max(2) {
        return Err(VnflowError::InsufficientData(format!(
            "CAPM needs {min_observations} paired returns, got {n}"
        )));
    }

    let s = Array1::from_vec(s);
    let m = Array1::from_vec(m);
    let (Some(mean_s), Some(mean_m)) = (s.mean(), m.mean()) else {
        return Err(VnflowError::InsufficientData("CAPM needs returns".into()));
    };

    let ds = &s - mean_s;
    let dm = &m - mean_m;
    let denom = (n - 1) as f64;
    let covariance = ds.dot(&dm) / denom;
    let market_var = dm.dot(&dm) / denom;
    let beta = if market_var == 0.0 { 0.0 } else { covariance / market_var };
    let alpha = mean_s - beta * mean_m;

    Ok(CapmResult {
        alpha,
        alpha_annual: alpha * periods_per_year,
        beta,
        mean_return: mean_s,
        mean_return_annual: mean_s * periods_per_year,
        sample_size: n,
    })
}
