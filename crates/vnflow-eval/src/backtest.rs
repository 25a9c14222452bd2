//! Quintile long-short backtest.
//!
//! Bins a score into quintiles and measures the forward return of the top
//! quintile against the bottom one. The forward return at a session is only
//! ever paired with the score from that same session, so no later data leaks
//! into the ranking.

use crate::forward::forward_return;
use crate::quantile::{BinningMethod, QuantileScheme, bin_scheme};
use crate::result::{GroupStats, SignificanceConfig, group_stats};
use crate::significance::{
    MonotonicDirection, MonotonicityResult, SpreadTest, monotonicity, quintile_spread_test,
};
use serde::{Deserialize, Serialize};
use tracing::debug;
use vnflow_traits::AnalysisConfig;

/// Backtesting configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Holding period in sessions.
    pub horizon: usize,
    /// Sessions per year used for annualization.
    pub trading_days_per_year: usize,
    /// Significance settings for the spread and monotonicity tests.
    pub significance: SignificanceConfig,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            horizon: 5,
            trading_days_per_year: 252,
            significance: SignificanceConfig::default(),
        }
    }
}

impl BacktestConfig {
    /// Backtest settings for `horizon` under an analysis configuration.
    pub fn from_analysis(config: &AnalysisConfig, horizon: usize) -> Self {
        Self {
            horizon,
            trading_days_per_year: config.trading_days_per_year,
            significance: SignificanceConfig::from(config),
        }
    }

    /// Non-overlapping holding periods per year, `trading_days_per_year / horizon`.
    pub const fn periods_per_year(&self) -> usize {
        self.trading_days_per_year / self.horizon
    }
}

/// Backtesting results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Holding period in sessions.
    pub horizon: usize,
    /// Forward-return summary per quintile, Q1 first.
    pub quintile_returns: Vec<GroupStats>,
    /// `mean(Q5) - mean(Q1)`.
    pub spread_mean: Option<f64>,
    /// `sqrt((std_Q5² + std_Q1²) / 2) / sqrt(2)`.
    pub spread_std: Option<f64>,
    /// Annualized Sharpe ratio of the spread.
    pub sharpe_ratio: Option<f64>,
    /// Holding periods per year used to annualize.
    pub periods_per_year: usize,
    /// Rows with both a score and a forward return.
    pub sample_size: usize,
    /// Q5 against Q1 t-test.
    pub spread_test: SpreadTest,
    /// Whether quintile means rise with the score.
    pub monotonicity: MonotonicityResult,
    /// How the score was binned.
    pub binning: BinningMethod,
}

/// Annualized Sharpe ratio of a per-period mean and volatility.
///
/// `(mean * periods) / (std * sqrt(periods))`. A zero volatility or zero
/// periods per year gives `None` rather than an unbounded ratio.
pub fn annualized_sharpe(mean: f64, std: f64, periods_per_year: usize) -> Option<f64> {
    if std == 0.0 || !std.is_finite() || periods_per_year == 0 {
        return None;
    }
    let periods = periods_per_year as f64;
    Some(mean * periods / (std * periods.sqrt()))
}

/// Quintile backtest engine.
#[derive(Debug, Default)]
pub struct Backtest {
    config: BacktestConfig,
}

impl Backtest {
    /// Create a new backtest with configuration.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use vnflow_eval::{Backtest, BacktestConfig};
    ///
    /// let backtest = Backtest::new(BacktestConfig { horizon: 10, ..Default::default() });
    /// let result = backtest.run(&composite, &close);
    /// println!("Sharpe: {:?}", result.sharpe_ratio);
    /// ```
    pub const fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub const fn config(&self) -> &BacktestConfig {
        &self.config
    }

    /// Runs the backtest of `score` against forward returns of `prices`.
    ///
    /// # Panics
    ///
    /// Panics if the configured horizon is zero or the series differ in length.
    pub fn run(&self, score: &[Option<f64>], prices: &[Option<f64>]) -> BacktestResult {
        assert_eq!(score.len(), prices.len(), "score and prices must be aligned");
        let forward = forward_return(prices, self.config.horizon);
        self.run_with_returns(score, &forward)
    }

    /// Runs the backtest against precomputed forward returns.
    ///
    /// # Panics
    ///
    /// Panics if the series differ in length.
    pub fn run_with_returns(&self, score: &[Option<f64>], forward: &[Option<f64>]) -> BacktestResult {
        assert_eq!(score.len(), forward.len(), "score and forward returns must be aligned");
        let scheme = QuantileScheme::Quintile;
        let labels = scheme.labels();
        let bins = bin_scheme(score, scheme);

        let quintile_returns = group_stats(bins.groups(), forward, &labels);
        let spread_test = quintile_spread_test(bins.groups(), forward, &labels, &self.config.significance);
        let means: Vec<Option<f64>> = quintile_returns.iter().map(|g| g.mean).collect();
        let monotonicity = monotonicity(&means, MonotonicDirection::Increasing, &self.config.significance);

        let bottom = &quintile_returns[0];
        let top = &quintile_returns[labels.len() - 1];
        let spread_mean = top.mean.zip(bottom.mean).map(|(t, b)| t - b);
        let spread_std = top
            .std
            .zip(bottom.std)
            .map(|(t, b)| ((t * t + b * b) / 2.0).sqrt() / 2.0_f64.sqrt());

        let periods_per_year = self.config.periods_per_year();
        let sharpe_ratio = spread_mean
            .zip(spread_std)
            .and_then(|(m, s)| annualized_sharpe(m, s, periods_per_year));
        let sample_size = score
            .iter()
            .zip(forward)
            .filter(|(s, f)| s.is_some() && f.is_some())
            .count();

        debug!(
            horizon = self.config.horizon,
            sample_size,
            spread = ?spread_mean,
            "quintile backtest finished"
        );

        BacktestResult {
            horizon: self.config.horizon,
            quintile_returns,
            spread_mean,
            spread_std,
            sharpe_ratio,
            periods_per_year,
            sample_size,
            spread_test,
            monotonicity,
            binning: bins.method(),
        }
    }
}
