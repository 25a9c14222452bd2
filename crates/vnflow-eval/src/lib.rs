//! Statistical evaluation of vnflow signals.
//!
//! This crate turns normalized signals into evidence:
//! - Forward (look-ahead) returns and excess returns
//! - Quantile binning with a degenerate-input fallback
//! - Pearson/Spearman correlation and the Information Coefficient (IC)
//! - t-tests, ANOVA, monotonicity and Sharpe significance
//! - A lagged-correlation scan as a Granger-causality proxy
//! - IC decay across horizons
//! - The quintile long-short backtest and CAPM attribution
//!
//! # Example
//!
//! ```rust,ignore
//! use vnflow_eval::{CorrelationMethod, ForwardReturns, SignificanceConfig, information_coefficient};
//!
//! let forward = ForwardReturns::excess(&close, &benchmark, &[1, 5, 20]);
//! let ic = information_coefficient(&signal, forward.get(5).unwrap(), CorrelationMethod::Pearson, &SignificanceConfig::default());
//! ```

pub mod backtest;
pub mod capm;
pub mod correlation;
pub mod decay;
mod distribution;
pub mod forward;
pub mod granger;
pub mod quantile;
pub mod ranking;
pub mod result;
pub mod significance;

// Re-export main types
pub use backtest::{Backtest, BacktestConfig, BacktestResult, annualized_sharpe};
pub use capm::{CapmResult, capm};
pub use correlation::{
    CorrelationMethod, CorrelationTest, IcResult, compute_ranks, correlation_test, information_coefficient,
    pearson, spearman,
};
pub use decay::{DecayAnalysis, DecayCurve, ic_decay};
pub use forward::{ForwardReturns, forward_excess_return, forward_return};
pub use granger::{LagCorrelation, LagScanConfig, lagged_correlation_scan, strongest_lag};
pub use quantile::{BinningMethod, QuantileBinning, QuantileScheme, bin_into_quantiles, bin_scheme};
pub use ranking::{RankDirection, RankedEntry, rank_cross_section, rank_snapshot};
pub use result::{GroupStats, SignificanceConfig, TestResult, group_stats, split_by_group};
pub use significance::{
    AnovaResult, MonotonicDirection, MonotonicityResult, SharpeSignificance, SpreadTest, TTestResult, anova,
    is_strictly_monotonic, monotonicity, one_sample_ttest, quintile_spread_test, sharpe_significance, ttest,
};
