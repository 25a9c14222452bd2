#![doc(issue_tracker_base_url = "https://github.com/vnflow/vnflow/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # vnflow
//!
//! Flow and valuation signal research for Vietnamese equities.
//!
//! vnflow is an umbrella crate that re-exports all vnflow sub-crates for
//! convenience: the panel and configuration vocabulary, the signal builders,
//! the statistical tests, the composite scorer, and the research questions.
//!
//! ## Quick Start
//!
//! ```ignore
//! use vnflow::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let config = AnalysisConfig::from_json_file("config.json")?;
//! let panel = MergedPanel::from_dataframe(&df)?.with_ticker("HPG");
//!
//! // Normalize signals and score each session
//! let mut frame = normalize_all(&panel, &config)?;
//! CompositeScorer::default().attach(&mut frame)?;
//!
//! // Or answer every research question at once
//! let report = run_ticker(&panel, &config, &Question::ALL)?;
//! println!("{:?}", report.computed());
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Panel, schema, configuration, rolling statistics, [`Signal`]
//! - [`signals`] - ADV/GTGD/z-score flow signals, valuation percentiles, conflicts, regimes
//! - [`combine`] - The [`Combiner`] trait and the composite score
//! - [`eval`] - Forward returns, quantiles, IC, t-tests, ANOVA, backtest, CAPM
//! - [`research`] - Lead-lag, self-trading, conflict, valuation, and composite questions
//!
//! ## Pipeline
//!
//! 1. **Panels** merge prices, flows, and valuation multiples on trading date
//! 2. **Signals** normalize raw flows and multiples into comparable series
//! 3. **Evaluation** relates signals to forward returns with significance tests
//! 4. **Research** bundles the evaluations into one report per ticker

/// Version information for the vnflow crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Vocabulary
// ============================================================================

/// Shared vocabulary.
///
/// - [`MergedPanel`] - One ticker's aligned daily fields
/// - [`AnalysisConfig`] - Every tunable window, horizon, and threshold
/// - [`Outcome`] - A computed section or the reason it was skipped
/// - [`Signal`] - A per-session series derived from a panel
pub mod traits {
    pub use vnflow_traits::*;
}

// Re-export core traits at top level for convenience
pub use vnflow_combine::Combiner;
pub use vnflow_traits::Signal;

// Re-export error types
pub use vnflow_traits::{Result, VnflowError};

// Re-export common types
pub use vnflow_traits::{AnalysisConfig, Date, Field, MergedPanel, Outcome, SignalField};

// ============================================================================
// Signals
// ============================================================================

/// Signal builders.
///
/// ## Flow
///
/// - **ADV-relative**: net buy value over rolling average daily volume
/// - **GTGD-relative**: self-trading net over gross traded value
/// - **Z-score**: rolling z-score of net buy value
///
/// ## Valuation
///
/// - **Percentile**: PE, PB, PCF rank against trailing history, with zones
///
/// ## Context
///
/// - **Conflict states**: foreign versus self-trading direction
/// - **Market regime**: benchmark above or below its moving average
///
/// # Example
///
/// ```ignore
/// use vnflow::signals::{normalize_all, SignalFrame};
///
/// let frame: SignalFrame = normalize_all(&panel, &config)?;
/// for (field, reason) in frame.skipped() {
///     println!("{field} skipped: {reason}");
/// }
/// ```
pub mod signals {
    pub use vnflow_signals::*;
}

// ============================================================================
// Signal Combination
// ============================================================================

/// Signal combination.
///
/// The composite score adds flow z-scores and subtracts the mean valuation
/// percentile scaled to [0, 1]:
///
/// ```text
/// score = z(foreign) + z(self) - mean(pe_percentile, pb_percentile) / 100
/// ```
pub mod combine {
    pub use vnflow_combine::*;
}

// ============================================================================
// Evaluation
// ============================================================================

/// Statistical evaluation of signals.
///
/// ## Key Components
///
/// - **ForwardReturns**: look-ahead returns and excess returns per horizon
/// - **Quantile binning**: equal-population groups with a percentile fallback
/// - **Information Coefficient**: Pearson or Spearman correlation with its t-test
/// - **Significance**: Welch t-test, ANOVA, monotonicity, Sharpe significance
/// - **Lag scan**: lagged correlations as a lead-lag proxy
/// - **Backtest**: Q5 minus Q1 long-short spread with annualized Sharpe
/// - **CAPM**: alpha and beta of a strategy against the market
///
/// ### Information Coefficient (IC)
///
/// ```text
/// IC = corr(signal_t, return_{t -> t+horizon})
/// ```
///
/// A self-correlation reports IC = 1 with an infinite t-statistic.
pub mod eval {
    pub use vnflow_eval::*;
}

// ============================================================================
// Research
// ============================================================================

/// Research questions and the universe runner.
///
/// # Example
///
/// ```ignore
/// use vnflow::research::{Question, run_universe};
///
/// let reports = run_universe(&panels, &config, &[Question::LeadLag, Question::Valuation])?;
/// ```
pub mod research {
    pub use vnflow_research::*;
}

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```ignore
/// use vnflow::prelude::*;
/// ```
///
/// This brings into scope:
/// - Core traits: [`Signal`], [`Combiner`]
/// - Common types: [`MergedPanel`], [`AnalysisConfig`], [`Outcome`], [`Date`]
/// - Entry points: `normalize_all`, `CompositeScorer`, `run_ticker`, `run_universe`
/// - Error types: [`Result`], [`VnflowError`]
pub mod prelude {
    pub use crate::{AnalysisConfig, Date, Field, MergedPanel, Outcome, SignalField};
    pub use crate::{Combiner, Signal};
    pub use crate::{Result, VnflowError};
    pub use vnflow_combine::{CompositeConfig, CompositeScorer};
    pub use vnflow_research::{Question, TickerReport, run_ticker, run_universe};
    pub use vnflow_signals::{SignalFrame, normalize_all};
}

// ============================================================================
// Tests
// ============================================================================
