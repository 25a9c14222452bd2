//! Research questions over vnflow panels.
//!
//! Each question takes one ticker's [`vnflow_traits::MergedPanel`] and an
//! [`vnflow_traits::AnalysisConfig`] and returns a serializable report:
//!
//! | Question | Module | Asks |
//! |---|---|---|
//! | Lead-lag | [`lead_lag`] | does foreign net buying lead excess returns? |
//! | Self-trading | [`self_trading`] | is proprietary flow informative, ADV or GTGD? |
//! | Conflicts | [`conflicts`] | what follows foreign/self disagreement, and who leads? |
//! | Valuation | [`valuation`] | do cheap percentiles earn more? |
//! | Composite | [`composite`] | does the flow-minus-valuation score earn a spread? |
//!
//! [`run_universe`] answers them for many tickers at once on rayon workers.
//!
//! # Example
//!
//! ```rust,ignore
//! use vnflow_research::{Question, run_universe};
//!
//! let reports = run_universe(&panels, &AnalysisConfig::default(), &Question::ALL)?;
//! for report in reports {
//!     let report = report?;
//!     println!("{}: {:?}", report.ticker, report.computed());
//! }
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod common;
pub mod composite;
pub mod conflicts;
pub mod lead_lag;
pub mod report;
pub mod self_trading;
pub mod valuation;

pub use common::QuantileSpread;
pub use composite::{CompositeReport, composite_analysis, composite_score};
pub use conflicts::{
    ConflictRegimeResult, ConflictRegimeSplit, ConflictReport, Leader, Leadership, StateSummary, conflict_analysis,
};
pub use lead_lag::{LeadLagReport, RegimeSplit, WindowSearch, lead_lag_analysis, optimal_normalization_window};
pub use report::{Question, TickerReport, rank_by_composite, run_ticker, run_universe};
pub use self_trading::{
    Availability, MethodComparison, NormalizationMethod, SelfTradingReport, TercileAnalysis, analyze_terciles,
    check_availability, self_trading_analysis,
};
pub use valuation::{
    DecileAnalysis, ReturnPrediction, ValuationReport, ValuationSummary, analyze_deciles, current_valuation,
    predict_forward_return, valuation_analysis,
};
