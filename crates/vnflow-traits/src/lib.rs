#![doc(issue_tracker_base_url = "https://github.com/vnflow/vnflow/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Shared vocabulary for the vnflow research toolkit.
//!
//! This crate holds the pieces every other vnflow crate builds on: the error
//! type, the closed schema of panel fields, the merged per-ticker panel, the
//! analysis configuration, rolling statistics over nullable series, and the
//! [`Signal`] trait.

/// The version of the vnflow-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod config;
pub mod error;
pub mod outcome;
pub mod panel;
pub mod schema;
pub mod signal;
pub mod stats;
pub mod types;

// Re-exports
pub use config::AnalysisConfig;
pub use error::{Result, VnflowError};
pub use outcome::Outcome;
pub use panel::{FieldCoverage, MergedPanel, PanelBuilder, PanelSummary, SelfTradingData};
pub use schema::{DATE_COLUMN, Field, FieldKind, SignalField};
pub use signal::Signal;
pub use types::{Date, Ticker, TimeSeries};
