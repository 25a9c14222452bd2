//! Signal implementations for the vnflow research toolkit.
//!
//! This crate provides the per-ticker signal builders:
//! - Flow: ADV-relative, GTGD-relative, and rolling z-score of net buy value
//! - Valuation: rolling percentile of PE, PB, and PCF, with valuation zones
//! - Context: foreign/self conflict states and bull/bear market regimes
//!
//! Every signal is a pure function of a [`vnflow_traits::MergedPanel`] and
//! returns one nullable value per panel row.
//!
//! # Example
//!
//! ```ignore
//! use vnflow_signals::{normalize_all, registry::available_signals};
//!
//! let frame = normalize_all(&panel, &AnalysisConfig::default())?;
//! let signals = available_signals();
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod conflict;
pub mod flow;
pub mod normalize;
pub mod regime;
pub mod registry;
pub mod valuation;

// Re-export key types
pub use conflict::{ConflictState, conflict_states};
pub use flow::{AdvRelative, FlowSource, FlowZScore, GtgdRelative, adv_relative, gtgd_relative};
pub use normalize::{SignalFrame, normalize_all};
pub use regime::{MarketRegime, market_regimes, panel_regimes};
pub use registry::{SignalCategory, SignalInfo, available_signals, build_signals};
pub use valuation::{ValuationPercentile, ValuationZone, valuation_zones};
