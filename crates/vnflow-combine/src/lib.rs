//! Signal combination for vnflow.
//!
//! Normalized signals are combined into one composite score per session:
//! flow z-scores push the score up and the valuation percentile pulls it
//! down. The [`Combiner`] trait is the seam for alternative weightings.
//!
//! # Examples
//!
//! ```rust,no_run
//! use vnflow_combine::{CompositeConfig, CompositeScorer};
//! use vnflow_signals::normalize_all;
//! use vnflow_traits::AnalysisConfig;
//!
//! # fn run(panel: &vnflow_traits::MergedPanel) -> vnflow_traits::Result<()> {
//! let mut frame = normalize_all(panel, &AnalysisConfig::default())?;
//! CompositeScorer::new(CompositeConfig::default()).attach(&mut frame)?;
//! # Ok(())
//! # }
//! ```

mod combiner;
mod composite;

// Re-export main types
pub use combiner::{Combiner, SignalScore, common_length};
pub use composite::{CompositeConfig, CompositeScorer};
