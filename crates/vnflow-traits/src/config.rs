//! Analysis configuration.
//!
//! Every tunable the pipeline reads lives in [`AnalysisConfig`]. Nothing
//! downstream hardcodes a window, a horizon, or a significance level.

use crate::{Result, VnflowError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Parameters shared by signal construction, testing, and research runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Significance level for every hypothesis test.
    pub significance_level: f64,
    /// Sample size below which a test result carries a reliability warning.
    pub min_sample_size: usize,
    /// Rolling window for ADV-relative flow signals.
    pub adv_window: usize,
    /// Rolling window for flow z-scores.
    pub zscore_window: usize,
    /// Rolling window for valuation percentiles.
    pub percentile_window: usize,
    /// Forward-return horizons in sessions.
    pub forward_horizons: Vec<usize>,
    /// Moving-average window of the benchmark used for bull/bear regimes.
    pub regime_ma_window: usize,
    /// Largest lag scanned by the lagged-correlation test.
    pub max_lag: usize,
    /// Minimum aligned observations for one lag of the lagged-correlation test.
    pub min_lag_observations: usize,
    /// Minimum paired observations for CAPM attribution.
    pub capm_min_observations: usize,
    /// Sessions per year used for annualization.
    pub trading_days_per_year: usize,
    /// Candidate ADV windows searched for the best normalization.
    pub normalization_windows: Vec<usize>,
    /// Minimum valid rows for a tercile analysis.
    pub min_tercile_observations: usize,
    /// Minimum valid rows for a decile analysis.
    pub min_decile_observations: usize,
    /// Minimum non-null self-trading points for the data to count as available.
    pub min_self_trading_points: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            significance_level: 0.05,
            min_sample_size: 30,
            adv_window: 20,
            zscore_window: 252,
            percentile_window: 756,
            forward_horizons: vec![1, 3, 5, 10, 20, 30],
            regime_ma_window: 200,
            max_lag: 10,
            min_lag_observations: 20,
            capm_min_observations: 10,
            trading_days_per_year: 252,
            normalization_windows: vec![5, 10, 20, 30, 60],
            min_tercile_observations: 30,
            min_decile_observations: 100,
            min_self_trading_points: 100,
        }
    }
}

impl AnalysisConfig {
    /// Parses a configuration from JSON text. Missing keys take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or the values fail
    /// [`AnalysisConfig::validate`].
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and validates a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read or parsed, or when
    /// validation fails.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Checks that every window is positive and the significance level is in (0, 1).
    ///
    /// # Errors
    ///
    /// Returns [`VnflowError::InvalidConfig`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(VnflowError::InvalidConfig(format!(
                "significance_level must be in (0, 1), got {}",
                self.significance_level
            )));
        }
        let windows = [
            ("adv_window", self.adv_window),
            ("zscore_window", self.zscore_window),
            ("percentile_window", self.percentile_window),
            ("regime_ma_window", self.regime_ma_window),
            ("max_lag", self.max_lag),
            ("trading_days_per_year", self.trading_days_per_year),
        ];
        if let Some((name, _)) = windows.iter().find(|(_, w)| *w == 0) {
            return Err(VnflowError::InvalidConfig(format!("{name} must be positive")));
        }
        if self.forward_horizons.is_empty() {
            return Err(VnflowError::InvalidConfig(
                "forward_horizons must not be empty".to_string(),
            ));
        }
        if self.forward_horizons.contains(&0) {
            return Err(VnflowError::InvalidConfig(
                "forward_horizons must be positive".to_string(),
            ));
        }
        if self.normalization_windows.contains(&0) {
            return Err(VnflowError::InvalidConfig(
                "normalization_windows must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
