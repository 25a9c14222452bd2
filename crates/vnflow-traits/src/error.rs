//! Error types for the vnflow toolkit.
//!
//! Data-quality problems (short samples, gaps, zero variance) are routine in
//! daily flow data and are normally reported inside result structs as `None`
//! values plus a warning string. The variants below cover the cases where a
//! caller asked for something the input cannot provide, and the cases a
//! research section converts into an "unavailable" marker.

use thiserror::Error;

/// The main error type for vnflow operations.
#[derive(Debug, Error)]
pub enum VnflowError {
    /// A minimum-sample precondition was not met.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// A required input column is absent from the panel.
    #[error("Missing required column: {0}")]
    MissingColumn(String),

    /// Values could not be split into the requested number of groups.
    #[error("Degenerate distribution: {0}")]
    DegenerateDistribution(String),

    /// A denominator or variance was zero where a ratio was required.
    #[error("Numeric degeneracy: {0}")]
    NumericDegeneracy(String),

    /// Error due to invalid or malformed data.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Error when a date is out of order, duplicated, or unparsable.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Error when a configuration value is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error when a signal name is not registered.
    #[error("Signal not found: {0}")]
    SignalNotFound(String),

    /// Error from Polars operations.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Error from JSON (de)serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error reading configuration or panel files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error for other cases.
    #[error("Error: {0}")]
    Other(String),
}

impl VnflowError {
    /// Whether this error describes a data-quality condition that a research
    /// section should record as "unavailable" rather than abort on.
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData(_)
                | Self::MissingColumn(_)
                | Self::DegenerateDistribution(_)
                | Self::NumericDegeneracy(_)
        )
    }
}

impl From<String> for VnflowError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for VnflowError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

/// A specialized Result type for vnflow operations.
pub type Result<T> = std::result::Result<T, VnflowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VnflowError::InsufficientData("need 20 rows".to_string());
        assert_eq!(err.to_string(), "Insufficient data: need 20 rows");

        let err = VnflowError::MissingColumn("self_buy_val".to_string());
        assert_eq!(err.to_string(), "Missing required column: self_buy_val");
    }

    #[test]
    fn test_error_from_str() {
        let err: VnflowError = "boom".into();
        assert!(matches!(err, VnflowError::Other(_)));
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(VnflowError::InsufficientData(String::new()).is_recoverable());
        assert!(VnflowError::MissingColumn(String::new()).is_recoverable());
        assert!(!VnflowError::InvalidConfig(String::new()).is_recoverable());
        assert!(!VnflowError::InvalidDate(String::new()).is_recoverable());
    }

    #[test]
    fn test_result_type() {
        let ok_result: Result<i32> = Ok(42);
        assert!(ok_result.is_ok());

        let err_result: Result<i32> = Err(VnflowError::Other("fail".to_string()));
        assert!(err_result.is_err());
    }
}
