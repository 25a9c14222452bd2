//! Section-level availability marker for aggregate results.

use crate::{Result, VnflowError};
use serde::{Deserialize, Serialize};

/// Either a computed value or the reason it could not be computed.
///
/// Research reports wrap each sub-analysis in an `Outcome` so a missing
/// column or a short sample marks that section unavailable while the rest
/// of the report is still produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome<T> {
    /// The analysis ran.
    Computed(T),
    /// The analysis was skipped.
    Skipped {
        /// Why it was skipped.
        reason: String,
    },
}

impl<T> Outcome<T> {
    /// Builds a skipped outcome.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    /// Converts a result, turning recoverable errors into [`Outcome::Skipped`].
    ///
    /// # Errors
    ///
    /// Non-recoverable errors (bad configuration, malformed input) are returned.
    pub fn from_result(result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Self::Computed(value)),
            Err(e) if e.is_recoverable() => {
                tracing::debug!(reason = %e, "analysis skipped");
                Ok(Self::skipped(e.to_string()))
            }
            Err(e) => Err(e),
        }
    }

    /// Returns the computed value, if any.
    pub const fn computed(&self) -> Option<&T> {
        match self {
            Self::Computed(v) => Some(v),
            Self::Skipped { .. } => None,
        }
    }

    /// Returns the skip reason, if any.
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Computed(_) => None,
            Self::Skipped { reason } => Some(reason),
        }
    }

    /// Whether the analysis ran.
    pub const fn is_computed(&self) -> bool {
        matches!(self, Self::Computed(_))
    }
}

impl<T> From<VnflowError> for Outcome<T> {
    fn from(e: VnflowError) -> Self {
        Self::skipped(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_result_recoverable() {
        let out: Outcome<i32> =
            Outcome::from_result(Err(VnflowError::MissingColumn("pe".to_string()))).unwrap();
        assert!(!out.is_computed());
        assert_eq!(out.reason(), Some("Missing required column: pe"));
    }

    #[test]
    fn test_from_result_fatal() {
        let res: Result<Outcome<i32>> =
            Outcome::from_result(Err(VnflowError::InvalidConfig("bad".to_string())));
        assert!(res.is_err());
    }

    #[test]
    fn test_computed() {
        let out = Outcome::from_result(Ok(3)).unwrap();
        assert_eq!(out.computed(), Some(&3));
        assert_eq!(out.reason(), None);
    }

    #[test]
    fn test_serialize_tagged() {
        let out: Outcome<u8> = Outcome::skipped("short sample");
        let json = serde_json::to_string(&out).unwrap();
        assert_eq!(json, r#"{"status":"skipped","reason":"short sample"}"#);
    }
}
