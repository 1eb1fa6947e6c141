//! Error types for the estimator
//!
//! Library code returns [`Result<T>`] carrying an [`EstimatorError`]. Binaries
//! convert at their boundary with `anyhow`.
//!
//! Unknown catalog keys are deliberately absent from this enum: they resolve
//! to documented fallbacks and surface as [`crate::catalog::CatalogWarning`]s.

use thiserror::Error;

/// Result type for estimator operations
pub type Result<T> = std::result::Result<T, EstimatorError>;

/// Errors that can occur while estimating a migration
#[derive(Debug, Error)]
pub enum EstimatorError {
    /// Input violates a precondition (non-positive counts, negative sizes or costs)
    #[error("Invalid configuration: {field} {reason}")]
    InvalidConfiguration { field: String, reason: String },

    /// A catalog file could not be turned into a usable catalog
    #[error("Catalog load error: {0}")]
    CatalogLoad(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EstimatorError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EstimatorError::InvalidConfiguration {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the caller supplied bad input
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, EstimatorError::InvalidConfiguration { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_configuration_display() {
        let err = EstimatorError::invalid("source.instance_count", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: source.instance_count must be at least 1"
        );
        assert!(err.is_invalid_configuration());
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: EstimatorError = io.into();
        assert!(matches!(err, EstimatorError::Io(_)));
        assert!(!err.is_invalid_configuration());
    }
}
