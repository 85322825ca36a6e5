//! Error types for the ChurnGuard pipeline

use thiserror::Error;

/// Result type alias for ChurnGuard operations
pub type Result<T> = std::result::Result<T, ChurnError>;

/// Main error type for the pipeline.
///
/// Every variant is a caller contract violation; nothing here is transient and
/// nothing is retried.
#[derive(Error, Debug)]
pub enum ChurnError {
    /// A categorical value that was never seen when the encoder was fitted
    #[error("Unknown category '{value}' for column '{column}'")]
    UnknownCategory { column: String, value: String },

    /// A model could not be fitted on the given data
    #[error("Degenerate fit: {0}")]
    DegenerateFit(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ChurnError {
    /// Shorthand for a length/width mismatch between two collections.
    pub fn dimension(what: &str, expected: usize, actual: usize) -> Self {
        ChurnError::DimensionMismatch {
            expected: format!("{} = {}", what, expected),
            actual: format!("{} = {}", what, actual),
        }
    }
}

impl From<polars::prelude::PolarsError> for ChurnError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        ChurnError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for ChurnError {
    fn from(err: serde_json::Error) -> Self {
        ChurnError::SerializationError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_message() {
        let err = ChurnError::dimension("n_features", 13, 12);
        assert_eq!(
            err.to_string(),
            "Dimension mismatch: expected n_features = 13, got n_features = 12"
        );
    }

    #[test]
    fn test_unknown_category_message() {
        let err = ChurnError::UnknownCategory {
            column: "gender".to_string(),
            value: "Autre".to_string(),
        };
        assert!(err.to_string().contains("Autre"));
        assert!(err.to_string().contains("gender"));
    }
}
