//! Error types for Arealis

use thiserror::Error;

/// Main error type for Arealis operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metric '{metric}' not recognized. Choose one of {options}.")]
    UnknownMetric { metric: String, options: String },

    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    #[error("Column '{name}' has the wrong type: expected {expected}")]
    ColumnType { name: String, expected: &'static str },

    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for Arealis operations
pub type Result<T> = std::result::Result<T, Error>;
