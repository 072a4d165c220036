//! Error types for the calorie burn pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, CalorieError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum CalorieError {
    #[error("Data load error: {0}")]
    DataLoad(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Schema mismatch: expected columns [{expected}], got [{actual}]")]
    SchemaMismatch { expected: String, actual: String },

    #[error(
        "Invalid category in column {column} at row {row}: {value:?} (expected \"male\" or \"female\")"
    )]
    InvalidCategory {
        column: String,
        value: String,
        row: usize,
    },

    #[error("Model error: {0}")]
    Model(String),

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalorieError {
    /// Pipeline stage the error originated in, for user-facing messages
    pub fn stage(&self) -> &'static str {
        match self {
            CalorieError::DataLoad(_) | CalorieError::Io(_) => "data loading",
            CalorieError::Schema(_) | CalorieError::InvalidCategory { .. } => "data preparation",
            CalorieError::SchemaMismatch { .. } | CalorieError::InvalidInput(_) => "prediction",
            CalorieError::Model(_) => "model",
            CalorieError::InvalidParameter { .. } | CalorieError::Config(_) => "configuration",
            CalorieError::Serialization(_) => "output",
        }
    }
}

impl From<polars::error::PolarsError> for CalorieError {
    fn from(err: polars::error::PolarsError) -> Self {
        CalorieError::DataLoad(err.to_string())
    }
}

impl From<serde_json::Error> for CalorieError {
    fn from(err: serde_json::Error) -> Self {
        CalorieError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for CalorieError {
    fn from(err: ndarray::ShapeError) -> Self {
        CalorieError::Model(err.to_string())
    }
}
