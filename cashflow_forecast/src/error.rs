//! Error types for the cashflow_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the cashflow_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Empty or malformed input: no records, no economic columns, bad dates
    #[error("Data error: {0}")]
    DataError(String),

    /// A trained model was required but none exists yet
    #[error("Model has not been trained")]
    ModelNotTrained,

    /// Degenerate numeric input that could not be repaired
    #[error("Numeric error: {0}")]
    NumericError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Malformed JSON configuration or serialisation failure
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}

impl From<fin_math::MathError> for ForecastError {
    fn from(err: fin_math::MathError) -> Self {
        match err {
            fin_math::MathError::InsufficientData(msg) => ForecastError::DataError(msg),
            fin_math::MathError::InvalidInput(msg) => ForecastError::InvalidParameter(msg),
        }
    }
}
