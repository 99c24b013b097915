//! Error types for the demand_forecast crate

use forecast_math::MathError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the demand_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Missing or malformed Date or target column
    #[error("Input shape error: {0}")]
    InputShape(String),

    /// Series too short for the chosen seasonal order
    #[error("Insufficient data: need at least {needed} observations, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Model estimation failed or the input was degenerate
    #[error("Model fit error: {0}")]
    ModelFit(String),

    /// Horizon, percentage or configuration value out of range
    #[error("Validation error: {0}")]
    Validation(String),

    /// Error from numeric building blocks
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),

    /// Error reading an Excel workbook
    #[error("Excel error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    /// Error writing CSV output
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading or writing JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}
