//! # Forecast Math
//!
//! Numeric building blocks for seasonal time series models.
//! This crate provides differencing, lag polynomial algebra and a bounded
//! Nelder-Mead optimizer used to estimate model coefficients.

use thiserror::Error;

pub mod differencing;
pub mod optimization;
pub mod polynomial;

pub use differencing::{difference, differencing_polynomial, seasonal_difference};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult};
pub use polynomial::LagPolynomial;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
