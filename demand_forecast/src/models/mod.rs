//! Forecasting models for daily demand series

use crate::error::{ForecastError, Result};
use serde::Serialize;
use std::fmt::Debug;

/// Forecast result containing predicted values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Forecasted values
    values: Vec<f64>,
    /// Number of periods forecasted
    horizons: usize,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizons: usize) -> Result<Self> {
        if values.len() != horizons {
            return Err(ForecastError::Validation(format!(
                "Values length ({}) doesn't match horizons ({})",
                values.len(),
                horizons
            )));
        }

        if let Some(position) = values.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(format!(
                "Forecast produced a non-finite value at step {}",
                position + 1
            )));
        }

        Ok(Self { values, horizons })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Consume the result and return the values
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// Serialize the forecast to JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for future periods
    fn forecast(&self, horizons: usize) -> Result<ForecastResult>;

    /// One-step-ahead predictions over the training data, aligned with its
    /// trailing observations
    fn fitted_values(&self) -> Vec<f64>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on the series values
    fn train(&self, data: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod sarima;
