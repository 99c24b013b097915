//! Metrics for evaluating forecast accuracy against held-out data

use crate::error::{ForecastError, Result};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Accuracy of a forecast over the overlapping prefix with the actuals
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyMetrics {
    /// Mean Squared Error
    pub mse: f64,
    /// Mean Absolute Error
    pub mae: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Coefficient of determination
    pub r2: f64,
    /// Number of points compared
    pub compared: usize,
}

/// Compare a forecast with actual values.
///
/// Only the first `min(forecast.len(), actual.len())` points are compared.
pub fn evaluate(forecast: &[f64], actual: &[f64]) -> Result<AccuracyMetrics> {
    let compared = forecast.len().min(actual.len());
    if compared == 0 {
        return Err(ForecastError::Validation(
            "Forecast and actual values share no points to compare".to_string(),
        ));
    }

    let forecast = &forecast[..compared];
    let actual = &actual[..compared];

    let mse = mean_squared_error(actual, forecast);
    let mae = mean_absolute_error(actual, forecast);

    Ok(AccuracyMetrics {
        mse,
        mae,
        rmse: mse.sqrt(),
        r2: r2_score(actual, forecast),
        compared,
    })
}

/// Mean of squared differences
pub fn mean_squared_error(actual: &[f64], predicted: &[f64]) -> f64 {
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .mean()
}

/// Mean of absolute differences
pub fn mean_absolute_error(actual: &[f64], predicted: &[f64]) -> f64 {
    actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).abs())
        .mean()
}

/// Coefficient of determination.
///
/// When the actual values have no variance the score is 1.0 for a perfect
/// prediction and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    let mean = actual.iter().mean();
    let total: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();
    let residual: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();

    if total == 0.0 {
        return if residual == 0.0 { 1.0 } else { 0.0 };
    }
    1.0 - residual / total
}

impl std::fmt::Display for AccuracyMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Accuracy Metrics ({} points):", self.compared)?;
        writeln!(f, "  MSE:   {:.2}", self.mse)?;
        writeln!(f, "  MAE:   {:.2}", self.mae)?;
        writeln!(f, "  RMSE:  {:.2}", self.rmse)?;
        writeln!(f, "  R2:    {:.2}", self.r2)?;
        Ok(())
    }
}
