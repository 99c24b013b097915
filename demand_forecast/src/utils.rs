//! Utility functions for the demand_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Duration, NaiveDate};

/// Number of leading observations used for training.
///
/// Truncates `train_ratio × len`, so a 10-point series with ratio 0.8
/// trains on 8 points and holds out 2.
pub fn train_size(len: usize, train_ratio: f64) -> Result<usize> {
    if !(train_ratio > 0.0 && train_ratio < 1.0) {
        return Err(ForecastError::Validation(format!(
            "Train ratio must be between 0 and 1, got {}",
            train_ratio
        )));
    }
    Ok((len as f64 * train_ratio).floor() as usize)
}

/// Consecutive calendar days following `last`
pub fn future_dates(last: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    (1..=horizon as i64)
        .filter_map(|offset| last.checked_add_signed(Duration::days(offset)))
        .collect()
}

/// Validate a requested horizon against the allowed range
pub fn check_horizon(horizon: usize, max_horizon: usize) -> Result<()> {
    if horizon == 0 || horizon > max_horizon {
        return Err(ForecastError::Validation(format!(
            "Forecast horizon must be between 1 and {} days, got {}",
            max_horizon, horizon
        )));
    }
    Ok(())
}
