//! Forecast configuration
//!
//! Defaults reproduce the fixed weekly model: an 80/20 train/test split,
//! SARIMA(1,1,1)(1,1,1)[7] and horizons of up to a year.

use crate::error::{ForecastError, Result};
use crate::models::sarima::{Order, Sarima, SeasonalOrder};
use forecast_math::NelderMeadConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for the forecast engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Share of the series used for training, the rest is held out
    pub train_ratio: f64,
    /// Non-seasonal model order
    pub order: Order,
    /// Seasonal model order
    pub seasonal_order: SeasonalOrder,
    /// Largest horizon a caller may request
    pub max_horizon: usize,
    /// Coefficient search settings
    pub optimizer: NelderMeadConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            train_ratio: 0.8,
            order: Order::default(),
            seasonal_order: SeasonalOrder::default(),
            max_horizon: 365,
            optimizer: NelderMeadConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every value lies in its allowed range
    pub fn validate(&self) -> Result<()> {
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(ForecastError::Validation(format!(
                "train_ratio must be between 0 and 1, got {}",
                self.train_ratio
            )));
        }
        if self.max_horizon == 0 {
            return Err(ForecastError::Validation(
                "max_horizon must be at least 1".to_string(),
            ));
        }
        if self.optimizer.max_iter == 0 || !(self.optimizer.tolerance > 0.0) {
            return Err(ForecastError::Validation(
                "optimizer needs a positive iteration limit and tolerance".to_string(),
            ));
        }
        Ok(())
    }

    /// Model described by this configuration
    pub fn model(&self) -> Result<Sarima> {
        Ok(Sarima::new(self.order, self.seasonal_order)?.with_optimizer(self.optimizer.clone()))
    }
}
