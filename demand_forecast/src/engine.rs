//! Forecast engine: split, fit once, forecast once
//!
//! The engine trains the configured seasonal ARIMA model on the leading
//! share of a daily series and forecasts the requested horizon past the end
//! of the training segment. The trailing share is returned untouched for
//! later comparison. There is no refitting and no interval estimation.

use crate::config::ForecastConfig;
use crate::data::DailySeries;
use crate::error::{ForecastError, Result};
use crate::models::sarima::Sarima;
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::schema::TargetColumn;
use crate::utils::{check_horizon, future_dates, train_size};
use chrono::NaiveDate;
use log::info;
use serde::Serialize;

/// Unadjusted model output plus the segments it was derived from
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineForecast {
    /// Column that was forecast
    pub target: TargetColumn,
    /// Name of the fitted model
    pub model: String,
    /// Point forecasts, one per horizon day
    pub values: Vec<f64>,
    /// Calendar day of each forecast value
    pub forecast_dates: Vec<NaiveDate>,
    /// Segment the model was trained on
    pub train: DailySeries,
    /// Segment held out for accuracy comparison
    pub held_out: DailySeries,
}

/// Runs the train/forecast pipeline for one configuration
#[derive(Debug, Clone)]
pub struct ForecastEngine {
    config: ForecastConfig,
    model: Sarima,
}

impl ForecastEngine {
    /// Create an engine after validating the configuration
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        let model = config.model()?;
        Ok(Self { config, model })
    }

    /// Active configuration
    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Model the engine fits
    pub fn model(&self) -> &Sarima {
        &self.model
    }

    /// Fit on the training share of `series` and forecast `horizon` days
    pub fn forecast(&self, series: &DailySeries, horizon: usize) -> Result<BaselineForecast> {
        check_horizon(horizon, self.config.max_horizon)?;
        if series.is_empty() {
            return Err(ForecastError::InputShape("Series has no observations".to_string()));
        }

        let size = train_size(series.len(), self.config.train_ratio)?;
        let (train, held_out) = series.split_at(size);
        info!(
            "Training {} on {} of {} observations ({} held out)",
            self.model.name(),
            train.len(),
            series.len(),
            held_out.len()
        );

        let trained = self.model.train(train.values())?;
        let values = trained.forecast(horizon)?.into_values();

        let last = train.end().ok_or_else(|| ForecastError::InsufficientData {
            needed: self.model.min_observations(),
            got: 0,
        })?;
        let forecast_dates = future_dates(last, horizon);
        info!(
            "Forecast {} days of {} from {}",
            horizon,
            series.target(),
            forecast_dates.first().copied().unwrap_or(last)
        );

        Ok(BaselineForecast {
            target: series.target(),
            model: trained.name().to_string(),
            values,
            forecast_dates,
            train,
            held_out,
        })
    }
}

impl Default for ForecastEngine {
    fn default() -> Self {
        Self {
            config: ForecastConfig::default(),
            model: Sarima::weekly(),
        }
    }
}
