//! Explicit session context for the upload, forecast and evaluate steps
//!
//! A session holds the current dataset and the most recent forecast run.
//! Loading a dataset or running a forecast replaces the previous value
//! wholesale; nothing is merged.

use crate::adjustment::{AdjustedForecast, ExternalFactors};
use crate::data::{DailySeries, DemandDataset};
use crate::engine::ForecastEngine;
use crate::error::{ForecastError, Result};
use crate::metrics::{evaluate, AccuracyMetrics};
use crate::schema::TargetColumn;
use chrono::NaiveDate;
use log::info;
use serde::{Deserialize, Serialize};

/// Parameters of one forecast run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastRequest {
    /// Column to forecast
    pub target: TargetColumn,
    /// Days to forecast
    pub horizon: usize,
    /// Judgmental adjustment inputs
    pub factors: ExternalFactors,
}

impl ForecastRequest {
    pub fn new(target: TargetColumn, horizon: usize) -> Self {
        Self {
            target,
            horizon,
            factors: ExternalFactors::none(),
        }
    }

    pub fn with_factors(mut self, factors: ExternalFactors) -> Self {
        self.factors = factors;
        self
    }
}

/// Outcome of a forecast run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRun {
    /// Request that produced the run
    pub request: ForecastRequest,
    /// Name of the fitted model
    pub model: String,
    /// Unadjusted forecast
    pub baseline: Vec<f64>,
    /// Forecast after external factors
    pub adjusted: AdjustedForecast,
    /// Calendar day of each forecast value
    pub forecast_dates: Vec<NaiveDate>,
    /// Actual values held out from training
    pub held_out: DailySeries,
}

/// Session state shared by the dashboard steps
#[derive(Debug, Clone, Default)]
pub struct ForecastSession {
    engine: ForecastEngine,
    dataset: Option<DemandDataset>,
    last_run: Option<ForecastRun>,
}

impl ForecastSession {
    /// Create a session around a configured engine
    pub fn new(engine: ForecastEngine) -> Self {
        Self {
            engine,
            dataset: None,
            last_run: None,
        }
    }

    /// Replace the current dataset and forget the previous forecast
    pub fn load_dataset(&mut self, dataset: DemandDataset) {
        info!("Session dataset replaced ({} rows)", dataset.len());
        self.dataset = Some(dataset);
        self.last_run = None;
    }

    /// Current dataset, if one was loaded
    pub fn dataset(&self) -> Option<&DemandDataset> {
        self.dataset.as_ref()
    }

    /// Most recent forecast run
    pub fn last_run(&self) -> Option<&ForecastRun> {
        self.last_run.as_ref()
    }

    /// Forecast the current dataset and replace the last run.
    ///
    /// Either a complete run is stored or the session is left unchanged.
    pub fn run_forecast(&mut self, request: ForecastRequest) -> Result<&ForecastRun> {
        let dataset = self.dataset.as_ref().ok_or_else(|| {
            ForecastError::Validation("Load a dataset before forecasting".to_string())
        })?;

        request.factors.validate()?;
        let series = dataset.daily_series(request.target)?;
        let baseline = self.engine.forecast(&series, request.horizon)?;
        let adjusted = request.factors.apply(&baseline.values)?;
        info!(
            "Applied {:.1}% adjustment to {} forecast",
            adjusted.total_percentage * 100.0,
            request.target
        );

        let run = ForecastRun {
            request,
            model: baseline.model,
            baseline: baseline.values,
            adjusted,
            forecast_dates: baseline.forecast_dates,
            held_out: baseline.held_out,
        };
        Ok(&*self.last_run.insert(run))
    }

    /// Accuracy of the last adjusted forecast against its held-out actuals
    pub fn evaluate(&self) -> Result<AccuracyMetrics> {
        let run = self.last_run.as_ref().ok_or_else(|| {
            ForecastError::Validation("Run a forecast before evaluating accuracy".to_string())
        })?;
        evaluate(&run.adjusted.values, run.held_out.values())
    }
}
