//! # Flavour Forecast
//!
//! Facade over the workspace crates: [`forecast_math`] for the numeric
//! building blocks and [`demand_forecast`] for the forecasting pipeline.
//!
//! ## Example
//!
//! ```
//! use flavour_forecast::demand_forecast::adjustment::{ExternalFactors, PromotionType};
//!
//! let factors = ExternalFactors {
//!     holidays: 1,
//!     concerts: 0,
//!     promotion: PromotionType::None,
//!     discount_percent: 0,
//! };
//! let adjusted = factors.apply(&[100.0, 200.0]).unwrap();
//! assert_eq!(adjusted.breakdown.len(), 2);
//! assert!((adjusted.values[1] - 204.0).abs() < 1e-9);
//! ```

pub use demand_forecast;
pub use forecast_math;

pub use demand_forecast::{
    ExternalFactors, ForecastConfig, ForecastEngine, ForecastError, ForecastRequest,
    ForecastSession, TargetColumn,
};
