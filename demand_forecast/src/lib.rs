//! # Demand Forecast
//!
//! Daily demand forecasting with a seasonal ARIMA baseline and judgmental
//! adjustments for holidays, concerts and promotions.
//!
//! ## Features
//!
//! - Dataset ingestion with a validated schema (CSV, Excel `.xlsx` or polars `DataFrame`)
//! - Duplicate-date aggregation and daily gap filling
//! - SARIMA(1,1,1)(1,1,1)[7] baseline forecast on an 80/20 split
//! - Multiplicative uplift from external factors, with a per-term breakdown
//! - Accuracy metrics (MSE, MAE, RMSE, R²) against the held-out data
//! - Dataset summary and column correlation for trend exploration
//!
//! ## Quick Start
//!
//! ```no_run
//! use demand_forecast::adjustment::{ExternalFactors, PromotionType};
//! use demand_forecast::session::{ForecastRequest, ForecastSession};
//! use demand_forecast::{DataLoader, TargetColumn};
//!
//! # fn main() -> demand_forecast::error::Result<()> {
//! let mut session = ForecastSession::default();
//! session.load_dataset(DataLoader::from_csv("sales.csv")?);
//!
//! let factors = ExternalFactors {
//!     holidays: 2,
//!     concerts: 1,
//!     promotion: PromotionType::Discount,
//!     discount_percent: 10,
//! };
//! let run = session.run_forecast(
//!     ForecastRequest::new(TargetColumn::SalesVolume, 30).with_factors(factors),
//! )?;
//! println!("{:?}", run.adjusted.breakdown);
//!
//! println!("{}", session.evaluate()?);
//! # Ok(())
//! # }
//! ```

pub mod adjustment;
pub mod config;
pub mod data;
pub mod engine;
pub mod error;
pub mod export;
pub mod metrics;
pub mod models;
pub mod schema;
pub mod session;
pub mod summary;
pub mod trend;
pub mod utils;

// Re-export commonly used types
pub use crate::adjustment::{AdjustedForecast, ExternalFactors, PromotionType};
pub use crate::config::ForecastConfig;
pub use crate::data::{DailySeries, DataLoader, DemandDataset, DemandRecord};
pub use crate::engine::{BaselineForecast, ForecastEngine};
pub use crate::error::ForecastError;
pub use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
pub use crate::schema::{Column, TargetColumn};
pub use crate::session::{ForecastRequest, ForecastRun, ForecastSession};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
