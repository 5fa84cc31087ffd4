//! # Cashflow Forecast
//!
//! Daily cash-flow forecasting from a company's historical ledger.
//!
//! ## Features
//!
//! - Ledger loading from CSV (polars) with tolerant numeric parsing
//! - Feature building: calendar fields, short / long rolling means, quarter indicators
//! - Standard scaling and a seeded random-forest regressor
//! - Lazy training and multi-day horizon projection
//! - Held-out accuracy metrics (MAE, MSE, RMSE, MAPE, SMAPE)
//!
//! ## Quick Start
//!
//! ```no_run
//! use cashflow_forecast::{CashflowForecaster, DataLoader, ForecastConfig};
//!
//! # fn main() -> cashflow_forecast::Result<()> {
//! // Load data
//! let history = DataLoader::from_csv("data/cashflow_data.csv")?;
//!
//! // Create a forecaster; it trains on the first prediction
//! let mut forecaster = CashflowForecaster::new(ForecastConfig::default())?;
//!
//! // Forecast the next 30 days
//! let forecast = forecaster.predict(&history, 30)?;
//! for point in forecast.points() {
//!     println!("{}: {:.2}", point.date, point.predicted_cashflow);
//! }
//!
//! // Check the held-out rows
//! println!("{}", forecaster.evaluate_holdout()?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod features;
pub mod metrics;
pub mod models;
pub mod projector;
pub mod scaler;
pub mod utils;

// Re-export commonly used types
pub use crate::config::ForecastConfig;
pub use crate::data::{CashflowHistory, DataLoader, EconomicField, FinancialRecord};
pub use crate::error::{ForecastError, Result};
pub use crate::features::{FeatureBuilder, FeatureMatrix, QuarterEncoding};
pub use crate::metrics::{forecast_accuracy, ForecastAccuracy};
pub use crate::models::cashflow::{CashflowForecaster, TrainedCashflowModel};
pub use crate::models::random_forest::{ForestConfig, RandomForestRegressor};
pub use crate::models::{ForecastPoint, ForecastResult, Regressor};
pub use crate::projector::HorizonProjector;
pub use crate::scaler::StandardScaler;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
