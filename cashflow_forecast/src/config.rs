//! Forecasting configuration

use crate::error::{ForecastError, Result};
use crate::models::random_forest::ForestConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Parameters recognised by the forecasting core.
///
/// Every field has a default, so a JSON document only needs to name the
/// values it overrides:
///
/// ```
/// use cashflow_forecast::ForecastConfig;
///
/// let config = ForecastConfig::from_json_str(r#"{ "horizon_days": 60 }"#).unwrap();
/// assert_eq!(config.horizon_days, 60);
/// assert_eq!(config.window_short, 7);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Number of future days to forecast
    pub horizon_days: usize,
    /// Short trailing window for rolling means
    pub window_short: usize,
    /// Long trailing window for rolling means; also the history carried into projection
    pub window_long: usize,
    /// Share of rows used to fit the model; the rest is held out
    pub train_test_split_ratio: f64,
    /// Seed for the split shuffle and the forest
    pub random_seed: u64,
    /// Ensemble hyper-parameters
    pub forest: ForestConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon_days: 30,
            window_short: 7,
            window_long: 30,
            train_test_split_ratio: 0.8,
            random_seed: 42,
            forest: ForestConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Parse a JSON document and validate it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a JSON configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check parameter ranges
    pub fn validate(&self) -> Result<()> {
        if self.horizon_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "horizon_days must be at least 1".to_string(),
            ));
        }
        if self.window_short == 0 || self.window_long == 0 {
            return Err(ForecastError::InvalidParameter(
                "Rolling windows must be at least 1".to_string(),
            ));
        }
        if !(self.train_test_split_ratio > 0.0 && self.train_test_split_ratio <= 1.0) {
            return Err(ForecastError::InvalidParameter(format!(
                "train_test_split_ratio must be in (0, 1], got {}",
                self.train_test_split_ratio
            )));
        }
        self.forest.validate()
    }
}
