//! Agent settings

use crate::{AgentError, Result};
use cashflow_forecast::ForecastConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Dataset locations and agent parameters.
///
/// Missing keys in a JSON document keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub budgets_path: PathBuf,
    /// Transactions with a `category` column, used for subscription spend
    pub transactions_path: PathBuf,
    /// Transactions scanned for amount outliers
    pub alerts_path: PathBuf,
    pub cashflow_path: PathBuf,
    pub invoices_path: PathBuf,
    /// Minimum absolute z-score reported as an anomaly
    pub z_threshold: f64,
    /// Maximum anomalies returned per query
    pub alert_limit: usize,
    /// Longest forecast a query may ask for; larger requests are capped
    pub max_horizon_days: usize,
    pub forecast: ForecastConfig,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            budgets_path: PathBuf::from("data/budgets.csv"),
            transactions_path: PathBuf::from("data/transactions.csv"),
            alerts_path: PathBuf::from("data/transactions_extended.csv"),
            cashflow_path: PathBuf::from("data/cashflow_data.csv"),
            invoices_path: PathBuf::from("data/invoices_data.csv"),
            z_threshold: 3.0,
            alert_limit: 20,
            max_horizon_days: 365,
            forecast: ForecastConfig::default(),
        }
    }
}

impl AgentSettings {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Resolve every dataset path against `dir`
    pub fn with_data_dir<P: AsRef<Path>>(mut self, dir: P) -> Self {
        let dir = dir.as_ref();
        for path in [
            &mut self.budgets_path,
            &mut self.transactions_path,
            &mut self.alerts_path,
            &mut self.cashflow_path,
            &mut self.invoices_path,
        ] {
            if let Some(name) = path.file_name() {
                *path = dir.join(name);
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.z_threshold.is_finite() && self.z_threshold > 0.0) {
            return Err(AgentError::Config(format!(
                "z_threshold must be positive, got {}",
                self.z_threshold
            )));
        }
        if self.alert_limit == 0 {
            return Err(AgentError::Config(
                "alert_limit must be at least 1".to_string(),
            ));
        }
        if self.max_horizon_days < self.forecast.horizon_days {
            return Err(AgentError::Config(format!(
                "max_horizon_days ({}) is below forecast.horizon_days ({})",
                self.max_horizon_days, self.forecast.horizon_days
            )));
        }
        self.forecast.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_settings() {
        let settings = AgentSettings::from_json_str(
            r#"{ "z_threshold": 2.5, "forecast": { "horizon_days": 7 } }"#,
        )
        .unwrap();
        assert_eq!(settings.z_threshold, 2.5);
        assert_eq!(settings.alert_limit, 20);
        assert_eq!(settings.max_horizon_days, 365);
        assert_eq!(settings.forecast.horizon_days, 7);
        assert_eq!(settings.forecast.window_long, 30);
        assert_eq!(settings.invoices_path, PathBuf::from("data/invoices_data.csv"));
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            AgentSettings::from_json_str(r#"{ "alert_limit": 0 }"#),
            Err(AgentError::Config(_))
        ));
        assert!(matches!(
            AgentSettings::from_json_str(r#"{ "forecast": { "window_short": 0 } }"#),
            Err(AgentError::Forecast(_))
        ));
        assert!(matches!(
            AgentSettings::from_json_str(r#"{ "max_horizon_days": 14 }"#),
            Err(AgentError::Config(_))
        ));
        assert!(matches!(
            AgentSettings::from_json_str("[1, 2]"),
            Err(AgentError::Config(_))
        ));
    }

    #[test]
    fn test_data_dir_keeps_file_names() {
        let settings = AgentSettings::default().with_data_dir("/srv/finance");
        assert_eq!(
            settings.cashflow_path,
            PathBuf::from("/srv/finance/cashflow_data.csv")
        );
        assert_eq!(
            settings.alerts_path,
            PathBuf::from("/srv/finance/transactions_extended.csv")
        );
    }
}
