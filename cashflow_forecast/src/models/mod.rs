//! Forecasting models for cash-flow series

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// One projected day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_cashflow: f64,
}

/// Forecast result: future dates only, in chronological order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    points: Vec<ForecastPoint>,
}

impl ForecastResult {
    /// Create a new forecast result holding exactly `horizons` points
    pub fn new(points: Vec<ForecastPoint>, horizons: usize) -> Result<Self> {
        if points.len() != horizons {
            return Err(ForecastError::DataError(format!(
                "Points length ({}) doesn't match horizons ({})",
                points.len(),
                horizons
            )));
        }

        Ok(Self { points })
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.points.len()
    }

    /// Get the forecasted values
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.predicted_cashflow).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Sum of the predicted daily cash flows
    pub fn total_cashflow(&self) -> f64 {
        self.points.iter().map(|p| p.predicted_cashflow).sum()
    }

    /// Running cash balance obtained by adding each predicted flow to `starting_balance`
    pub fn projected_balances(&self, starting_balance: f64) -> Vec<f64> {
        self.points
            .iter()
            .scan(starting_balance, |balance, p| {
                *balance += p.predicted_cashflow;
                Some(*balance)
            })
            .collect()
    }

    /// Serialise as a JSON array of `{date, predicted_cashflow}`
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.points)?)
    }
}

/// A fitted-once regressor over dense feature rows
pub trait Regressor: Debug {
    /// Fit on `features` (one row per sample) and `targets`
    fn fit(&mut self, features: &[Vec<f64>], targets: &[f64]) -> Result<()>;

    /// Predict a single row
    fn predict_row(&self, row: &[f64]) -> Result<f64>;

    /// Predict every row
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }

    /// Name of the model
    fn name(&self) -> &str;
}

/// Reject empty, misaligned or ragged training sets
pub(crate) fn check_training_set(features: &[Vec<f64>], targets: &[f64]) -> Result<()> {
    if features.is_empty() {
        return Err(ForecastError::DataError(
            "Training set is empty".to_string(),
        ));
    }
    if features.len() != targets.len() {
        return Err(ForecastError::DataError(format!(
            "Feature rows ({}) and targets ({}) differ in length",
            features.len(),
            targets.len()
        )));
    }
    let width = features[0].len();
    if width == 0 || features.iter().any(|row| row.len() != width) {
        return Err(ForecastError::NumericError(
            "Feature rows must share a non-zero width".to_string(),
        ));
    }
    Ok(())
}

pub mod cashflow;
pub mod decision_tree;
pub mod random_forest;
