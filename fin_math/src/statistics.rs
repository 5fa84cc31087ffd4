//! Population statistics for tabular columns
//!
//! Means and standard deviations use the population convention (divide by `n`),
//! matching how the feature scaler and the anomaly detector treat a column as
//! the complete population they were fitted on.

use crate::{MathError, Result};
use serde::Serialize;
use statrs::statistics::Statistics;

/// Mean of a non-empty column
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the mean of an empty column".to_string(),
        ));
    }

    Ok(values.iter().mean())
}

/// Population standard deviation (ddof = 0) of a non-empty column
pub fn population_std_dev(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Cannot take the standard deviation of an empty column".to_string(),
        ));
    }
    if values.len() == 1 {
        return Ok(0.0);
    }

    Ok(values.iter().population_std_dev())
}

/// Standard scores of every value in the column.
///
/// A column with zero spread is scored against a unit deviation, so every
/// value gets `value - mean` instead of a division by zero.
pub fn z_scores(values: &[f64]) -> Result<Vec<f64>> {
    let mean = mean(values)?;
    let std_dev = population_std_dev(values)?;
    let scale = if std_dev > 0.0 && std_dev.is_finite() {
        std_dev
    } else {
        1.0
    };

    Ok(values.iter().map(|v| (v - mean) / scale).collect())
}

/// Percentage change from `first` to `last`; zero when `first` is not positive
pub fn growth_percent(first: f64, last: f64) -> f64 {
    if first > 0.0 {
        (last - first) / first * 100.0
    } else {
        0.0
    }
}

/// Summary of a numeric column
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub sum: f64,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl SummaryStats {
    /// Summarise a non-empty column
    pub fn from_values(values: &[f64]) -> Result<Self> {
        let mean = mean(values)?;
        let std_dev = population_std_dev(values)?;
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        Ok(Self {
            count: values.len(),
            sum: values.iter().sum(),
            mean,
            std_dev,
            min,
            max,
        })
    }
}
