//! Per-column standardisation

use crate::error::{ForecastError, Result};
use fin_math::{mean, population_std_dev};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Zero-mean, unit-variance scaler fitted once on training rows.
///
/// Columns without spread are given a unit scale so they pass through centred
/// instead of dividing by zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    means: Vec<f64>,
    scales: Vec<f64>,
}

impl StandardScaler {
    /// Fit column means and population standard deviations
    pub fn fit(rows: &[Vec<f64>]) -> Result<Self> {
        let n_cols = match rows.first() {
            Some(row) => row.len(),
            None => {
                return Err(ForecastError::DataError(
                    "Cannot fit a scaler on zero rows".to_string(),
                ))
            }
        };
        if rows.iter().any(|row| row.len() != n_cols) {
            return Err(ForecastError::NumericError(
                "Ragged feature matrix".to_string(),
            ));
        }

        let mut means = Vec::with_capacity(n_cols);
        let mut scales = Vec::with_capacity(n_cols);
        for col in 0..n_cols {
            let values: Vec<f64> = rows.iter().map(|row| row[col]).collect();
            let col_mean = mean(&values)?;
            let std_dev = population_std_dev(&values)?;

            let scale = if std_dev > f64::EPSILON && std_dev.is_finite() {
                std_dev
            } else {
                debug!(column = col, "zero-variance feature column, using unit scale");
                1.0
            };
            means.push(if col_mean.is_finite() { col_mean } else { 0.0 });
            scales.push(scale);
        }

        Ok(Self { means, scales })
    }

    pub fn n_features(&self) -> usize {
        self.means.len()
    }

    pub fn means(&self) -> &[f64] {
        &self.means
    }

    pub fn scales(&self) -> &[f64] {
        &self.scales
    }

    /// Scale one row with the fitted parameters
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>> {
        if row.len() != self.means.len() {
            return Err(ForecastError::NumericError(format!(
                "Scaler was fitted on {} columns, got {}",
                self.means.len(),
                row.len()
            )));
        }

        Ok(row
            .iter()
            .zip(self.means.iter().zip(&self.scales))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    /// Scale every row
    pub fn transform_rows(&self, rows: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        rows.iter().map(|row| self.transform(row)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fit_transform_standardises() {
        let rows = vec![vec![1.0, 10.0], vec![2.0, 20.0], vec![3.0, 30.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        let scaled = scaler.transform_rows(&rows).unwrap();

        let col0: Vec<f64> = scaled.iter().map(|r| r[0]).collect();
        assert_relative_eq!(col0.iter().sum::<f64>(), 0.0, epsilon = 1e-12);
        assert_relative_eq!(scaled[2][1], scaled[2][0], epsilon = 1e-12);
    }

    #[test]
    fn test_constant_column_gets_unit_scale() {
        let rows = vec![vec![5.0, 1.0], vec![5.0, 2.0]];
        let scaler = StandardScaler::fit(&rows).unwrap();
        assert_eq!(scaler.scales()[0], 1.0);

        let scaled = scaler.transform(&[7.0, 1.5]).unwrap();
        assert_relative_eq!(scaled[0], 2.0);
        assert!(scaled.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_width_mismatch_and_empty_fit() {
        let scaler = StandardScaler::fit(&[vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            scaler.transform(&[1.0]),
            Err(ForecastError::NumericError(_))
        ));
        assert!(matches!(
            StandardScaler::fit(&[]),
            Err(ForecastError::DataError(_))
        ));
    }
}
