//! Utility functions for the cashflow_forecast crate

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Shuffle row indices with a fixed seed and split them into train / held-out parts.
///
/// The training part gets `floor(n * train_ratio)` rows, but never fewer than one,
/// so a single-row history can still be fitted.
pub fn train_test_split_indices(
    n: usize,
    train_ratio: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>)> {
    if n == 0 {
        return Err(ForecastError::DataError(
            "Cannot split zero rows".to_string(),
        ));
    }
    if !(train_ratio > 0.0 && train_ratio <= 1.0) {
        return Err(ForecastError::InvalidParameter(format!(
            "Train ratio must be in (0, 1], got {}",
            train_ratio
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train_size = ((n as f64 * train_ratio).floor() as usize).clamp(1, n);
    let test = indices.split_off(train_size);

    Ok((indices, test))
}

/// Consecutive calendar days starting the day after `last`
pub fn future_dates(last: NaiveDate, horizon: usize) -> Result<Vec<NaiveDate>> {
    (1..=horizon as u64)
        .map(|offset| {
            last.checked_add_days(Days::new(offset))
                .ok_or_else(|| ForecastError::DataError(format!("Date overflow after {}", last)))
        })
        .collect()
}

/// Target for row `i` is `values[i + horizon]`; rows without a future value
/// carry the last available value forward
pub fn shift_forward_fill(values: &[f64], horizon: usize) -> Vec<f64> {
    let last = values.last().copied().unwrap_or(0.0);
    (0..values.len())
        .map(|i| values.get(i + horizon).copied().unwrap_or(last))
        .collect()
}
