//! Trailing moving averages
//!
//! Contains the streaming Simple Moving Average and the batch helper that
//! computes a trailing mean for every position of a series. Near the start of a
//! series the window shrinks to whatever prefix is available, so the batch
//! helper never produces missing values.

use crate::{MathError, Result};
use std::collections::VecDeque;

/// Simple Moving Average (SMA) over the last `period` values
#[derive(Debug, Clone)]
pub struct SimpleMovingAverage {
    period: usize,
    values: VecDeque<f64>,
    sum: f64,
}

impl SimpleMovingAverage {
    /// Create a new Simple Moving Average with the specified period
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(MathError::InvalidInput(
                "Period must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            period,
            values: VecDeque::with_capacity(period),
            sum: 0.0,
        })
    }

    /// Push a new value, evicting the oldest one once the window is full
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        self.sum += value;

        if self.values.len() > self.period {
            if let Some(old_value) = self.values.pop_front() {
                self.sum -= old_value;
            }
        }
    }

    /// Mean over a full window
    pub fn value(&self) -> Result<f64> {
        if self.values.len() < self.period {
            return Err(MathError::InsufficientData(format!(
                "Not enough data for SMA calculation. Need {} values, have {}.",
                self.period,
                self.values.len()
            )));
        }

        Ok(self.sum / self.period as f64)
    }

    /// Mean over whatever part of the window has been filled (at least one value)
    pub fn partial_value(&self) -> Result<f64> {
        if self.values.is_empty() {
            return Err(MathError::InsufficientData(
                "SMA has not received any values".to_string(),
            ));
        }

        Ok(self.sum / self.values.len() as f64)
    }

    /// Number of values currently inside the window
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get the current period
    pub fn period(&self) -> usize {
        self.period
    }

    /// Reset the SMA, clearing all values
    pub fn reset(&mut self) {
        self.values.clear();
        self.sum = 0.0;
    }
}

/// Trailing mean of `values` ending at every position.
///
/// Position `i` averages `values[i + 1 - window..=i]`, or `values[0..=i]` while
/// fewer than `window` values exist. The output has the same length as the input
/// and each entry depends only on the values at or before it.
pub fn trailing_means(values: &[f64], window: usize) -> Result<Vec<f64>> {
    let mut sma = SimpleMovingAverage::new(window)?;
    let mut means = Vec::with_capacity(values.len());

    for &value in values {
        sma.update(value);
        means.push(sma.partial_value()?);
    }

    Ok(means)
}
