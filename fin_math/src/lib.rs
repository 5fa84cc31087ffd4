//! # Fin Math
//!
//! Numeric building blocks shared by the forecasting core and the finance agents.
//! This crate provides trailing (shrinking-window) moving averages and the
//! population statistics used for anomaly scoring and feature scaling.

use thiserror::Error;

pub mod moving_averages;
pub mod statistics;

pub use moving_averages::{trailing_means, SimpleMovingAverage};
pub use statistics::{growth_percent, mean, population_std_dev, z_scores, SummaryStats};

/// Errors that can occur in financial math calculations
#[derive(Error, Debug, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for financial math operations
pub type Result<T> = std::result::Result<T, MathError>;
