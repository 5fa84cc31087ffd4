//! Multi-day projection from a trained cash-flow model

use crate::data::{ensure_chronological, FinancialRecord};
use crate::error::{ForecastError, Result};
use crate::models::cashflow::TrainedCashflowModel;
use crate::models::{ForecastPoint, ForecastResult};
use crate::utils::future_dates;
use chrono::NaiveDate;

/// Projects a trained model over future days.
///
/// Future rows have no observed economics, so they enter the feature builder as
/// zero-valued placeholders appended to the trailing history. Rolling means
/// over that combined sequence carry the recent history into the horizon.
#[derive(Debug, Clone, Copy)]
pub struct HorizonProjector<'a> {
    model: &'a TrainedCashflowModel,
}

impl<'a> HorizonProjector<'a> {
    pub fn new(model: &'a TrainedCashflowModel) -> Self {
        Self { model }
    }

    /// Predict `horizon` consecutive days after the last date of `history`
    pub fn project(&self, history: &[FinancialRecord], horizon: usize) -> Result<ForecastResult> {
        ensure_chronological(history)?;
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Projection horizon must be at least 1".to_string(),
            ));
        }

        let last_date = history[history.len() - 1].date;
        let dates = future_dates(last_date, horizon)?;

        let rows = self.future_features(history, &dates)?;
        let predictions = self.model.predict_rows(&rows)?;

        let points = dates
            .into_iter()
            .zip(predictions)
            .map(|(date, predicted_cashflow)| ForecastPoint {
                date,
                predicted_cashflow,
            })
            .collect();

        ForecastResult::new(points, horizon)
    }

    /// Unscaled feature rows for `dates`, built over the trailing history.
    ///
    /// The context covers the widest rolling window, so the means of the future
    /// rows match what the builder computes over the full history.
    fn future_features(
        &self,
        history: &[FinancialRecord],
        dates: &[NaiveDate],
    ) -> Result<Vec<Vec<f64>>> {
        let builder = self.model.builder();
        let context_len = builder.max_window().min(history.len());
        let mut combined: Vec<FinancialRecord> = history[history.len() - context_len..].to_vec();
        combined.extend(dates.iter().map(|&d| FinancialRecord::placeholder(d)));

        let matrix = builder.build(&combined, self.model.quarters())?;
        Ok(matrix.tail(dates.len()).to_vec())
    }
}
