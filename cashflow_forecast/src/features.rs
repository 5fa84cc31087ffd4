//! Feature construction for the cash-flow regressor
//!
//! Turns an ordered record sequence into a numeric matrix with one row per
//! record: the raw economic fields, calendar fields, short and long trailing
//! means of each economic field, and one-hot quarter indicators. Row `i` only
//! ever looks at rows `0..=i`.

use crate::config::ForecastConfig;
use crate::data::{EconomicField, FinancialRecord};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate};
use fin_math::trailing_means;
use serde::{Deserialize, Serialize};

/// Calendar quarter (1-4) of a date
pub fn quarter_of(date: NaiveDate) -> u32 {
    (date.month() - 1) / 3 + 1
}

/// Economic columns after gap repair, one vector per [`EconomicField`]
#[derive(Debug, Clone, PartialEq)]
pub struct EconomicColumns {
    values: [Vec<f64>; 4],
}

impl EconomicColumns {
    pub fn get(&self, field: EconomicField) -> &[f64] {
        &self.values[field as usize]
    }

    pub fn len(&self) -> usize {
        self.values[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.values[0].is_empty()
    }
}

/// One-hot encoding of the quarters observed at fit time.
///
/// A quarter that was never observed while fitting is encoded as all zeros.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarterEncoding {
    quarters: Vec<u32>,
}

impl QuarterEncoding {
    /// Learn the sorted set of quarters present in `records`
    pub fn fit(records: &[FinancialRecord]) -> Self {
        let mut quarters: Vec<u32> = records.iter().map(|r| quarter_of(r.date)).collect();
        quarters.sort_unstable();
        quarters.dedup();
        Self { quarters }
    }

    /// The quarters that have an indicator column
    pub fn quarters(&self) -> &[u32] {
        &self.quarters
    }

    pub fn column_names(&self) -> Vec<String> {
        self.quarters
            .iter()
            .map(|q| format!("quarter_{}", q))
            .collect()
    }

    /// Indicator values for one quarter
    pub fn encode(&self, quarter: u32) -> Vec<f64> {
        self.quarters
            .iter()
            .map(|&q| if q == quarter { 1.0 } else { 0.0 })
            .collect()
    }
}

/// Dense feature matrix with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl FeatureMatrix {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<Vec<f64>> {
        self.rows
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn n_cols(&self) -> usize {
        self.names.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Copy of a named column
    pub fn column(&self, name: &str) -> Option<Vec<f64>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx]).collect())
    }

    /// The last `n` rows
    pub fn tail(&self, n: usize) -> &[Vec<f64>] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }
}

/// Builds feature matrices from record sequences
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureBuilder {
    window_short: usize,
    window_long: usize,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self {
            window_short: 7,
            window_long: 30,
        }
    }
}

impl FeatureBuilder {
    /// Create a builder with explicit rolling windows
    pub fn new(window_short: usize, window_long: usize) -> Result<Self> {
        if window_short == 0 || window_long == 0 {
            return Err(ForecastError::InvalidParameter(
                "Rolling windows must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            window_short,
            window_long,
        })
    }

    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        Self::new(config.window_short, config.window_long)
    }

    pub fn window_short(&self) -> usize {
        self.window_short
    }

    pub fn window_long(&self) -> usize {
        self.window_long
    }

    /// History rows a rolling mean can reach back over
    pub fn max_window(&self) -> usize {
        self.window_short.max(self.window_long)
    }

    /// Forward-fill every economic field.
    ///
    /// Missing or non-finite values take the previous row's value; gaps before
    /// the first known value become zero.
    pub fn fill_columns(&self, records: &[FinancialRecord]) -> Result<EconomicColumns> {
        if records.is_empty() {
            return Err(ForecastError::DataError(
                "Cannot build features from an empty record sequence".to_string(),
            ));
        }

        let any_present = records.iter().any(|r| {
            EconomicField::ALL
                .iter()
                .any(|&f| r.field(f).map_or(false, f64::is_finite))
        });
        if !any_present {
            return Err(ForecastError::DataError(
                "None of the economic fields (revenue, operating_expenses, capital_expenditures, net_cashflow) have values"
                    .to_string(),
            ));
        }

        let values = EconomicField::ALL.map(|field| {
            let mut last = 0.0;
            records
                .iter()
                .map(|r| {
                    if let Some(v) = r.field(field).filter(|v| v.is_finite()) {
                        last = v;
                    }
                    last
                })
                .collect::<Vec<f64>>()
        });

        Ok(EconomicColumns { values })
    }

    /// Feature column names, in matrix order, for a given quarter encoding
    pub fn feature_names(&self, quarters: &QuarterEncoding) -> Vec<String> {
        let mut names: Vec<String> = EconomicField::ALL
            .iter()
            .map(|f| f.column_name().to_string())
            .collect();
        names.extend(
            ["month", "day_of_week", "day_of_month"]
                .iter()
                .map(|s| s.to_string()),
        );
        for field in EconomicField::ALL {
            for window in [self.window_short, self.window_long] {
                names.push(format!("{}_ma_{}", field.column_name(), window));
            }
        }
        names.extend(quarters.column_names());
        names
    }

    /// Build the feature matrix for `records` with a fitted quarter encoding
    pub fn build(
        &self,
        records: &[FinancialRecord],
        quarters: &QuarterEncoding,
    ) -> Result<FeatureMatrix> {
        let columns = self.fill_columns(records)?;

        let mut rolling = Vec::with_capacity(EconomicField::ALL.len() * 2);
        for field in EconomicField::ALL {
            for window in [self.window_short, self.window_long] {
                rolling.push(trailing_means(columns.get(field), window)?);
            }
        }

        let names = self.feature_names(quarters);
        let rows = records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let mut row = Vec::with_capacity(names.len());
                for field in EconomicField::ALL {
                    row.push(columns.get(field)[i]);
                }
                row.push(record.date.month() as f64);
                row.push(record.date.weekday().num_days_from_monday() as f64);
                row.push(record.date.day() as f64);
                for means in &rolling {
                    row.push(means[i]);
                }
                row.extend(quarters.encode(quarter_of(record.date)));
                row
            })
            .collect();

        Ok(FeatureMatrix { names, rows })
    }

    /// Fit the quarter encoding on `records` and build their matrix
    pub fn fit_build(&self, records: &[FinancialRecord]) -> Result<(QuarterEncoding, FeatureMatrix)> {
        let quarters = QuarterEncoding::fit(records);
        let matrix = self.build(records, &quarters)?;
        Ok((quarters, matrix))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    fn record(date: NaiveDate, net: Option<f64>) -> FinancialRecord {
        FinancialRecord {
            date,
            revenue: net.map(|n| n + 50.0),
            operating_expenses: Some(50.0),
            capital_expenditures: Some(0.0),
            net_cashflow: net,
            cash_balance: None,
        }
    }

    fn days(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 25).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn test_feature_names_layout() {
        let builder = FeatureBuilder::default();
        let records: Vec<_> = days(10).into_iter().map(|d| record(d, Some(1.0))).collect();
        let (quarters, matrix) = builder.fit_build(&records).unwrap();

        assert_eq!(quarters.quarters(), &[1, 2]);
        assert_eq!(matrix.n_cols(), 4 + 3 + 8 + 2);
        assert_eq!(matrix.names()[0], "revenue");
        assert_eq!(matrix.names()[7], "revenue_ma_7");
        assert_eq!(matrix.names()[14], "net_cashflow_ma_30");
        assert_eq!(matrix.names()[16], "quarter_2");
    }

    #[test]
    fn test_calendar_fields() {
        let builder = FeatureBuilder::default();
        // 2024-03-25 is a Monday
        let records = vec![record(days(1)[0], Some(1.0))];
        let (_, matrix) = builder.fit_build(&records).unwrap();

        assert_eq!(matrix.column("month").unwrap(), vec![3.0]);
        assert_eq!(matrix.column("day_of_week").unwrap(), vec![0.0]);
        assert_eq!(matrix.column("day_of_month").unwrap(), vec![25.0]);
        assert_eq!(matrix.column("quarter_1").unwrap(), vec![1.0]);
    }

    #[test]
    fn test_short_history_rolling_mean_uses_prefix() {
        let builder = FeatureBuilder::default();
        let nets = [10.0, 20.0, 60.0, 10.0];
        let records: Vec<_> = days(4)
            .into_iter()
            .zip(nets)
            .map(|(d, n)| record(d, Some(n)))
            .collect();
        let (_, matrix) = builder.fit_build(&records).unwrap();

        let ma7 = matrix.column("net_cashflow_ma_7").unwrap();
        for i in 0..nets.len() {
            let expected = nets[..=i].iter().sum::<f64>() / (i + 1) as f64;
            assert_relative_eq!(ma7[i], expected);
        }
        assert!(ma7.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_forward_fill_and_leading_zero() {
        let builder = FeatureBuilder::default();
        let dates = days(4);
        let records = vec![
            record(dates[0], None),
            record(dates[1], Some(5.0)),
            record(dates[2], Some(f64::NAN)),
            record(dates[3], None),
        ];
        let columns = builder.fill_columns(&records).unwrap();
        assert_eq!(columns.get(EconomicField::NetCashflow), &[0.0, 5.0, 5.0, 5.0]);
        assert_eq!(columns.get(EconomicField::OperatingExpenses), &[50.0; 4]);
    }

    #[test]
    fn test_no_lookahead() {
        let builder = FeatureBuilder::new(3, 5).unwrap();
        let dates = days(12);
        let records: Vec<_> = dates
            .iter()
            .enumerate()
            .map(|(i, d)| record(*d, Some((i * i) as f64)))
            .collect();
        let quarters = QuarterEncoding::fit(&records);
        let full = builder.build(&records, &quarters).unwrap();

        let cut = 6;
        let mut altered = records.clone();
        altered[cut + 1..].reverse();
        altered.truncate(cut + 3);
        let partial = builder.build(&altered, &quarters).unwrap();

        for i in 0..=cut {
            assert_eq!(full.rows()[i], partial.rows()[i]);
        }
    }

    #[test]
    fn test_unseen_quarter_is_all_zero() {
        let builder = FeatureBuilder::default();
        let dates = days(3);
        let train: Vec<_> = dates.iter().map(|d| record(*d, Some(1.0))).collect();
        let quarters = QuarterEncoding::fit(&train[..1]);
        assert_eq!(quarters.quarters(), &[1]);

        let future = vec![record(NaiveDate::from_ymd_opt(2024, 8, 1).unwrap(), Some(1.0))];
        let matrix = builder.build(&future, &quarters).unwrap();
        assert_eq!(matrix.column("quarter_1").unwrap(), vec![0.0]);
        assert!(matrix.column("quarter_3").is_none());
    }

    #[test]
    fn test_rejects_empty_and_fieldless_input() {
        let builder = FeatureBuilder::default();
        assert!(matches!(
            builder.fill_columns(&[]),
            Err(ForecastError::DataError(_))
        ));

        let blank = FinancialRecord {
            date: days(1)[0],
            revenue: None,
            operating_expenses: None,
            capital_expenditures: None,
            net_cashflow: None,
            cash_balance: Some(100.0),
        };
        assert!(matches!(
            builder.fill_columns(&[blank]),
            Err(ForecastError::DataError(_))
        ));
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(FeatureBuilder::new(0, 30).is_err());
    }
}
