//! Financial record sequences and CSV loading

use crate::error::{ForecastError, Result};
use chrono::{Days, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::ops::Deref;
use std::path::Path;

/// The economic inputs of a record. Cash balance is deliberately not one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomicField {
    Revenue,
    OperatingExpenses,
    CapitalExpenditures,
    NetCashflow,
}

impl EconomicField {
    /// All economic fields in feature-column order
    pub const ALL: [EconomicField; 4] = [
        EconomicField::Revenue,
        EconomicField::OperatingExpenses,
        EconomicField::CapitalExpenditures,
        EconomicField::NetCashflow,
    ];

    /// Column name used in CSV headers and feature names
    pub fn column_name(&self) -> &'static str {
        match self {
            EconomicField::Revenue => "revenue",
            EconomicField::OperatingExpenses => "operating_expenses",
            EconomicField::CapitalExpenditures => "capital_expenditures",
            EconomicField::NetCashflow => "net_cashflow",
        }
    }
}

/// One row of the cash-flow time series.
///
/// Numeric fields are optional because raw input may have gaps; the feature
/// builder repairs them by forward filling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub date: NaiveDate,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub operating_expenses: Option<f64>,
    #[serde(default)]
    pub capital_expenditures: Option<f64>,
    #[serde(default)]
    pub net_cashflow: Option<f64>,
    #[serde(default)]
    pub cash_balance: Option<f64>,
}

impl FinancialRecord {
    /// Build a complete record; net cash flow is derived from the three inputs
    pub fn new(
        date: NaiveDate,
        revenue: f64,
        operating_expenses: f64,
        capital_expenditures: f64,
        cash_balance: f64,
    ) -> Self {
        Self {
            date,
            revenue: Some(revenue),
            operating_expenses: Some(operating_expenses),
            capital_expenditures: Some(capital_expenditures),
            net_cashflow: Some(revenue - operating_expenses - capital_expenditures),
            cash_balance: Some(cash_balance),
        }
    }

    /// Future row used during projection: zero economic inputs, no balance
    pub fn placeholder(date: NaiveDate) -> Self {
        Self {
            date,
            revenue: Some(0.0),
            operating_expenses: Some(0.0),
            capital_expenditures: Some(0.0),
            net_cashflow: Some(0.0),
            cash_balance: None,
        }
    }

    /// Value of an economic field
    pub fn field(&self, field: EconomicField) -> Option<f64> {
        match field {
            EconomicField::Revenue => self.revenue,
            EconomicField::OperatingExpenses => self.operating_expenses,
            EconomicField::CapitalExpenditures => self.capital_expenditures,
            EconomicField::NetCashflow => self.net_cashflow,
        }
    }
}

/// Ensure a borrowed record sequence is non-empty and strictly date-ascending
pub fn ensure_chronological(records: &[FinancialRecord]) -> Result<()> {
    if records.is_empty() {
        return Err(ForecastError::DataError(
            "Cash-flow history is empty".to_string(),
        ));
    }

    for (i, pair) in records.windows(2).enumerate() {
        if pair[1].date <= pair[0].date {
            return Err(ForecastError::DataError(format!(
                "Records must be strictly ordered by date: row {} ({}) follows {}",
                i + 1,
                pair[1].date,
                pair[0].date
            )));
        }
    }

    Ok(())
}

/// A validated, non-empty, date-ascending sequence of financial records
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowHistory {
    records: Vec<FinancialRecord>,
}

impl CashflowHistory {
    /// Sort records by date and reject empty input or duplicate dates
    pub fn new(mut records: Vec<FinancialRecord>) -> Result<Self> {
        if records.is_empty() {
            return Err(ForecastError::DataError(
                "Cash-flow history is empty".to_string(),
            ));
        }

        records.sort_by_key(|r| r.date);
        if let Some(pair) = records.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(ForecastError::DataError(format!(
                "Duplicate record for date {}",
                pair[0].date
            )));
        }

        Ok(Self { records })
    }

    /// Daily history starting at `start`, one record per `(revenue, opex, capex)`
    /// flow, with the cash balance accumulated from `initial_balance`
    pub fn from_daily_flows(
        start: NaiveDate,
        initial_balance: f64,
        flows: &[(f64, f64, f64)],
    ) -> Result<Self> {
        let mut balance = initial_balance;
        let mut records = Vec::with_capacity(flows.len());

        for (offset, &(revenue, opex, capex)) in flows.iter().enumerate() {
            let date = start
                .checked_add_days(Days::new(offset as u64))
                .ok_or_else(|| ForecastError::DataError("Date out of range".to_string()))?;
            balance += revenue - opex - capex;
            records.push(FinancialRecord::new(date, revenue, opex, capex, balance));
        }

        Self::new(records)
    }

    pub fn records(&self) -> &[FinancialRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<FinancialRecord> {
        self.records
    }

    pub fn first_date(&self) -> NaiveDate {
        self.records[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.records[self.records.len() - 1].date
    }

    /// Most recent known cash balance
    pub fn last_balance(&self) -> Option<f64> {
        self.records.iter().rev().find_map(|r| r.cash_balance)
    }

    /// The last `n` records (all of them when `n` exceeds the length)
    pub fn tail(&self, n: usize) -> &[FinancialRecord] {
        &self.records[self.records.len().saturating_sub(n)..]
    }

    /// Known values of an economic field, skipping gaps
    pub fn field_values(&self, field: EconomicField) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.field(field)).collect()
    }

    /// Check the ledger recurrences on complete rows.
    ///
    /// `net_cashflow = revenue - operating_expenses - capital_expenditures` and
    /// `cash_balance[i] = cash_balance[i - 1] + net_cashflow[i]`, each within
    /// `tolerance`. Reports the first violating row.
    pub fn verify_ledger(&self, tolerance: f64) -> Result<()> {
        for (i, record) in self.records.iter().enumerate() {
            if let (Some(rev), Some(opex), Some(capex), Some(net)) = (
                record.revenue,
                record.operating_expenses,
                record.capital_expenditures,
                record.net_cashflow,
            ) {
                if (net - (rev - opex - capex)).abs() > tolerance {
                    return Err(ForecastError::DataError(format!(
                        "Row {} ({}): net cash flow {} does not equal revenue - expenses - capex ({})",
                        i,
                        record.date,
                        net,
                        rev - opex - capex
                    )));
                }
            }

            if i == 0 {
                continue;
            }
            let previous = &self.records[i - 1];
            if let (Some(prev_balance), Some(balance), Some(net)) =
                (previous.cash_balance, record.cash_balance, record.net_cashflow)
            {
                if (balance - prev_balance - net).abs() > tolerance {
                    return Err(ForecastError::DataError(format!(
                        "Row {} ({}): cash balance {} does not follow {} + {}",
                        i, record.date, balance, prev_balance, net
                    )));
                }
            }
        }

        Ok(())
    }
}

impl Deref for CashflowHistory {
    type Target = [FinancialRecord];

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}

impl AsRef<[FinancialRecord]> for CashflowHistory {
    fn as_ref(&self) -> &[FinancialRecord] {
        &self.records
    }
}

/// Parse an ISO 8601 date, accepting a datetime whose first ten characters are the date
pub fn parse_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    let candidate = trimmed.get(..10).unwrap_or(trimmed);

    NaiveDate::parse_from_str(candidate, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(candidate, "%Y/%m/%d"))
        .map_err(|_| ForecastError::DataError(format!("Unparseable date '{}'", raw)))
}

/// Data loader for cash-flow tables
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load a cash-flow history from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<CashflowHistory> {
        let file = File::open(path)?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        Self::from_dataframe(&df)
    }

    /// Convert a DataFrame into a validated history.
    ///
    /// Numeric columns are coerced to floats; values that do not convert become
    /// gaps. Absent economic columns are treated as all-gap, but at least one of
    /// them must exist.
    pub fn from_dataframe(df: &DataFrame) -> Result<CashflowHistory> {
        let date_column = Self::detect_date_column(df)?;
        let dates = Self::date_values(df, &date_column)?;

        let mut present = 0;
        let mut economic: Vec<Vec<Option<f64>>> = Vec::with_capacity(EconomicField::ALL.len());
        for field in EconomicField::ALL {
            match Self::find_column(df, field.column_name()) {
                Some(name) => {
                    present += 1;
                    economic.push(Self::column_as_f64(df, &name)?);
                }
                None => economic.push(vec![None; df.height()]),
            }
        }

        if present == 0 {
            return Err(ForecastError::DataError(
                "None of the economic columns (revenue, operating_expenses, capital_expenditures, net_cashflow) are present"
                    .to_string(),
            ));
        }

        let balances = match Self::find_column(df, "cash_balance") {
            Some(name) => Self::column_as_f64(df, &name)?,
            None => vec![None; df.height()],
        };

        let records = dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| FinancialRecord {
                date,
                revenue: economic[0][i],
                operating_expenses: economic[1][i],
                capital_expenditures: economic[2][i],
                net_cashflow: economic[3][i],
                cash_balance: balances[i],
            })
            .collect();

        CashflowHistory::new(records)
    }

    /// Find the date column: an exact `date` header first, then anything date- or time-like
    fn detect_date_column(df: &DataFrame) -> Result<String> {
        if let Some(name) = Self::find_column(df, "date") {
            return Ok(name);
        }

        df.get_column_names()
            .iter()
            .find(|name| {
                let lower = name.to_lowercase();
                lower.contains("date") || lower.contains("time")
            })
            .map(|name| name.to_string())
            .ok_or_else(|| ForecastError::DataError("No date column found in data".to_string()))
    }

    /// Case-insensitive exact header lookup
    fn find_column(df: &DataFrame, wanted: &str) -> Option<String> {
        df.get_column_names()
            .iter()
            .find(|name| name.trim().eq_ignore_ascii_case(wanted))
            .map(|name| name.to_string())
    }

    fn date_values(df: &DataFrame, column_name: &str) -> Result<Vec<NaiveDate>> {
        let col = df.column(column_name)?.cast(&DataType::Utf8)?;

        col.utf8()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                Some(raw) => parse_date(raw),
                None => Err(ForecastError::DataError(format!(
                    "Missing date at row {}",
                    row
                ))),
            })
            .collect()
    }

    /// Column as optional floats; strings that are not numbers become `None`
    fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<Option<f64>>> {
        let col = df.column(column_name)?;
        let casted = match col.dtype() {
            DataType::Utf8 => {
                let parsed: Vec<Option<f64>> = col
                    .utf8()?
                    .into_iter()
                    .map(|v| v.and_then(|s| s.trim().parse::<f64>().ok()))
                    .collect();
                return Ok(parsed);
            }
            _ => col.cast(&DataType::Float64)?,
        };

        Ok(casted
            .f64()?
            .into_iter()
            .map(|v| v.filter(|x| x.is_finite()))
            .collect())
    }
}
