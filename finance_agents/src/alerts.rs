//! Alert agent: transactions with outlying amounts

use crate::datasets::{load_or_fallback, Loaded};
use crate::{AgentError, AgentKind, AgentResponse, FinanceAgent, Result};
use fin_math::z_scores;
use serde_json::{Map, Number, Value};
use std::path::{Path, PathBuf};

/// A transaction row with every column kept, plus its parsed amount
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRow {
    pub fields: Map<String, Value>,
    pub amount: f64,
}

/// A flagged transaction
#[derive(Debug, Clone, PartialEq)]
pub struct Anomaly {
    pub row: TransactionRow,
    pub zscore: f64,
}

impl Anomaly {
    /// The original columns with a `zscore` field added
    pub fn to_record(&self) -> Value {
        let mut fields = self.row.fields.clone();
        fields.insert("zscore".to_string(), number(self.zscore));
        Value::Object(fields)
    }
}

fn number(x: f64) -> Value {
    Number::from_f64(x).map_or(Value::Null, Value::Number)
}

/// Read every column of a transactions file; an `amount` column is required
pub fn read_transactions(path: &Path) -> Result<Vec<TransactionRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)?;
    let headers = reader.headers()?.clone();
    let amount_idx = headers
        .iter()
        .position(|h| h == "amount")
        .ok_or_else(|| AgentError::Dataset(format!("{} has no amount column", path.display())))?;

    let mut rows = Vec::new();
    for (line, record) in reader.records().enumerate() {
        let record = record?;
        let raw_amount = record.get(amount_idx).unwrap_or_default();
        let amount: f64 = raw_amount.parse().map_err(|_| {
            AgentError::Dataset(format!(
                "{} row {}: amount '{}' is not a number",
                path.display(),
                line + 1,
                raw_amount
            ))
        })?;

        let fields = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| {
                let json = match value.parse::<f64>() {
                    Ok(x) if x.is_finite() => number(x),
                    _ => Value::String(value.to_string()),
                };
                (header.to_string(), json)
            })
            .collect();
        rows.push(TransactionRow { fields, amount });
    }
    Ok(rows)
}

/// Rows whose amount z-score (population std) is at least `z_threshold` in magnitude
pub fn detect_anomalies(rows: &[TransactionRow], z_threshold: f64) -> Result<Vec<Anomaly>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let amounts: Vec<f64> = rows.iter().map(|r| r.amount).collect();
    let scores = z_scores(&amounts).map_err(|e| AgentError::Dataset(e.to_string()))?;

    Ok(rows
        .iter()
        .zip(scores)
        .filter(|(_, z)| z.abs() >= z_threshold)
        .map(|(row, zscore)| Anomaly {
            row: row.clone(),
            zscore,
        })
        .collect())
}

/// Reports outlying transactions, at most `limit` per query
#[derive(Debug, Clone)]
pub struct AlertAgent {
    path: PathBuf,
    z_threshold: f64,
    limit: usize,
}

impl AlertAgent {
    pub fn new(path: impl Into<PathBuf>, z_threshold: f64, limit: usize) -> Self {
        Self {
            path: path.into(),
            z_threshold,
            limit,
        }
    }

    pub fn load(&self) -> Loaded<Vec<TransactionRow>> {
        load_or_fallback(&self.path, read_transactions, Vec::new)
    }
}

impl FinanceAgent for AlertAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Alert
    }

    fn handle(&mut self, _query: &str) -> Result<AgentResponse> {
        let transactions = self.load();
        let records = detect_anomalies(&transactions.data, self.z_threshold)?
            .iter()
            .take(self.limit)
            .map(Anomaly::to_record)
            .collect();
        Ok(AgentResponse::records(AgentKind::Alert, records))
    }
}
