//! # Finance Agents
//!
//! `finance_agents` answers natural-language finance questions by routing them to
//! one of five domain agents. Each agent reads its own CSV table and falls back to
//! a small built-in dataset when the file cannot be used.
//!
//! ## Agents
//!
//! - **Budget**: approved vs. actual spend per department, with variance
//! - **Spending**: subscription spend per merchant
//! - **Alert**: transactions whose amount is an outlier by z-score
//! - **Cash flow**: trend summary plus an ML forecast from `cashflow_forecast`
//! - **Invoice**: payment status, overdue totals and vendor concentration
//!
//! ## Usage Example
//!
//! ```no_run
//! use finance_agents::{AgentSettings, Coordinator};
//!
//! let mut coordinator = Coordinator::new(AgentSettings::default()).unwrap();
//!
//! let response = coordinator.handle("forecast cash flow for the next 14 days").unwrap();
//! println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub mod alerts;
pub mod budget;
pub mod cashflow;
pub mod coordinator;
pub mod datasets;
pub mod invoice;
pub mod router;
pub mod settings;
pub mod spending;

pub use alerts::AlertAgent;
pub use budget::BudgetAgent;
pub use cashflow::CashflowAgent;
pub use coordinator::Coordinator;
pub use datasets::{load_or_fallback, DataOrigin, Loaded};
pub use invoice::InvoiceAgent;
pub use router::route;
pub use settings::AgentSettings;
pub use spending::SpendingAgent;

/// Errors that can occur while answering a query
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Forecast error: {0}")]
    Forecast(#[from] cashflow_forecast::ForecastError),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<csv::Error> for AgentError {
    fn from(err: csv::Error) -> Self {
        AgentError::Dataset(err.to_string())
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::Config(err.to_string())
    }
}

/// Result type for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// The agent that produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Budget,
    Spending,
    Alert,
    Cashflow,
    Invoice,
}

impl AgentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Budget => "budget",
            AgentKind::Spending => "spending",
            AgentKind::Alert => "alert",
            AgentKind::Cashflow => "cashflow",
            AgentKind::Invoice => "invoice",
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Agent output: a formatted report or a list of JSON records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AgentOutput {
    Text(String),
    Records(Vec<serde_json::Value>),
}

impl AgentOutput {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AgentOutput::Text(text) => Some(text),
            AgentOutput::Records(_) => None,
        }
    }

    pub fn as_records(&self) -> Option<&[serde_json::Value]> {
        match self {
            AgentOutput::Records(records) => Some(records),
            AgentOutput::Text(_) => None,
        }
    }
}

/// Response returned to the caller, serialised as `{"type": ..., "output": ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(rename = "type")]
    pub kind: AgentKind,
    pub output: AgentOutput,
}

impl AgentResponse {
    pub fn text(kind: AgentKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            output: AgentOutput::Text(text.into()),
        }
    }

    pub fn records(kind: AgentKind, records: Vec<serde_json::Value>) -> Self {
        Self {
            kind,
            output: AgentOutput::Records(records),
        }
    }
}

/// Trait implemented by every domain agent
pub trait FinanceAgent {
    /// Which agent this is
    fn kind(&self) -> AgentKind;

    /// Answer a query
    fn handle(&mut self, query: &str) -> Result<AgentResponse>;
}
