//! Spending agent: subscription spend per merchant

use crate::datasets::{load_or_fallback, read_csv, Loaded};
use crate::{AgentKind, AgentResponse, FinanceAgent, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// The columns of a transaction row this agent reads
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Transaction {
    pub merchant: String,
    pub amount: f64,
    pub category: String,
}

/// Total subscription spend for one merchant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MerchantTotal {
    pub merchant: String,
    pub amount: f64,
}

/// Sum `subscription` rows per merchant, largest first
pub fn summarize_subscriptions(transactions: &[Transaction]) -> Vec<MerchantTotal> {
    let mut totals: HashMap<&str, f64> = HashMap::new();
    for tx in transactions
        .iter()
        .filter(|tx| tx.category.eq_ignore_ascii_case("subscription"))
    {
        *totals.entry(tx.merchant.as_str()).or_insert(0.0) += tx.amount;
    }

    let mut summary: Vec<MerchantTotal> = totals
        .into_iter()
        .map(|(merchant, amount)| MerchantTotal {
            merchant: merchant.to_string(),
            amount,
        })
        .collect();
    summary.sort_by(|a, b| {
        b.amount
            .total_cmp(&a.amount)
            .then_with(|| a.merchant.cmp(&b.merchant))
    });
    summary
}

/// Reports subscription spend; an unreadable file yields no records
#[derive(Debug, Clone)]
pub struct SpendingAgent {
    path: PathBuf,
}

impl SpendingAgent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Loaded<Vec<Transaction>> {
        load_or_fallback(&self.path, read_csv, Vec::new)
    }
}

impl FinanceAgent for SpendingAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Spending
    }

    fn handle(&mut self, _query: &str) -> Result<AgentResponse> {
        let transactions = self.load();
        let records = summarize_subscriptions(&transactions.data)
            .iter()
            .map(serde_json::to_value)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(AgentResponse::records(AgentKind::Spending, records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tx(merchant: &str, amount: f64, category: &str) -> Transaction {
        Transaction {
            merchant: merchant.to_string(),
            amount,
            category: category.to_string(),
        }
    }

    #[test]
    fn test_groups_and_sorts_subscriptions() {
        let rows = vec![
            tx("Slack", 12.5, "subscription"),
            tx("Zoom", 40.0, "Subscription"),
            tx("Slack", 12.5, "SUBSCRIPTION"),
            tx("Airline", 900.0, "travel"),
        ];

        assert_eq!(
            summarize_subscriptions(&rows),
            vec![
                MerchantTotal {
                    merchant: "Zoom".to_string(),
                    amount: 40.0
                },
                MerchantTotal {
                    merchant: "Slack".to_string(),
                    amount: 25.0
                },
            ]
        );
    }

    #[test]
    fn test_missing_file_gives_empty_records() {
        let mut agent = SpendingAgent::new("/nonexistent/transactions.csv");
        let response = agent.handle("saas spend").unwrap();
        assert_eq!(response.output.as_records().unwrap().len(), 0);
    }
}
