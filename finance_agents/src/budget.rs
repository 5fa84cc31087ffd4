//! Budget agent: approved vs. actual spend

use crate::datasets::{load_or_fallback, read_csv, Loaded};
use crate::{AgentKind, AgentResponse, FinanceAgent, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// One budget line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub dept: String,
    pub project_id: String,
    pub approved_amount: f64,
    pub actual_spent: f64,
}

impl BudgetLine {
    /// Approved minus actual; negative means overspent
    pub fn variance(&self) -> f64 {
        self.approved_amount - self.actual_spent
    }
}

pub fn fallback_budgets() -> Vec<BudgetLine> {
    vec![
        BudgetLine {
            dept: "Marketing".to_string(),
            project_id: "1".to_string(),
            approved_amount: 60000.0,
            actual_spent: 50000.0,
        },
        BudgetLine {
            dept: "Sales".to_string(),
            project_id: "2".to_string(),
            approved_amount: 40000.0,
            actual_spent: 25000.0,
        },
    ]
}

/// Budget lines rendered as a table with a variance column
#[derive(Debug, Clone, Copy)]
pub struct BudgetSummary<'a> {
    lines: &'a [BudgetLine],
}

impl<'a> BudgetSummary<'a> {
    pub fn new(lines: &'a [BudgetLine]) -> Self {
        Self { lines }
    }

    fn column_width(&self, header: &str, value: impl Fn(&BudgetLine) -> &str) -> usize {
        self.lines
            .iter()
            .map(|l| value(l).chars().count())
            .max()
            .unwrap_or(0)
            .max(header.len())
    }
}

impl fmt::Display for BudgetSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dw = self.column_width("dept", |l| &l.dept);
        let pw = self.column_width("project_id", |l| &l.project_id);

        writeln!(f, "Budget summary (variance = approved - actual):")?;
        write!(
            f,
            "{:<dw$}  {:<pw$}  {:>15}  {:>15}  {:>15}",
            "dept", "project_id", "approved_amount", "actual_spent", "variance"
        )?;
        for line in self.lines {
            write!(
                f,
                "\n{:<dw$}  {:<pw$}  {:>15.2}  {:>15.2}  {:>15.2}",
                line.dept,
                line.project_id,
                line.approved_amount,
                line.actual_spent,
                line.variance()
            )?;
        }
        Ok(())
    }
}

/// Render the budget table with a variance column
pub fn budget_summary(lines: &[BudgetLine]) -> String {
    BudgetSummary::new(lines).to_string()
}

/// Reports every budget line with its variance
#[derive(Debug, Clone)]
pub struct BudgetAgent {
    path: PathBuf,
}

impl BudgetAgent {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn load(&self) -> Loaded<Vec<BudgetLine>> {
        load_or_fallback(&self.path, read_csv, fallback_budgets)
    }
}

impl FinanceAgent for BudgetAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Budget
    }

    fn handle(&mut self, _query: &str) -> Result<AgentResponse> {
        let budgets = self.load();
        Ok(AgentResponse::text(
            AgentKind::Budget,
            budget_summary(&budgets.data),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_summary() {
        let mut agent = BudgetAgent::new("/nonexistent/budgets.csv");
        let response = agent.handle("how is the budget?").unwrap();
        let text = response.output.as_text().unwrap();

        assert!(text.starts_with("Budget summary (variance = approved - actual):"));
        assert!(text.contains("Marketing"));
        assert!(text.contains("10000.00"));
        assert!(text.contains("15000.00"));
    }

    #[test]
    fn test_overspend_is_negative_variance() {
        let line = BudgetLine {
            dept: "IT".to_string(),
            project_id: "Project_007".to_string(),
            approved_amount: 1000.0,
            actual_spent: 1250.0,
        };
        assert_eq!(line.variance(), -250.0);
        assert!(budget_summary(&[line]).contains("-250.00"));
    }

    #[test]
    fn test_table_has_one_row_per_line() {
        let text = budget_summary(&fallback_budgets());
        let rows: Vec<&str> = text.lines().collect();

        assert_eq!(rows.len(), 4);
        assert!(rows[1].starts_with("dept"));
        assert!(rows[3].starts_with("Sales"));
        assert!(!text.ends_with('\n'));
        assert_eq!(budget_summary(&[]).lines().count(), 2);
    }
}
