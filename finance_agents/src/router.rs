//! Keyword routing of queries to agents

use crate::AgentKind;

/// Routes in priority order; the first route with a keyword in the query wins.
///
/// Cash flow comes before budget so that "forecast the budget cash flow" is
/// answered by the forecaster.
pub const ROUTES: &[(AgentKind, &[&str])] = &[
    (AgentKind::Cashflow, &["cash flow", "cashflow", "dòng tiền", "forecast"]),
    (AgentKind::Invoice, &["invoice", "hóa đơn", "overdue", "quá hạn"]),
    (AgentKind::Budget, &["budget", "ngân sách"]),
    (AgentKind::Spending, &["subscription", "saas", "vendor"]),
    (AgentKind::Alert, &["alert", "anomaly", "risk", "bất thường"]),
];

/// Agent answering queries that match no route
pub const DEFAULT_ROUTE: AgentKind = AgentKind::Budget;

/// Pick the agent for a query
pub fn route(query: &str) -> AgentKind {
    let q = query.to_lowercase();
    ROUTES
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|kw| q.contains(kw)))
        .map_or(DEFAULT_ROUTE, |(kind, _)| *kind)
}
