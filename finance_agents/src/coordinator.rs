//! Coordinator owning one instance of every agent

use crate::alerts::AlertAgent;
use crate::budget::BudgetAgent;
use crate::cashflow::CashflowAgent;
use crate::invoice::InvoiceAgent;
use crate::router::route;
use crate::settings::AgentSettings;
use crate::spending::SpendingAgent;
use crate::{AgentKind, AgentResponse, FinanceAgent, Result};
use tracing::info;

/// Routes each query to the agent that owns its topic.
///
/// Agents keep state between queries (the cash-flow agent keeps its trained
/// model), so handling takes `&mut self`.
#[derive(Debug)]
pub struct Coordinator {
    budget: BudgetAgent,
    spending: SpendingAgent,
    alerts: AlertAgent,
    cashflow: CashflowAgent,
    invoices: InvoiceAgent,
}

impl Coordinator {
    pub fn new(settings: AgentSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            budget: BudgetAgent::new(settings.budgets_path),
            spending: SpendingAgent::new(settings.transactions_path),
            alerts: AlertAgent::new(
                settings.alerts_path,
                settings.z_threshold,
                settings.alert_limit,
            ),
            cashflow: CashflowAgent::new(
                settings.cashflow_path,
                settings.forecast,
                settings.max_horizon_days,
            )?,
            invoices: InvoiceAgent::new(settings.invoices_path),
        })
    }

    /// The agent registered for `kind`
    pub fn agent_mut(&mut self, kind: AgentKind) -> &mut dyn FinanceAgent {
        match kind {
            AgentKind::Budget => &mut self.budget,
            AgentKind::Spending => &mut self.spending,
            AgentKind::Alert => &mut self.alerts,
            AgentKind::Cashflow => &mut self.cashflow,
            AgentKind::Invoice => &mut self.invoices,
        }
    }

    pub fn cashflow(&self) -> &CashflowAgent {
        &self.cashflow
    }

    /// Route `query` and let the chosen agent answer it
    pub fn handle(&mut self, query: &str) -> Result<AgentResponse> {
        let kind = route(query);
        info!(agent = %kind, "routing query");
        self.agent_mut(kind).handle(query)
    }
}
