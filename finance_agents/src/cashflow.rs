//! Cash-flow agent: trend summary plus an ML forecast on request

use crate::datasets::{load_or_fallback, Loaded};
use crate::{AgentError, AgentKind, AgentResponse, FinanceAgent, Result};
use cashflow_forecast::{
    CashflowForecaster, CashflowHistory, DataLoader, EconomicField, FinancialRecord,
    ForecastConfig, ForecastResult,
};
use chrono::NaiveDate;
use fin_math::growth_percent;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use tracing::{info, warn};

/// Rows considered "recent" by the trend summary
const RECENT_ROWS: usize = 30;
/// Rows averaged for the naive 30-day projection
const PROJECTION_ROWS: usize = 7;
const PROJECTION_DAYS: f64 = 30.0;

const FORECAST_KEYWORDS: &[&str] = &["forecast", "predict", "projection", "dự báo", "dự đoán"];
/// Units that mark a number in a query as a day count
const DAY_UNITS: &[&str] = &["day", "ngày"];

/// Three days of January 2024, used when the ledger file is unavailable
pub fn fallback_history() -> Result<CashflowHistory> {
    let rows = [
        (1, 100_000.0, 80_000.0, 10_000.0, 500_000.0),
        (2, 120_000.0, 85_000.0, 5_000.0, 530_000.0),
        (3, 95_000.0, 75_000.0, 15_000.0, 535_000.0),
    ];
    let records = rows
        .iter()
        .map(|&(day, revenue, opex, capex, balance)| -> Result<FinancialRecord> {
            let date = NaiveDate::from_ymd_opt(2024, 1, day)
                .ok_or_else(|| AgentError::Dataset(format!("invalid day {}", day)))?;
            Ok(FinancialRecord::new(date, revenue, opex, capex, balance))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CashflowHistory::new(records)?)
}

/// Trend figures over the most recent rows of a ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowSummary {
    pub current_balance: f64,
    pub avg_revenue: f64,
    pub avg_expenses: f64,
    pub avg_cashflow: f64,
    pub revenue_growth: f64,
    pub expense_growth: f64,
    pub projected_30_days: f64,
    pub projected_balance: f64,
}

fn average(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn known(records: &[FinancialRecord], field: EconomicField) -> Vec<f64> {
    records.iter().filter_map(|r| r.field(field)).collect()
}

fn first_to_last_growth(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(&first), Some(&last)) => growth_percent(first, last),
        _ => 0.0,
    }
}

impl CashflowSummary {
    pub fn from_history(history: &CashflowHistory) -> Self {
        let recent = history.tail(RECENT_ROWS);
        let revenue = known(recent, EconomicField::Revenue);
        let expenses = known(recent, EconomicField::OperatingExpenses);
        let net = known(recent, EconomicField::NetCashflow);

        let current_balance = history.last_balance().unwrap_or(0.0);
        let avg_cashflow = average(&net);

        let (revenue_growth, expense_growth) = if history.len() > 1 {
            (first_to_last_growth(&revenue), first_to_last_growth(&expenses))
        } else {
            (0.0, 0.0)
        };

        let daily = if history.len() >= PROJECTION_ROWS {
            average(&known(
                history.tail(PROJECTION_ROWS),
                EconomicField::NetCashflow,
            ))
        } else {
            avg_cashflow
        };
        let projected_30_days = daily * PROJECTION_DAYS;

        Self {
            current_balance,
            avg_revenue: average(&revenue),
            avg_expenses: average(&expenses),
            avg_cashflow,
            revenue_growth,
            expense_growth,
            projected_30_days,
            projected_balance: current_balance + projected_30_days,
        }
    }

    pub fn insights(&self) -> Vec<String> {
        let mut insights = Vec::new();

        if self.avg_cashflow > 0.0 {
            insights.push(format!(
                "Positive average cash flow: {:.2}/day",
                self.avg_cashflow
            ));
        } else {
            insights.push(format!(
                "Negative average cash flow: {:.2}/day",
                self.avg_cashflow
            ));
        }

        if self.revenue_growth > 5.0 {
            insights.push(format!("Revenue growing: +{:.1}%", self.revenue_growth));
        } else if self.revenue_growth < -5.0 {
            insights.push(format!("Revenue declining: {:.1}%", self.revenue_growth));
        } else {
            insights.push(format!("Revenue stable: {:+.1}%", self.revenue_growth));
        }

        if self.projected_balance < self.current_balance * 0.8 {
            insights.push("Warning: cash position projected to fall over the next 30 days".to_string());
        } else if self.projected_balance > self.current_balance * 1.2 {
            insights.push("Cash position projected to rise over the next 30 days".to_string());
        }

        insights
    }
}

impl fmt::Display for CashflowSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cash flow analysis:")?;
        writeln!(f, "- Current balance: {:.2}", self.current_balance)?;
        writeln!(f, "- Average revenue: {:.2}/day", self.avg_revenue)?;
        writeln!(f, "- Average expenses: {:.2}/day", self.avg_expenses)?;
        writeln!(f, "- Average net cash flow: {:.2}/day", self.avg_cashflow)?;
        writeln!(f, "- Revenue growth: {:+.1}%", self.revenue_growth)?;
        writeln!(f, "- Expense growth: {:+.1}%", self.expense_growth)?;
        writeln!(f)?;
        writeln!(f, "Next 30 days (recent average):")?;
        writeln!(f, "- Expected cash flow: {:.2}", self.projected_30_days)?;
        writeln!(f, "- Expected balance: {:.2}", self.projected_balance)?;
        writeln!(f)?;
        writeln!(f, "Insights:")?;
        for insight in self.insights() {
            writeln!(f, "- {}", insight)?;
        }
        Ok(())
    }
}

/// Whether the query asks for a forecast
pub fn wants_forecast(query: &str) -> bool {
    let q = query.to_lowercase();
    FORECAST_KEYWORDS.iter().any(|kw| q.contains(kw))
}

/// The first number in the query followed by a day unit ("30 days", "60 ngày").
///
/// Bare numbers such as years are ignored. Zero gives `None`; a count too large
/// for `usize` saturates and is left for the caller to cap.
pub fn requested_horizon(query: &str) -> Option<usize> {
    let q = query.to_lowercase();
    let mut rest = q.as_str();
    while let Some(start) = rest.find(|c: char| c.is_ascii_digit()) {
        let tail = &rest[start..];
        let len = tail
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(tail.len());
        let (digits, after) = tail.split_at(len);
        if DAY_UNITS
            .iter()
            .any(|unit| after.trim_start().starts_with(unit))
        {
            let days = digits.parse::<usize>().unwrap_or(usize::MAX);
            return (days > 0).then_some(days);
        }
        rest = after;
    }
    None
}

/// Horizon to forecast, plus a note when the request was cut to `max_days`
pub fn resolve_horizon(
    requested: Option<usize>,
    default_days: usize,
    max_days: usize,
) -> (usize, Option<String>) {
    match requested {
        Some(days) if days > max_days => (
            max_days,
            Some(format!(
                "Requested horizon of {} days exceeds the {}-day limit; forecasting {} days.",
                days, max_days, max_days
            )),
        ),
        Some(days) => (days, None),
        None => (default_days.min(max_days), None),
    }
}

fn render_forecast(forecast: &ForecastResult, starting_balance: f64) -> String {
    let balances = forecast.projected_balances(starting_balance);
    let closing = balances.last().copied().unwrap_or(starting_balance);

    let mut out = format!("ML forecast (next {} days):\n", forecast.horizons());
    out.push_str(&format!(
        "- Total projected cash flow: {:.2}\n",
        forecast.total_cashflow()
    ));
    out.push_str(&format!("- Projected closing balance: {:.2}\n", closing));
    for (point, balance) in forecast.points().iter().zip(&balances) {
        out.push_str(&format!(
            "  {}  {:>14.2}  balance {:>14.2}\n",
            point.date, point.predicted_cashflow, balance
        ));
    }
    out
}

/// Summarises the ledger and, when asked, forecasts it with its own model.
///
/// The forecaster trains on the first forecast request and is reused after that.
#[derive(Debug)]
pub struct CashflowAgent {
    path: PathBuf,
    forecaster: CashflowForecaster,
    max_horizon_days: usize,
}

impl CashflowAgent {
    /// Queries asking for more than `max_horizon_days` are cut to that limit
    pub fn new(
        path: impl Into<PathBuf>,
        config: ForecastConfig,
        max_horizon_days: usize,
    ) -> Result<Self> {
        if max_horizon_days < config.horizon_days {
            return Err(AgentError::Config(format!(
                "max_horizon_days ({}) is below horizon_days ({})",
                max_horizon_days, config.horizon_days
            )));
        }
        Ok(Self {
            path: path.into(),
            forecaster: CashflowForecaster::new(config)?,
            max_horizon_days,
        })
    }

    pub fn max_horizon_days(&self) -> usize {
        self.max_horizon_days
    }

    pub fn load(&self) -> Result<Loaded<CashflowHistory>> {
        let loaded = load_or_fallback(
            &self.path,
            |path| Ok(Some(DataLoader::from_csv(path)?)),
            || None,
        );
        let data = match loaded.data {
            Some(history) => history,
            None => fallback_history()?,
        };
        Ok(Loaded {
            data,
            origin: loaded.origin,
        })
    }

    pub fn forecaster(&self) -> &CashflowForecaster {
        &self.forecaster
    }

    /// Forecast `horizon` days of `history`
    pub fn forecast(&mut self, history: &CashflowHistory, horizon: usize) -> Result<ForecastResult> {
        Ok(self.forecaster.predict(history, horizon)?)
    }
}

impl FinanceAgent for CashflowAgent {
    fn kind(&self) -> AgentKind {
        AgentKind::Cashflow
    }

    fn handle(&mut self, query: &str) -> Result<AgentResponse> {
        let history = self.load()?;
        let summary = CashflowSummary::from_history(&history.data);
        let mut text = summary.to_string();

        if wants_forecast(query) {
            let (horizon, note) = resolve_horizon(
                requested_horizon(query),
                self.forecaster.config().horizon_days,
                self.max_horizon_days,
            );
            text.push('\n');
            if let Some(note) = note {
                warn!(limit = self.max_horizon_days, "forecast horizon capped");
                text.push_str(&note);
                text.push('\n');
            }
            match self.forecast(&history.data, horizon) {
                Ok(forecast) => {
                    info!(horizon, source = %history.origin, "cash-flow forecast produced");
                    text.push_str(&render_forecast(&forecast, summary.current_balance));
                }
                Err(e) => {
                    warn!(error = %e, "cash-flow forecast failed");
                    text.push_str(&format!("ML forecast unavailable: {}\n", e));
                }
            }
        }

        Ok(AgentResponse::text(AgentKind::Cashflow, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use cashflow_forecast::ForestConfig;
    use rstest::rstest;

    #[rstest]
    #[case("forecast cash flow for 14 days", Some(14))]
    #[case("dự báo dòng tiền 60 ngày", Some(60))]
    #[case("Predict 1 DAY ahead", Some(1))]
    #[case("forecast the 2025 budget for 45days", Some(45))]
    #[case("forecast cash flow for 2025", None)]
    #[case("forecast cash flow for 99999999 days", Some(99_999_999))]
    #[case("forecast 99999999999999999999999999 days", Some(usize::MAX))]
    #[case("predict the next 0 days then 5", None)]
    #[case("cash flow forecast", None)]
    fn test_requested_horizon(#[case] query: &str, #[case] expected: Option<usize>) {
        assert_eq!(requested_horizon(query), expected);
    }

    #[rstest]
    #[case(Some(14), 14, false)]
    #[case(None, 30, false)]
    #[case(Some(365), 365, false)]
    #[case(Some(99_999_999), 365, true)]
    fn test_resolve_horizon(
        #[case] requested: Option<usize>,
        #[case] days: usize,
        #[case] capped: bool,
    ) {
        let (horizon, note) = resolve_horizon(requested, 30, 365);
        assert_eq!(horizon, days);
        assert_eq!(note.is_some(), capped);
    }

    fn small_agent(max_horizon_days: usize) -> CashflowAgent {
        let config = ForecastConfig {
            horizon_days: 5,
            forest: ForestConfig {
                n_trees: 5,
                ..Default::default()
            },
            ..Default::default()
        };
        CashflowAgent::new("/nonexistent/cashflow.csv", config, max_horizon_days).unwrap()
    }

    #[test]
    fn test_oversized_horizon_is_capped_with_note() {
        let mut agent = small_agent(10);
        let response = agent
            .handle("forecast cash flow for 99999999 days")
            .unwrap();
        let text = response.output.as_text().unwrap();

        assert!(text.contains("Requested horizon of 99999999 days exceeds the 10-day limit"));
        assert!(text.contains("ML forecast (next 10 days)"));
    }

    #[test]
    fn test_year_in_query_uses_default_horizon() {
        let mut agent = small_agent(10);
        let response = agent.handle("forecast cash flow for 2025").unwrap();
        let text = response.output.as_text().unwrap();

        assert!(text.contains("ML forecast (next 5 days)"));
        assert!(!text.contains("exceeds"));
    }

    #[test]
    fn test_limit_below_default_horizon_is_rejected() {
        let config = ForecastConfig::default();
        assert!(matches!(
            CashflowAgent::new("cashflow.csv", config, 7),
            Err(AgentError::Config(_))
        ));
    }

    #[test]
    fn test_forecast_keywords() {
        assert!(wants_forecast("Cash flow PROJECTION please"));
        assert!(wants_forecast("dự đoán dòng tiền"));
        assert!(!wants_forecast("cash flow summary"));
    }

    #[test]
    fn test_fallback_summary_figures() {
        let history = fallback_history().unwrap();
        let summary = CashflowSummary::from_history(&history);

        assert_relative_eq!(summary.current_balance, 535_000.0);
        assert_relative_eq!(summary.avg_revenue, 105_000.0);
        assert_relative_eq!(summary.avg_cashflow, 15_000.0);
        assert_relative_eq!(summary.revenue_growth, -5.0);
        assert_relative_eq!(summary.expense_growth, -6.25);
        // Fewer than 7 rows: the projection uses the overall average
        assert_relative_eq!(summary.projected_30_days, 450_000.0);
        assert_relative_eq!(summary.projected_balance, 985_000.0);

        let insights = summary.insights();
        assert!(insights[0].starts_with("Positive average cash flow"));
        assert!(insights[1].starts_with("Revenue stable"));
        assert!(insights[2].contains("rise"));
    }
}
