//! # finsight
//!
//! `finsight` bundles the workspace crates behind one dependency:
//!
//! - [`fin_math`]: rolling means and population statistics
//! - [`cashflow_forecast`]: feature building, random-forest training and horizon projection
//! - [`finance_agents`]: keyword-routed budget, spending, alert, cash-flow and invoice agents
//!
//! ## Example
//!
//! ```no_run
//! use finsight::agents::{AgentSettings, Coordinator};
//!
//! let mut coordinator = Coordinator::new(AgentSettings::default()).unwrap();
//! let response = coordinator.handle("forecast cash flow for 30 days").unwrap();
//! println!("{}", response.output.as_text().unwrap_or_default());
//! ```

pub use cashflow_forecast as forecast;
pub use fin_math as math;
pub use finance_agents as agents;

pub use cashflow_forecast::{CashflowForecaster, ForecastConfig, ForecastResult};
pub use finance_agents::{AgentResponse, Coordinator};
