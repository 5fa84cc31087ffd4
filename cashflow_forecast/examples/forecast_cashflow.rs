use cashflow_forecast::{CashflowForecaster, CashflowHistory, DataLoader, ForecastConfig};
use chrono::NaiveDate;
use std::env;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load a ledger from the path given on the command line, or build a synthetic one
    let history = match env::args().nth(1) {
        Some(path) => {
            println!("Loading data from: {}", path);
            DataLoader::from_csv(path)?
        }
        None => synthetic_history()?,
    };
    println!(
        "Loaded {} records ({} to {})",
        history.len(),
        history.first_date(),
        history.last_date()
    );

    let config = ForecastConfig::default();
    let horizon = config.horizon_days;
    let mut forecaster = CashflowForecaster::new(config)?;

    let forecast = forecaster.predict(&history, horizon)?;
    let balances = forecast.projected_balances(history.last_balance().unwrap_or(0.0));

    println!("Forecast for the next {} days:", horizon);
    for (point, balance) in forecast.points().iter().zip(balances) {
        println!(
            "{}: {:>12.2}   balance {:>14.2}",
            point.date, point.predicted_cashflow, balance
        );
    }
    println!("Total projected cash flow: {:.2}", forecast.total_cashflow());

    match forecaster.evaluate_holdout() {
        Ok(accuracy) => println!("\n{}", accuracy),
        Err(e) => println!("\nNo held-out evaluation: {}", e),
    }

    println!("Most important features:");
    for (name, importance) in forecaster.trained()?.feature_importance_ranking().iter().take(5) {
        println!("  {:<28} {:.3}", name, importance);
    }

    Ok(())
}

fn synthetic_history() -> cashflow_forecast::Result<CashflowHistory> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
    let flows: Vec<(f64, f64, f64)> = (0..180)
        .map(|i| {
            let weekday_boost = if i % 7 < 5 { 4_000.0 } else { 0.0 };
            let capex = if i % 30 == 15 { 25_000.0 } else { 0.0 };
            (20_000.0 + weekday_boost + 40.0 * i as f64, 18_500.0, capex)
        })
        .collect();
    CashflowHistory::from_daily_flows(start, 500_000.0, &flows)
}
