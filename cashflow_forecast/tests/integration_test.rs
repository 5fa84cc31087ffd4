use cashflow_forecast::{CashflowForecaster, DataLoader, ForecastConfig, ForecastPoint};
use chrono::{Duration, NaiveDate};
use std::io::Write;
use tempfile::NamedTempFile;

// Ninety days of ledger rows with a weekly revenue pattern and monthly capex
fn create_sample_data() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "date,revenue,operating_expenses,capital_expenditures,net_cashflow,cash_balance"
    )
    .unwrap();

    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut balance = 250_000.0;
    for i in 0..90 {
        let date = start + Duration::days(i);
        let revenue = (if i % 7 < 5 { 12_000.0 } else { 4_000.0 }) + 20.0 * i as f64;
        let opex = 8_000.0;
        let capex = if i % 30 == 0 { 15_000.0 } else { 0.0 };
        let net = revenue - opex - capex;
        balance += net;
        writeln!(
            file,
            "{},{},{},{},{},{}",
            date, revenue, opex, capex, net, balance
        )
        .unwrap();
    }

    file
}

#[test]
fn test_full_forecast_workflow() {
    // 1. Load data
    let data_file = create_sample_data();
    let history = DataLoader::from_csv(data_file.path()).unwrap();
    assert_eq!(history.len(), 90);
    assert!(history.verify_ledger(1e-6).is_ok());

    // 2. Configure from JSON
    let config = ForecastConfig::from_json_str(
        r#"{ "horizon_days": 14, "forest": { "n_trees": 25 } }"#,
    )
    .unwrap();
    let horizon = config.horizon_days;

    // 3. Forecast
    let mut forecaster = CashflowForecaster::new(config).unwrap();
    let forecast = forecaster.predict(&history, horizon).unwrap();

    assert_eq!(forecast.horizons(), 14);
    assert_eq!(
        forecast.points()[0].date,
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    );

    // 4. Balances and serialisation
    let balances = forecast.projected_balances(history.last_balance().unwrap());
    assert_eq!(balances.len(), 14);
    assert!(balances.iter().all(|b| b.is_finite()));

    let json = forecast.to_json().unwrap();
    let points: Vec<ForecastPoint> = serde_json::from_str(&json).unwrap();
    assert_eq!(points, forecast.points());

    // 5. Held-out accuracy
    let accuracy = forecaster.evaluate_holdout().unwrap();
    assert!(accuracy.rmse.is_finite());
}
