use cashflow_forecast::config::ForecastConfig;
use cashflow_forecast::data::{CashflowHistory, FinancialRecord};
use cashflow_forecast::error::ForecastError;
use cashflow_forecast::models::cashflow::CashflowForecaster;
use cashflow_forecast::models::random_forest::ForestConfig;
use chrono::{Duration, NaiveDate};
use rstest::rstest;

fn quick_config() -> ForecastConfig {
    ForecastConfig {
        forest: ForestConfig {
            n_trees: 20,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// Daily ledger whose net cash flow is `first_net + step * i`
fn linear_history(n: usize, first_net: f64, step: f64) -> CashflowHistory {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let flows: Vec<(f64, f64, f64)> = (0..n)
        .map(|i| (first_net + step * i as f64 + 500.0, 500.0, 0.0))
        .collect();
    CashflowHistory::from_daily_flows(start, 50_000.0, &flows).unwrap()
}

fn seasonal_history(n: usize) -> CashflowHistory {
    let start = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
    let flows: Vec<(f64, f64, f64)> = (0..n)
        .map(|i| {
            let weekly = (i as f64 * std::f64::consts::TAU / 7.0).sin() * 800.0;
            (10_000.0 + weekly + 10.0 * i as f64, 7_500.0, if i % 30 == 0 { 2_000.0 } else { 0.0 })
        })
        .collect();
    CashflowHistory::from_daily_flows(start, 100_000.0, &flows).unwrap()
}

#[test]
fn test_identical_training_gives_identical_forecasts() {
    let history = seasonal_history(90);

    let mut first = CashflowForecaster::new(quick_config()).unwrap();
    let mut second = CashflowForecaster::new(quick_config()).unwrap();

    assert_eq!(
        first.predict(&history, 14).unwrap(),
        second.predict(&history, 14).unwrap()
    );
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(30)]
#[case(120)]
fn test_forecast_has_one_row_per_day(#[case] horizon: usize) {
    let history = seasonal_history(60);
    let mut forecaster = CashflowForecaster::new(quick_config()).unwrap();

    let forecast = forecaster.predict(&history, horizon).unwrap();

    assert_eq!(forecast.horizons(), horizon);
    let dates = forecast.dates();
    assert_eq!(dates[0], history.last_date() + Duration::days(1));
    for pair in dates.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::days(1));
    }
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_constant_columns_train_and_predict_finite() {
    // Expenses and capex never change
    let history = linear_history(45, 200.0, 0.0);
    let mut forecaster = CashflowForecaster::new(quick_config()).unwrap();

    let model = forecaster.train(&history, 5).unwrap();
    assert!(model.scaler().scales().iter().all(|&s| s > 0.0));

    let forecast = forecaster.predict(&history, 5).unwrap();
    for value in forecast.values() {
        assert!(value.is_finite());
        assert!((value - 200.0).abs() < 1e-6);
    }
}

#[test]
fn test_empty_history_is_a_data_error() {
    let mut forecaster = CashflowForecaster::new(quick_config()).unwrap();
    let empty: Vec<FinancialRecord> = Vec::new();

    assert!(matches!(
        forecaster.train(&empty, 30),
        Err(ForecastError::DataError(_))
    ));
    assert!(matches!(
        forecaster.predict(&empty, 30),
        Err(ForecastError::DataError(_))
    ));
    assert!(!forecaster.is_trained());
}

#[test]
fn test_linear_growth_forecast_stays_in_range() {
    let history = linear_history(30, 1000.0, 100.0);
    let last = history[29].net_cashflow.unwrap();
    assert_eq!(last, 3900.0);

    let mut forecaster = CashflowForecaster::new(ForecastConfig::default()).unwrap();
    let forecast = forecaster.predict(&history, 10).unwrap();

    assert_eq!(forecast.horizons(), 10);
    for value in forecast.values() {
        assert!(value.is_finite());
        assert!(value > last / 10.0 && value < last * 10.0, "{}", value);
    }
}

#[test]
fn test_three_records_with_long_horizon() {
    let history = linear_history(3, 1000.0, 250.0);
    let mut forecaster = CashflowForecaster::new(quick_config()).unwrap();

    let model = forecaster.train(&history, 30).unwrap();
    assert_eq!(model.trained_rows(), 2);

    // Every target is the last known net cash flow
    let forecast = forecaster.predict(&history, 30).unwrap();
    assert_eq!(forecast.horizons(), 30);
    for value in forecast.values() {
        assert!((value - 1500.0).abs() < 1e-6);
    }
}

#[test]
fn test_unseen_quarter_in_horizon() {
    // Trained on Q1 only; the horizon runs into Q2
    let history = linear_history(80, 500.0, 5.0);
    let mut forecaster = CashflowForecaster::new(quick_config()).unwrap();

    let forecast = forecaster.predict(&history, 60).unwrap();

    assert_eq!(forecaster.trained().unwrap().quarters().quarters(), &[1]);
    assert!(forecast.values().iter().all(|v| v.is_finite()));
}

#[test]
fn test_unordered_history_is_rejected() {
    let mut records = linear_history(5, 100.0, 1.0).into_records();
    records.swap(1, 3);

    let mut forecaster = CashflowForecaster::new(quick_config()).unwrap();
    assert!(matches!(
        forecaster.predict(&records, 3),
        Err(ForecastError::DataError(_))
    ));
}

#[test]
fn test_holdout_evaluation() {
    let history = seasonal_history(120);
    let mut forecaster = CashflowForecaster::new(quick_config()).unwrap();
    forecaster.train(&history, 7).unwrap();

    let accuracy = forecaster.evaluate_holdout().unwrap();
    assert!(accuracy.mae >= 0.0);
    assert!((accuracy.rmse * accuracy.rmse - accuracy.mse).abs() < 1e-6 * accuracy.mse.max(1.0));

    let ranking = forecaster.trained().unwrap().feature_importance_ranking();
    assert_eq!(ranking.len(), forecaster.trained().unwrap().feature_names().len());
}
