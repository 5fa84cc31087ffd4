use cashflow_forecast::config::ForecastConfig;
use cashflow_forecast::error::ForecastError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(
        ForecastError::from(io_error),
        ForecastError::IoError(_)
    ));

    let json_error = serde_json::from_str::<ForecastConfig>("{").unwrap_err();
    assert!(matches!(
        ForecastError::from(json_error),
        ForecastError::JsonError(_)
    ));

    let math_error = fin_math::MathError::InsufficientData("no values".to_string());
    assert!(matches!(
        ForecastError::from(math_error),
        ForecastError::DataError(_)
    ));

    let math_error = fin_math::MathError::InvalidInput("window is zero".to_string());
    assert!(matches!(
        ForecastError::from(math_error),
        ForecastError::InvalidParameter(_)
    ));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InvalidParameter("horizon_days must be at least 1".to_string());
    assert_eq!(
        error.to_string(),
        "Invalid parameter: horizon_days must be at least 1"
    );

    assert_eq!(
        ForecastError::ModelNotTrained.to_string(),
        "Model has not been trained"
    );

    let io_error = io::Error::new(io::ErrorKind::PermissionDenied, "permission denied");
    let error_string = ForecastError::from(io_error).to_string();
    assert!(error_string.contains("IO error"));
    assert!(error_string.contains("permission denied"));
}

#[test]
fn test_missing_config_file() {
    assert!(matches!(
        ForecastConfig::from_json_file("/nonexistent/forecast.json"),
        Err(ForecastError::IoError(_))
    ));
}
