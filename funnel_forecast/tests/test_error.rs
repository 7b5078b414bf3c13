use chrono::NaiveDate;
use funnel_forecast::ForecastError;
use funnel_math::MathError;
use funnel_metrics::MetricsError;
use std::io;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    match ForecastError::from(io_error) {
        ForecastError::Io(_) => {}
        other => panic!("Expected Io variant, got {:?}", other),
    }

    let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    match ForecastError::from(json_error) {
        ForecastError::Json(_) => {}
        other => panic!("Expected Json variant, got {:?}", other),
    }

    let math_error = MathError::InsufficientData("two points".to_string());
    match ForecastError::from(math_error) {
        ForecastError::Math(MathError::InsufficientData(_)) => {}
        other => panic!("Expected Math variant, got {:?}", other),
    }

    let schema_error = MetricsError::Schema { field: "date" };
    match ForecastError::from(schema_error) {
        ForecastError::Metrics(MetricsError::Schema { field }) => assert_eq!(field, "date"),
        other => panic!("Expected Metrics variant, got {:?}", other),
    }
}

#[test]
fn test_error_display() {
    let error = ForecastError::InsufficientData {
        required: 2,
        actual: 1,
    };
    let text = error.to_string();
    assert!(text.contains("at least 2"));
    assert!(text.contains("got 1"));

    let date = NaiveDate::from_ymd_opt(2023, 10, 17).unwrap();
    let error = ForecastError::NonMonotonicInput { date };
    assert!(error.to_string().contains("2023-10-17"));

    let error = ForecastError::from(MetricsError::Schema { field: "cost" });
    let text = error.to_string();
    assert!(text.contains("Metrics error"));
    assert!(text.contains("'cost'"));
}
