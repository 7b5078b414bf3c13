use approx::assert_relative_eq;
use chrono::{Duration, NaiveDate};
use funnel_forecast::models::holt::HoltLinear;
use funnel_forecast::models::seasonal_trend::SeasonalTrend;
use funnel_forecast::{DailySeries, ForecastError, ForecastOptions, Forecaster};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 9, 4).unwrap()
}

fn series_of(values: &[f64]) -> DailySeries {
    let points = values
        .iter()
        .enumerate()
        .map(|(d, v)| (start() + Duration::days(d as i64), *v))
        .collect();
    DailySeries::new(points).unwrap()
}

fn noisy(days: usize) -> DailySeries {
    let values: Vec<f64> = (0..days)
        .map(|d| 30.0 + 0.2 * d as f64 + [3.0, -1.0, 2.0, -4.0, 0.5][d % 5])
        .collect();
    series_of(&values)
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(120)]
fn test_horizon_law(#[case] horizon: usize) {
    let options = ForecastOptions {
        horizon_days: horizon,
        ..ForecastOptions::default()
    };
    let series = noisy(45);
    let forecast = Forecaster::new(SeasonalTrend::new(), options)
        .forecast(&series)
        .unwrap();

    let last = series.last_date().unwrap();
    assert_eq!(forecast.future().len(), horizon);
    for (i, point) in forecast.future().iter().enumerate() {
        assert_eq!(point.date, last + Duration::days(i as i64 + 1));
        assert!(!point.in_sample);
        assert!(point.lower <= point.predicted && point.predicted <= point.upper);
    }
}

#[test]
fn test_default_horizon_is_120_days() {
    let forecast = Forecaster::new(SeasonalTrend::new(), ForecastOptions::default())
        .forecast(&noisy(30))
        .unwrap();
    assert_eq!(forecast.horizon(), 120);
    assert_eq!(forecast.confidence_level, 0.80);
}

#[test]
fn test_single_day_is_insufficient() {
    let result = Forecaster::new(SeasonalTrend::new(), ForecastOptions::default())
        .forecast(&series_of(&[4.0]));
    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData {
            required: 2,
            actual: 1
        })
    ));
}

#[test]
fn test_configured_min_history() {
    let options = ForecastOptions {
        min_history_days: 10,
        ..ForecastOptions::default()
    };
    let result = Forecaster::new(SeasonalTrend::new(), options).forecast(&noisy(9));
    assert!(matches!(
        result,
        Err(ForecastError::InsufficientData {
            required: 10,
            actual: 9
        })
    ));
}

#[test]
fn test_duplicate_dates_rejected() {
    let day = start();
    let forecaster = Forecaster::new(SeasonalTrend::new(), ForecastOptions::default());
    let result = forecaster.forecast_points(vec![
        (day, 1.0),
        (day + Duration::days(1), 2.0),
        (day, 3.0),
    ]);
    assert!(matches!(
        result,
        Err(ForecastError::NonMonotonicInput { date }) if date == day
    ));
}

#[test]
fn test_constant_series_has_flat_band() {
    let options = ForecastOptions {
        horizon_days: 10,
        ..ForecastOptions::default()
    };
    let forecast = Forecaster::new(SeasonalTrend::new(), options)
        .forecast(&series_of(&[5.0; 30]))
        .unwrap();

    assert_eq!(forecast.future().len(), 10);
    for point in forecast.future() {
        assert_relative_eq!(point.predicted, 5.0, epsilon = 1e-9);
        assert!(point.lower <= 5.0 + 1e-9 && 5.0 - 1e-9 <= point.upper);
    }
}

#[test]
fn test_include_history() {
    let options = ForecastOptions {
        horizon_days: 14,
        include_history: true,
        ..ForecastOptions::default()
    };
    let series = noisy(21);
    let forecast = Forecaster::new(SeasonalTrend::new(), options)
        .forecast(&series)
        .unwrap();

    assert_eq!(forecast.points.len(), 35);
    assert_eq!(forecast.in_sample().len(), 21);
    assert_eq!(forecast.future().len(), 14);
    assert!(forecast.in_sample().iter().all(|p| p.in_sample));
    assert_eq!(forecast.in_sample()[0].date, start());
    assert_eq!(forecast.last_history_date, series.last_date().unwrap());
}

#[test]
fn test_wider_band_at_higher_confidence() {
    let series = noisy(40);
    let at = |level: f64| {
        let options = ForecastOptions {
            horizon_days: 5,
            confidence_level: level,
            non_negative: false,
            ..ForecastOptions::default()
        };
        let forecast = Forecaster::new(SeasonalTrend::new(), options)
            .forecast(&series)
            .unwrap();
        let p = forecast.future()[0];
        p.upper - p.lower
    };
    assert!(at(0.95) > at(0.80));
}

#[test]
fn test_band_widens_with_horizon() {
    let options = ForecastOptions {
        non_negative: false,
        ..ForecastOptions::default()
    };
    let forecast = Forecaster::new(HoltLinear::new(0.4, 0.2).unwrap(), options)
        .forecast(&noisy(40))
        .unwrap();
    let future = forecast.future();
    let width = |i: usize| future[i].upper - future[i].lower;
    assert!(width(0) < width(10));
    assert!(width(10) < width(60));
}

#[test]
fn test_gaps_keep_calendar_spacing() {
    // Every other day observed, rising by 2 per observation
    let points = (0..20)
        .map(|i| (start() + Duration::days(2 * i), 10.0 + 2.0 * i as f64))
        .collect();
    let options = ForecastOptions {
        horizon_days: 2,
        ..ForecastOptions::default()
    };
    let forecast = Forecaster::new(SeasonalTrend::trend_only(), options)
        .forecast_points(points)
        .unwrap();

    // Slope is one per calendar day
    assert_relative_eq!(forecast.future()[0].predicted, 49.0, epsilon = 1e-9);
    assert_relative_eq!(forecast.future()[1].predicted, 50.0, epsilon = 1e-9);
}

#[test]
fn test_in_sample_accuracy_reported() {
    let forecast = Forecaster::new(SeasonalTrend::trend_only(), ForecastOptions::default())
        .forecast(&series_of(&[1.0, 2.0, 3.0, 4.0, 5.0]))
        .unwrap();
    let accuracy = forecast.in_sample_accuracy.unwrap();
    assert_relative_eq!(accuracy.mae, 0.0, epsilon = 1e-9);
    assert_relative_eq!(accuracy.rmse, 0.0, epsilon = 1e-9);
}
