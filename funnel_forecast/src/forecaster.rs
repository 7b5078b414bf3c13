//! Applies a forecast model to a daily series
//!
//! [`Forecaster`] owns the forecast contract shared by every model: the
//! minimum history, the horizon, the confidence band and the optional
//! zero floor. Models only need to answer [`TrainedForecastModel::predict`].

use crate::error::{ForecastError, Result};
use crate::models::{Forecast, ForecastModel, ForecastPoint, TrainedForecastModel};
use crate::series::DailySeries;
use chrono::{Days, NaiveDate};
use funnel_math::{forecast_accuracy, normal_quantile};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Settings shared by all models
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastOptions {
    /// Days to project past the last historical date
    pub horizon_days: usize,
    /// Fewest historical days accepted; values below 2 are treated as 2
    pub min_history_days: usize,
    /// Coverage of the uncertainty band
    pub confidence_level: f64,
    /// Prepend fitted values for the historical dates
    pub include_history: bool,
    /// Floor predictions and bounds at zero
    pub non_negative: bool,
}

impl Default for ForecastOptions {
    fn default() -> Self {
        Self {
            horizon_days: 120,
            min_history_days: 2,
            confidence_level: 0.80,
            include_history: false,
            non_negative: true,
        }
    }
}

/// Trains a model and projects it over the configured horizon
#[derive(Debug, Clone)]
pub struct Forecaster<M: ForecastModel> {
    model: M,
    options: ForecastOptions,
}

impl<M: ForecastModel> Forecaster<M> {
    /// Create a forecaster for `model`
    pub fn new(model: M, options: ForecastOptions) -> Self {
        Self { model, options }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn options(&self) -> &ForecastOptions {
        &self.options
    }

    /// Forecast raw `(date, value)` pairs.
    ///
    /// Fails with [`ForecastError::NonMonotonicInput`] when a date repeats.
    pub fn forecast_points(&self, points: Vec<(NaiveDate, f64)>) -> Result<Forecast> {
        self.forecast(&DailySeries::new(points)?)
    }

    /// Forecast `series` for `horizon_days` days past its last date.
    ///
    /// The returned forecast holds exactly `horizon_days` future points,
    /// dated consecutively from the day after the last historical date.
    pub fn forecast(&self, series: &DailySeries) -> Result<Forecast> {
        let options = &self.options;
        if options.horizon_days == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be at least 1 day".to_string(),
            ));
        }

        let required = options.min_history_days.max(2);
        let last_date = match series.last_date() {
            Some(date) if series.len() >= required => date,
            _ => {
                return Err(ForecastError::InsufficientData {
                    required,
                    actual: series.len(),
                })
            }
        };

        let horizon = u64::try_from(options.horizon_days).unwrap_or(u64::MAX);
        if last_date.checked_add_days(Days::new(horizon)).is_none() {
            return Err(ForecastError::InvalidParameter(format!(
                "Forecast horizon of {} days from {} passes the last representable date",
                options.horizon_days, last_date
            )));
        }

        let z = normal_quantile(options.confidence_level)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        let trained = self.model.train(series)?;

        let mut points = Vec::new();

        let mut fitted = Vec::with_capacity(series.len());
        for &(date, _) in series.points() {
            fitted.push(trained.predict(date).value);
            if options.include_history {
                points.push(self.project(&trained, date, z, true));
            }
        }

        let mut date = last_date;
        for _ in 0..options.horizon_days {
            date = date.succ_opt().ok_or_else(|| {
                ForecastError::InvalidParameter(format!("No calendar date follows {}", date))
            })?;
            points.push(self.project(&trained, date, z, false));
        }

        let in_sample_accuracy = forecast_accuracy(&fitted, &series.values()).ok();
        if let Some(accuracy) = &in_sample_accuracy {
            debug!(
                model = trained.name(),
                mae = accuracy.mae,
                rmse = accuracy.rmse,
                "in-sample accuracy"
            );
        }

        info!(
            model = trained.name(),
            history_days = series.len(),
            horizon_days = options.horizon_days,
            %last_date,
            "forecast complete"
        );

        Ok(Forecast {
            model: trained.name().to_string(),
            last_history_date: last_date,
            confidence_level: options.confidence_level,
            points,
            in_sample_accuracy,
        })
    }

    fn project(
        &self,
        trained: &M::Trained,
        date: NaiveDate,
        z: f64,
        in_sample: bool,
    ) -> ForecastPoint {
        let prediction = trained.predict(date);
        let half_width = z * prediction.std_error;
        let mut point = ForecastPoint {
            date,
            predicted: prediction.value,
            lower: prediction.value - half_width,
            upper: prediction.value + half_width,
            in_sample,
        };

        if self.options.non_negative {
            // max(0, .) is monotone so lower <= predicted <= upper still holds
            point.predicted = point.predicted.max(0.0);
            point.lower = point.lower.max(0.0);
            point.upper = point.upper.max(0.0);
        }
        point
    }
}
