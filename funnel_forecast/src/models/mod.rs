//! Forecasting models and their output types

use crate::error::Result;
use crate::series::DailySeries;
use chrono::NaiveDate;
use funnel_math::ForecastAccuracy;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A model's estimate for one date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Point estimate
    pub value: f64,
    /// Standard error of a new observation on that date
    pub std_error: f64,
}

/// One projected day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted: f64,
    pub lower: f64,
    pub upper: f64,
    /// Whether the date lies within the training history
    pub in_sample: bool,
}

/// Result of a forecast operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Name of the model that produced the forecast
    pub model: String,
    /// Last date of the training history
    pub last_history_date: NaiveDate,
    /// Coverage of the `lower..=upper` band
    pub confidence_level: f64,
    /// Points in ascending date order, in-sample points first
    pub points: Vec<ForecastPoint>,
    /// Fit quality on the training history
    pub in_sample_accuracy: Option<ForecastAccuracy>,
}

impl Forecast {
    fn split_index(&self) -> usize {
        self.points
            .partition_point(|p| p.date <= self.last_history_date)
    }

    /// Points dated strictly after the last historical date
    pub fn future(&self) -> &[ForecastPoint] {
        &self.points[self.split_index()..]
    }

    /// Fitted points for historical dates (empty unless requested)
    pub fn in_sample(&self) -> &[ForecastPoint] {
        &self.points[..self.split_index()]
    }

    /// Number of forecasted days past the history
    pub fn horizon(&self) -> usize {
        self.future().len()
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Estimate for any date, historical or future
    fn predict(&self, date: NaiveDate) -> Prediction;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a daily series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a daily series
    fn train(&self, series: &DailySeries) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}

pub mod holt;
pub mod seasonal_trend;
