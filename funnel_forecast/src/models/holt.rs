//! Holt linear smoothing model for daily series

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, Prediction, TrainedForecastModel};
use crate::series::DailySeries;
use chrono::NaiveDate;
use funnel_math::HoltSmoother;
use tracing::debug;

/// Double exponential smoothing over consecutive observations.
///
/// Observations are treated as equally spaced steps, so the series should be
/// gap free (see [`MissingDays::Zero`](crate::MissingDays::Zero)). Future
/// steps are counted in days past the last observation.
#[derive(Debug, Clone)]
pub struct HoltLinear {
    /// Name of the model
    name: String,
    /// Level smoothing parameter
    alpha: f64,
    /// Trend smoothing parameter
    beta: f64,
}

/// Trained Holt linear model
#[derive(Debug, Clone)]
pub struct TrainedHoltLinear {
    name: String,
    last_date: NaiveDate,
    level: f64,
    trend: f64,
    /// Root mean squared one-step-ahead error
    sigma: f64,
    /// One-step-ahead fitted values for the history
    fitted: Vec<(NaiveDate, f64)>,
}

impl HoltLinear {
    /// Create a new Holt model
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        HoltSmoother::new(alpha, beta)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

        Ok(Self {
            name: format!("Holt Linear (alpha={}, beta={})", alpha, beta),
            alpha,
            beta,
        })
    }
}

impl ForecastModel for HoltLinear {
    type Trained = TrainedHoltLinear;

    fn train(&self, series: &DailySeries) -> Result<Self::Trained> {
        let last_date = match series.last_date() {
            Some(date) if series.len() >= 2 => date,
            _ => {
                return Err(ForecastError::InsufficientData {
                    required: 2,
                    actual: series.len(),
                })
            }
        };

        let mut smoother = HoltSmoother::new(self.alpha, self.beta)?;
        let mut fitted = Vec::with_capacity(series.len());
        for &(date, value) in series.points() {
            // Before a trend exists the best guess is the last level
            let expected = smoother
                .forecast(1)
                .or_else(|_| smoother.level())
                .unwrap_or(value);
            fitted.push((date, expected));
            smoother.update(value)?;
        }

        let trained = TrainedHoltLinear {
            name: self.name.clone(),
            last_date,
            level: smoother.level()?,
            trend: smoother.trend()?,
            sigma: smoother.residual_std(),
            fitted,
        };

        debug!(
            model = %self.name,
            n = series.len(),
            level = trained.level,
            trend = trained.trend,
            sigma = trained.sigma,
            "trained holt model"
        );

        Ok(trained)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedForecastModel for TrainedHoltLinear {
    fn predict(&self, date: NaiveDate) -> Prediction {
        if date > self.last_date {
            let h = (date - self.last_date).num_days() as f64;
            return Prediction {
                value: self.level + h * self.trend,
                std_error: self.sigma * h.sqrt(),
            };
        }

        // Historical dates use the fitted value at or before them
        let idx = self.fitted.partition_point(|(d, _)| *d <= date);
        let value = match idx {
            0 => self.fitted.first().map(|(_, v)| *v).unwrap_or(self.level),
            i => self.fitted[i - 1].1,
        };
        Prediction {
            value,
            std_error: self.sigma,
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
