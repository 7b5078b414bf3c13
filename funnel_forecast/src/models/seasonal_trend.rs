//! Linear trend with an additive day-of-week profile

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, Prediction, TrainedForecastModel};
use crate::series::DailySeries;
use chrono::{Datelike, NaiveDate, Weekday};
use funnel_math::{LinearFit, LinearRegression, WeekdayProfile};
use std::collections::HashSet;
use tracing::debug;

/// Default number of calendar days of history before weekly seasonality is fit
pub const DEFAULT_WEEKLY_MIN_DAYS: i64 = 14;

const MAX_BACKFIT_ROUNDS: usize = 50;

/// Trend-plus-weekly-seasonality model.
///
/// The trend is an ordinary least squares line over the day offset from the
/// first date, so gaps in the series keep their true spacing. The weekly
/// profile is the centered mean residual per weekday, fitted jointly with
/// the trend once the history spans at least two weeks.
#[derive(Debug, Clone)]
pub struct SeasonalTrend {
    /// Name of the model
    name: String,
    /// Whether weekly seasonality may be fit
    weekly: bool,
    /// Calendar span required before the weekly profile is fit
    weekly_min_days: i64,
}

/// Trained seasonal trend model
#[derive(Debug, Clone)]
pub struct TrainedSeasonalTrend {
    name: String,
    first_date: NaiveDate,
    trend: LinearFit,
    profile: WeekdayProfile,
    /// Residual standard error
    sigma: f64,
}

impl SeasonalTrend {
    /// Trend with weekly seasonality
    pub fn new() -> Self {
        Self {
            name: "Seasonal Trend (weekly)".to_string(),
            weekly: true,
            weekly_min_days: DEFAULT_WEEKLY_MIN_DAYS,
        }
    }

    /// Trend only
    pub fn trend_only() -> Self {
        Self {
            name: "Seasonal Trend (trend only)".to_string(),
            weekly: false,
            weekly_min_days: DEFAULT_WEEKLY_MIN_DAYS,
        }
    }

    /// Change the span of history required for weekly seasonality
    pub fn with_weekly_min_days(mut self, days: i64) -> Result<Self> {
        if days < 7 {
            return Err(ForecastError::InvalidParameter(format!(
                "Weekly seasonality needs at least 7 days of span, got {}",
                days
            )));
        }
        self.weekly_min_days = days;
        Ok(self)
    }
}

impl Default for SeasonalTrend {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastModel for SeasonalTrend {
    type Trained = TrainedSeasonalTrend;

    fn train(&self, series: &DailySeries) -> Result<Self::Trained> {
        let first_date = match series.first_date() {
            Some(date) if series.len() >= 2 => date,
            _ => {
                return Err(ForecastError::InsufficientData {
                    required: 2,
                    actual: series.len(),
                })
            }
        };

        let offset = |date: NaiveDate| (date - first_date).num_days() as f64;
        let seasonal = self.weekly && series.span_days() >= self.weekly_min_days;

        // Backfitting: alternate the trend fit on deseasonalized values with
        // the profile fit on detrended values until the slope settles
        let regression = LinearRegression::new();
        let mut profile = WeekdayProfile::flat();
        let mut trend = fit_trend(&regression, series, &profile, offset)?;
        if seasonal {
            for _ in 0..MAX_BACKFIT_ROUNDS {
                let residuals: Vec<(Weekday, f64)> = series
                    .points()
                    .iter()
                    .map(|&(date, value)| (date.weekday(), value - trend.predict(offset(date))))
                    .collect();
                profile = WeekdayProfile::estimate(&residuals);

                let refit = fit_trend(&regression, series, &profile, offset)?;
                let settled = (refit.slope - trend.slope).abs() < 1e-12;
                trend = refit;
                if settled {
                    break;
                }
            }
        }

        // Two trend parameters plus one per observed weekday beyond the first
        let seasonal_params = if seasonal {
            let observed: HashSet<Weekday> =
                series.points().iter().map(|(d, _)| d.weekday()).collect();
            observed.len().saturating_sub(1)
        } else {
            0
        };
        let dof = series.len().saturating_sub(2 + seasonal_params).max(1);

        let ss_error: f64 = series
            .points()
            .iter()
            .map(|&(date, value)| {
                let fitted = trend.predict(offset(date)) + profile.effect(date.weekday());
                (value - fitted).powi(2)
            })
            .sum();
        let sigma = (ss_error / dof as f64).sqrt();

        debug!(
            model = %self.name,
            n = series.len(),
            slope = trend.slope,
            intercept = trend.intercept,
            seasonal,
            sigma,
            "trained seasonal trend model"
        );

        Ok(TrainedSeasonalTrend {
            name: self.name.clone(),
            first_date,
            trend,
            profile,
            sigma,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Least squares trend of the series with the weekday profile removed
fn fit_trend<F>(
    regression: &LinearRegression,
    series: &DailySeries,
    profile: &WeekdayProfile,
    offset: F,
) -> Result<LinearFit>
where
    F: Fn(NaiveDate) -> f64,
{
    let xy: Vec<(f64, f64)> = series
        .points()
        .iter()
        .map(|&(date, value)| (offset(date), value - profile.effect(date.weekday())))
        .collect();
    Ok(regression.fit(&xy)?)
}

impl TrainedSeasonalTrend {
    /// Slope of the trend in units per day
    pub fn slope(&self) -> f64 {
        self.trend.slope
    }

    pub fn profile(&self) -> &WeekdayProfile {
        &self.profile
    }

    pub fn residual_std(&self) -> f64 {
        self.sigma
    }
}

impl TrainedForecastModel for TrainedSeasonalTrend {
    fn predict(&self, date: NaiveDate) -> Prediction {
        let x = (date - self.first_date).num_days() as f64;
        Prediction {
            value: self.trend.predict(x) + self.profile.effect(date.weekday()),
            std_error: self.sigma * self.trend.prediction_factor(x),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
