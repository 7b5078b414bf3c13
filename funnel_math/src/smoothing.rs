//! Holt's linear (double exponential) smoothing

use crate::{MathError, Result};

/// Streaming double exponential smoothing with level and trend.
///
/// Besides the level and trend, the smoother keeps the squared one-step-ahead
/// errors it has seen so callers can size an uncertainty band.
#[derive(Debug, Clone)]
pub struct HoltSmoother {
    alpha: f64,
    beta: f64,
    level: Option<f64>,
    trend: Option<f64>,
    values_seen: usize,
    sum_squared_error: f64,
    errors_seen: usize,
}

impl HoltSmoother {
    /// Create a new smoother with level weight `alpha` and trend weight `beta`
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        if alpha <= 0.0 || alpha >= 1.0 {
            return Err(MathError::InvalidInput(
                "Alpha must be between 0 and 1 (exclusive)".to_string(),
            ));
        }
        if beta <= 0.0 || beta >= 1.0 {
            return Err(MathError::InvalidInput(
                "Beta must be between 0 and 1 (exclusive)".to_string(),
            ));
        }

        Ok(Self {
            alpha,
            beta,
            level: None,
            trend: None,
            values_seen: 0,
            sum_squared_error: 0.0,
            errors_seen: 0,
        })
    }

    /// Feed the next observation
    pub fn update(&mut self, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(MathError::InvalidInput(
                "Cannot smooth a non-finite value".to_string(),
            ));
        }
        self.values_seen += 1;

        match (self.level, self.trend) {
            (None, _) => {
                self.level = Some(value);
            }
            (Some(first), None) => {
                // Second observation seeds the trend; no forecast existed to score
                self.level = Some(value);
                self.trend = Some(value - first);
            }
            (Some(prev_level), Some(prev_trend)) => {
                let expected = prev_level + prev_trend;
                self.sum_squared_error += (value - expected).powi(2);
                self.errors_seen += 1;

                let level = self.alpha * value + (1.0 - self.alpha) * expected;
                let trend = self.beta * (level - prev_level) + (1.0 - self.beta) * prev_trend;
                self.level = Some(level);
                self.trend = Some(trend);
            }
        }

        Ok(())
    }

    /// Forecast `h` steps past the last observation
    pub fn forecast(&self, h: usize) -> Result<f64> {
        Ok(self.level()? + (h as f64) * self.trend()?)
    }

    /// Current level
    pub fn level(&self) -> Result<f64> {
        self.level.ok_or_else(|| {
            MathError::InsufficientData("Level not calculated yet".to_string())
        })
    }

    /// Current trend
    pub fn trend(&self) -> Result<f64> {
        self.trend.ok_or_else(|| {
            MathError::InsufficientData("Trend needs at least 2 observations".to_string())
        })
    }

    /// Root mean squared one-step-ahead error, zero before any error is seen
    pub fn residual_std(&self) -> f64 {
        if self.errors_seen == 0 {
            0.0
        } else {
            (self.sum_squared_error / self.errors_seen as f64).sqrt()
        }
    }

    /// Number of observations fed so far
    pub fn values_seen(&self) -> usize {
        self.values_seen
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }
}
