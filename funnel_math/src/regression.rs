//! Ordinary least squares fitting of a straight line
//!
//! Used for the trend component of daily forecasts and for the
//! conversions-versus-cost trendline.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Least squares estimator for `y = slope * x + intercept`
#[derive(Debug, Clone, Default)]
pub struct LinearRegression;

/// A fitted straight line together with the statistics needed for
/// prediction intervals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearFit {
    /// Slope of the fitted line
    pub slope: f64,
    /// Intercept of the fitted line
    pub intercept: f64,
    /// Number of observations used in the fit
    pub n: usize,
    /// Mean of the x values
    pub x_mean: f64,
    /// Sum of squared deviations of x from its mean
    pub sxx: f64,
    /// Residual sum of squares
    pub ss_residual: f64,
    /// Total sum of squares of y around its mean
    pub ss_total: f64,
}

impl LinearRegression {
    /// Create a new estimator
    pub fn new() -> Self {
        Self
    }

    /// Fit a line through `(x, y)` points.
    ///
    /// Fails when fewer than two points are given, when any coordinate is
    /// not finite, or when all x values coincide.
    pub fn fit(&self, points: &[(f64, f64)]) -> Result<LinearFit> {
        if points.len() < 2 {
            return Err(MathError::InsufficientData(format!(
                "Linear regression needs at least 2 points, got {}",
                points.len()
            )));
        }
        if points.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
            return Err(MathError::InvalidInput(
                "Regression input contains a non-finite value".to_string(),
            ));
        }

        let n = points.len() as f64;
        let x_mean = points.iter().map(|p| p.0).sum::<f64>() / n;
        let y_mean = points.iter().map(|p| p.1).sum::<f64>() / n;

        let mut sxy = 0.0;
        let mut sxx = 0.0;
        for &(x, y) in points {
            sxy += (x - x_mean) * (y - y_mean);
            sxx += (x - x_mean) * (x - x_mean);
        }

        if sxx.abs() < 1e-12 {
            return Err(MathError::CalculationError(
                "Cannot calculate slope: x values are too similar".to_string(),
            ));
        }

        let slope = sxy / sxx;
        let intercept = y_mean - slope * x_mean;

        let mut ss_residual = 0.0;
        let mut ss_total = 0.0;
        for &(x, y) in points {
            let predicted = slope * x + intercept;
            ss_residual += (y - predicted).powi(2);
            ss_total += (y - y_mean).powi(2);
        }

        Ok(LinearFit {
            slope,
            intercept,
            n: points.len(),
            x_mean,
            sxx,
            ss_residual,
            ss_total,
        })
    }
}

impl LinearFit {
    /// Value of the fitted line at `x`
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }

    /// Coefficient of determination. `None` when y is constant.
    pub fn r_squared(&self) -> Option<f64> {
        if self.ss_total.abs() < 1e-12 {
            None
        } else {
            Some(1.0 - self.ss_residual / self.ss_total)
        }
    }

    /// Multiplier on the residual standard error for a single new
    /// observation at `x`: `sqrt(1 + 1/n + (x - x̄)² / Sxx)`.
    pub fn prediction_factor(&self, x: f64) -> f64 {
        let n = self.n as f64;
        (1.0 + 1.0 / n + (x - self.x_mean).powi(2) / self.sxx).sqrt()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_perfect_line() {
        let points = vec![(0.0, 10.0), (1.0, 20.0), (2.0, 30.0)];
        let fit = LinearRegression::new().fit(&points).unwrap();

        assert_relative_eq!(fit.slope, 10.0, epsilon = 1e-9);
        assert_relative_eq!(fit.intercept, 10.0, epsilon = 1e-9);
        assert_relative_eq!(fit.predict(3.0), 40.0, epsilon = 1e-9);
        assert!(fit.r_squared().unwrap() > 0.999);
    }

    #[test]
    fn test_constant_series_has_no_r_squared() {
        let points: Vec<(f64, f64)> = (0..5).map(|i| (i as f64, 5.0)).collect();
        let fit = LinearRegression::new().fit(&points).unwrap();

        assert_eq!(fit.slope, 0.0);
        assert_eq!(fit.intercept, 5.0);
        assert_eq!(fit.r_squared(), None);
        assert_eq!(fit.ss_residual, 0.0);
    }

    #[test]
    fn test_prediction_factor_grows_away_from_mean() {
        let points: Vec<(f64, f64)> = (0..10).map(|i| (i as f64, i as f64)).collect();
        let fit = LinearRegression::new().fit(&points).unwrap();

        assert!(fit.prediction_factor(4.5) < fit.prediction_factor(20.0));
        assert!(fit.prediction_factor(20.0) < fit.prediction_factor(100.0));
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let lr = LinearRegression::new();
        assert!(matches!(
            lr.fit(&[(1.0, 2.0)]),
            Err(MathError::InsufficientData(_))
        ));
        assert!(matches!(
            lr.fit(&[(1.0, 2.0), (1.0, 3.0)]),
            Err(MathError::CalculationError(_))
        ));
        assert!(matches!(
            lr.fit(&[(0.0, f64::NAN), (1.0, 3.0)]),
            Err(MathError::InvalidInput(_))
        ));
    }
}
