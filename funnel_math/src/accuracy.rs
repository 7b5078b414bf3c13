//! Forecast accuracy measures

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(MathError::InvalidInput(
            "Forecast and actual values must have the same non-zero length".to_string(),
        ));
    }

    let n = forecast.len() as f64;

    let errors: Vec<f64> = forecast
        .iter()
        .zip(actual.iter())
        .map(|(&f, &a)| a - f)
        .collect();

    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;
    let rmse = mse.sqrt();

    // Days with a zero actual have no percentage error
    let percentage_errors: Vec<f64> = actual
        .iter()
        .zip(errors.iter())
        .filter(|(&a, _)| a != 0.0)
        .map(|(&a, &e)| (e.abs() / a.abs()) * 100.0)
        .collect();
    let mape = if percentage_errors.is_empty() {
        None
    } else {
        Some(percentage_errors.iter().sum::<f64>() / percentage_errors.len() as f64)
    };

    let smape = actual
        .iter()
        .zip(forecast.iter())
        .map(|(&a, &f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                200.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse,
        mape,
        smape,
    })
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error over days with a non-zero actual
    pub mape: Option<f64>,
    /// Symmetric Mean Absolute Percentage Error
    pub smape: f64,
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        match self.mape {
            Some(mape) => writeln!(f, "  MAPE:  {:.4}%", mape)?,
            None => writeln!(f, "  MAPE:  N/A")?,
        }
        writeln!(f, "  SMAPE: {:.4}%", self.smape)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_regression_metrics() {
        let actual = vec![10.0, 20.0, 30.0, 40.0, 50.0];
        let predicted = vec![12.0, 18.0, 33.0, 37.0, 52.0];

        let acc = forecast_accuracy(&predicted, &actual).unwrap();
        assert_relative_eq!(acc.mae, 2.4, epsilon = 1e-9);
        assert_relative_eq!(acc.mse, 6.0, epsilon = 1e-9);
        assert_relative_eq!(acc.rmse, 6.0_f64.sqrt(), epsilon = 1e-9);
        assert!(acc.mape.unwrap() > 0.0);
        assert!(acc.smape > 0.0);
    }

    #[test]
    fn test_all_zero_actuals_have_no_mape() {
        let acc = forecast_accuracy(&[0.0, 1.0], &[0.0, 0.0]).unwrap();
        assert_eq!(acc.mape, None);
        assert!(acc.to_string().contains("MAPE:  N/A"));
    }

    #[test]
    fn test_length_mismatch() {
        assert!(forecast_accuracy(&[1.0], &[1.0, 2.0]).is_err());
        assert!(forecast_accuracy(&[], &[]).is_err());
    }
}
