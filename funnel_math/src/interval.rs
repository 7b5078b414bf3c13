//! Normal quantiles for symmetric uncertainty bands

use crate::{MathError, Result};
use statrs::distribution::{ContinuousCDF, Normal};

/// Two-sided standard normal quantile for a confidence level in (0, 1).
///
/// `normal_quantile(0.95)` is about 1.96.
pub fn normal_quantile(confidence_level: f64) -> Result<f64> {
    if !(confidence_level > 0.0 && confidence_level < 1.0) {
        return Err(MathError::InvalidInput(format!(
            "Confidence level must be between 0 and 1, got {}",
            confidence_level
        )));
    }

    let standard = Normal::new(0.0, 1.0)
        .map_err(|e| MathError::CalculationError(e.to_string()))?;
    Ok(standard.inverse_cdf(0.5 + confidence_level / 2.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0.80, 1.2816)]
    #[case(0.90, 1.6449)]
    #[case(0.95, 1.9600)]
    #[case(0.99, 2.5758)]
    fn test_known_quantiles(#[case] level: f64, #[case] expected: f64) {
        assert_abs_diff_eq!(normal_quantile(level).unwrap(), expected, epsilon = 1e-3);
    }

    #[rstest]
    #[case(0.0)]
    #[case(1.0)]
    #[case(-0.5)]
    #[case(f64::NAN)]
    fn test_rejects_out_of_range(#[case] level: f64) {
        assert!(normal_quantile(level).is_err());
    }
}
