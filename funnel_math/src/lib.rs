//! # Funnel Math
//!
//! Numeric building blocks used by the funnel forecasting crates.
//! This crate provides least-squares trend fitting, Holt smoothing,
//! a day-of-week seasonal profile, normal quantiles for uncertainty
//! bands, and forecast accuracy measures.

use thiserror::Error;

pub mod accuracy;
pub mod interval;
pub mod regression;
pub mod seasonal;
pub mod smoothing;

pub use accuracy::{forecast_accuracy, ForecastAccuracy};
pub use interval::normal_quantile;
pub use regression::{LinearFit, LinearRegression};
pub use seasonal::WeekdayProfile;
pub use smoothing::HoltSmoother;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;
