//! Error types for the funnel_forecast crate

use chrono::NaiveDate;
use funnel_math::MathError;
use funnel_metrics::MetricsError;
use thiserror::Error;

/// Custom error types for the funnel_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Too few historical days to fit a trend
    #[error("Insufficient data: need at least {required} days of history, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The same date appears more than once in a series
    #[error("Non-monotonic input: date {date} appears more than once")]
    NonMonotonicInput { date: NaiveDate },

    /// A series value that is NaN or infinite
    #[error("Invalid value {value} on {date}")]
    InvalidValue { date: NaiveDate, value: f64 },

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Configuration that fails validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a numeric routine
    #[error("Math error: {0}")]
    Math(#[from] MathError),

    /// Error from ingestion or aggregation
    #[error("Metrics error: {0}")]
    Metrics(#[from] MetricsError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from JSON parsing
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;
