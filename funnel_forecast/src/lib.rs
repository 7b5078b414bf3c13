//! # Funnel Forecast
//!
//! Forecasting of daily advertising-funnel metrics.
//!
//! ## Features
//!
//! - Daily series extraction from [`funnel_metrics::DailyAggregate`]s
//! - Forecasting models (seasonal trend, Holt linear smoothing)
//! - Uncertainty bands at a configurable confidence level
//! - One parameterized pipeline: filter → aggregate → summarize → forecast
//!
//! ## Quick Start
//!
//! ```
//! use chrono::{Duration, NaiveDate};
//! use funnel_forecast::{DailySeries, ForecastOptions, Forecaster};
//! use funnel_forecast::models::seasonal_trend::SeasonalTrend;
//!
//! let start = NaiveDate::from_ymd_opt(2023, 9, 1).unwrap();
//! let points = (0..30).map(|d| (start + Duration::days(d), 5.0)).collect();
//! let series = DailySeries::new(points)?;
//!
//! let options = ForecastOptions { horizon_days: 10, ..ForecastOptions::default() };
//! let forecast = Forecaster::new(SeasonalTrend::new(), options).forecast(&series)?;
//!
//! assert_eq!(forecast.future().len(), 10);
//! for point in forecast.future() {
//!     assert!(point.lower <= 5.0 && 5.0 <= point.upper);
//! }
//! # Ok::<(), funnel_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod error;
pub mod forecaster;
pub mod models;
pub mod pipeline;
pub mod series;

// Re-export commonly used types
pub use crate::config::{MissingDays, ModelConfig, PipelineConfig};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{ForecastOptions, Forecaster};
pub use crate::models::{Forecast, ForecastModel, ForecastPoint, TrainedForecastModel};
pub use crate::pipeline::{Pipeline, PipelineOutput};
pub use crate::series::DailySeries;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
