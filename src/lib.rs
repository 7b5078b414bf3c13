//! # Funnel Cast
//!
//! Daily advertising-funnel aggregation and forecasting.
//!
//! The workspace is split into three crates, re-exported here:
//!
//! - [`math`]: least squares, Holt smoothing, weekday profiles, accuracy metrics
//! - [`metrics`]: ingestion, filtering, daily aggregation and summaries
//! - [`forecast`]: daily series, forecasting models and the pipeline
//!   (behind the default `forecasting` feature)
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use funnel_cast::metrics::{aggregate_daily, EventRow};
//!
//! let day = NaiveDate::from_ymd_opt(2023, 10, 1).unwrap();
//! let rows = vec![EventRow { impressions: 0, clicks: 0, ..EventRow::on(day) }];
//!
//! let daily = aggregate_daily(&rows);
//! assert_eq!(daily[0].ratios.ctr.to_string(), "N/A");
//! ```

pub use funnel_math as math;
pub use funnel_metrics as metrics;

#[cfg(feature = "forecasting")]
pub use funnel_forecast as forecast;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
