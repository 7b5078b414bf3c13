//! # Funnel Metrics
//!
//! `funnel_metrics` turns raw advertising-funnel event rows (impressions,
//! clicks, conversions, cost, leads, disqualifications, appointments) into
//! per-day aggregates with derived ratios.
//!
//! ## Pipeline
//!
//! - [`ingest`]: canonicalize JSON records or CSV into [`EventRow`]s
//! - [`filter`]: restrict rows by date range and dimension allow-lists
//! - [`aggregate`]: one [`DailyAggregate`] per calendar day, chronological
//! - [`summary`]: range totals, per-dimension breakdowns, cost/conversion trendline
//!
//! Ratios with a zero denominator are [`Ratio::Undefined`] and render as `N/A`.
//!
//! ## Usage Example
//!
//! ```
//! use chrono::NaiveDate;
//! use funnel_metrics::{aggregate_daily, EventRow};
//!
//! let day = NaiveDate::from_ymd_opt(2023, 10, 17).unwrap();
//! let rows = vec![
//!     EventRow { impressions: 100, clicks: 10, ..EventRow::on(day) },
//!     EventRow { impressions: 100, clicks: 20, ..EventRow::on(day) },
//! ];
//!
//! let daily = aggregate_daily(&rows);
//! assert_eq!(daily.len(), 1);
//! assert_eq!(daily[0].ratios.ctr.value(), Some(0.15));
//! ```

use thiserror::Error;

pub mod aggregate;
pub mod filter;
pub mod ingest;
pub mod metric;
pub mod ratio;
pub mod row;
pub mod summary;

pub use aggregate::{aggregate_daily, DailyAggregate, FunnelRatios, FunnelTotals};
pub use filter::{DateRange, RowFilter};
pub use ingest::{IngestReport, Ingested, Ingestor};
pub use metric::Metric;
pub use ratio::Ratio;
pub use row::{Dimension, EventRow};
pub use summary::{breakdown_by, cost_conversion_trend, DimensionBreakdown, FunnelSummary, Trendline};

/// Errors that can occur while ingesting or aggregating funnel rows
#[derive(Error, Debug)]
pub enum MetricsError {
    /// A required field is absent from the input shape
    #[error("Schema error: required field '{field}' is missing from the input")]
    Schema { field: &'static str },

    /// A record is not a key/value object
    #[error("Invalid record at index {index}: expected an object")]
    InvalidRecord { index: usize },

    /// A date range whose start is after its end
    #[error("Invalid date range: {start} is after {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    /// Error from reading CSV input
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from a numeric routine
    #[error("Math error: {0}")]
    Math(#[from] funnel_math::MathError),
}

/// Result type for funnel metric operations
pub type Result<T> = std::result::Result<T, MetricsError>;
