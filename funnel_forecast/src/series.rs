//! Validated daily series

use crate::config::MissingDays;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use funnel_metrics::{DailyAggregate, Metric};
use serde::Serialize;

/// A daily series with unique, ascending dates and finite values
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailySeries {
    points: Vec<(NaiveDate, f64)>,
}

impl DailySeries {
    /// Build a series from `(date, value)` pairs in any order.
    ///
    /// Fails with [`ForecastError::NonMonotonicInput`] when a date repeats and
    /// [`ForecastError::InvalidValue`] when a value is not finite.
    pub fn new(mut points: Vec<(NaiveDate, f64)>) -> Result<Self> {
        if let Some(&(date, value)) = points.iter().find(|(_, v)| !v.is_finite()) {
            return Err(ForecastError::InvalidValue { date, value });
        }

        points.sort_by_key(|(date, _)| *date);
        if let Some(pair) = points.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(ForecastError::NonMonotonicInput { date: pair[0].0 });
        }

        Ok(Self { points })
    }

    /// Extract one metric from daily aggregates.
    ///
    /// Days where a ratio metric is undefined are left out. With
    /// [`MissingDays::Zero`], calendar days with no aggregate at all are
    /// filled with zero for count and cost metrics; ratio metrics have no
    /// meaningful value on an empty day and are never filled.
    pub fn from_aggregates(
        daily: &[DailyAggregate],
        metric: Metric,
        missing_days: MissingDays,
    ) -> Result<Self> {
        let observed: Vec<(NaiveDate, f64)> = daily
            .iter()
            .filter_map(|day| day.metric(metric).map(|value| (day.date, value)))
            .collect();

        let series = Self::new(observed)?;
        if missing_days == MissingDays::Zero && !metric.is_ratio() {
            Ok(series.fill_gaps_with_zero())
        } else {
            Ok(series)
        }
    }

    /// Insert a zero for every calendar day between the first and last date
    /// that has no observation
    pub fn fill_gaps_with_zero(&self) -> Self {
        let (first, last) = match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => (first, last),
            _ => return self.clone(),
        };

        let mut filled = Vec::with_capacity(((last - first).num_days() + 1) as usize);
        let mut observed = self.points.iter().peekable();
        let mut date = first;
        loop {
            match observed.peek() {
                Some(&&(d, value)) if d == date => {
                    filled.push((date, value));
                    observed.next();
                }
                _ => filled.push((date, 0.0)),
            }
            match date.succ_opt() {
                Some(next) if next <= last => date = next,
                _ => break,
            }
        }

        Self { points: filled }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[(NaiveDate, f64)] {
        &self.points
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|(d, _)| *d).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, v)| *v).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(d, _)| *d)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }

    /// Calendar days covered from the first to the last date, inclusive
    pub fn span_days(&self) -> i64 {
        match (self.first_date(), self.last_date()) {
            (Some(first), Some(last)) => (last - first).num_days() + 1,
            _ => 0,
        }
    }
}
