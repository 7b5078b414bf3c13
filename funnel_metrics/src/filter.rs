//! Row predicates: date range, dimension allow-lists and caller closures

use crate::row::{Dimension, EventRow};
use crate::{MetricsError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// Inclusive range of calendar dates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range; `start` must not be after `end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(MetricsError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range covering a single day
    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of calendar days in the range
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

type Predicate = Arc<dyn Fn(&EventRow) -> bool + Send + Sync>;

/// Filter applied to rows before aggregation.
///
/// Every configured condition must hold. An empty allow-list admits every
/// value; a non-empty one rejects rows lacking that dimension.
#[derive(Clone, Default)]
pub struct RowFilter {
    date_range: Option<DateRange>,
    channels: BTreeSet<String>,
    states: BTreeSet<String>,
    campaigns: BTreeSet<String>,
    kinds: BTreeSet<String>,
    predicates: Vec<Predicate>,
}

impl RowFilter {
    /// A filter that admits every row
    pub fn all() -> Self {
        Self::default()
    }

    pub fn with_date_range(mut self, range: DateRange) -> Self {
        self.date_range = Some(range);
        self
    }

    /// Admit only the listed values of `dimension`
    pub fn with_values<I, S>(mut self, dimension: Dimension, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let set = match dimension {
            Dimension::Channel => &mut self.channels,
            Dimension::State => &mut self.states,
            Dimension::Campaign => &mut self.campaigns,
            Dimension::Kind => &mut self.kinds,
        };
        set.extend(values.into_iter().map(Into::into));
        self
    }

    /// Add an arbitrary predicate
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&EventRow) -> bool + Send + Sync + 'static,
    {
        self.predicates.push(Arc::new(predicate));
        self
    }

    pub fn date_range(&self) -> Option<DateRange> {
        self.date_range
    }

    fn allowed(&self, dimension: Dimension) -> &BTreeSet<String> {
        match dimension {
            Dimension::Channel => &self.channels,
            Dimension::State => &self.states,
            Dimension::Campaign => &self.campaigns,
            Dimension::Kind => &self.kinds,
        }
    }

    pub fn matches(&self, row: &EventRow) -> bool {
        if let Some(range) = &self.date_range {
            if !range.contains(row.date) {
                return false;
            }
        }

        for dimension in [
            Dimension::Channel,
            Dimension::State,
            Dimension::Campaign,
            Dimension::Kind,
        ] {
            let allowed = self.allowed(dimension);
            if allowed.is_empty() {
                continue;
            }
            match row.dimension(dimension) {
                Some(value) if allowed.contains(value) => {}
                _ => return false,
            }
        }

        self.predicates.iter().all(|predicate| predicate(row))
    }

    /// Rows admitted by the filter, in input order
    pub fn apply(&self, rows: &[EventRow]) -> Vec<EventRow> {
        rows.iter().filter(|row| self.matches(row)).cloned().collect()
    }
}

impl fmt::Debug for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowFilter")
            .field("date_range", &self.date_range)
            .field("channels", &self.channels)
            .field("states", &self.states)
            .field("campaigns", &self.campaigns)
            .field("kinds", &self.kinds)
            .field("predicates", &self.predicates.len())
            .finish()
    }
}
