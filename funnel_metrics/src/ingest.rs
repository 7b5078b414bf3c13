//! Canonicalization of raw warehouse rows into [`EventRow`]s
//!
//! Warehouse result sets arrive as JSON records or CSV. Column names vary
//! between exports (`Cost` vs `Costs`, `Appts` vs `Appointments`), numbers
//! may be text or null, and dates may be timestamps. The [`Ingestor`]
//! resolves columns by normalized name, coerces every measure to a number
//! (unparseable or missing values become zero) and reduces every date to a
//! calendar date.

use crate::row::EventRow;
use crate::{MetricsError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

/// Fields recognised in the input shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Field {
    Date,
    Impressions,
    Clicks,
    Conversions,
    Cost,
    Leads,
    Disqualifications,
    Appointments,
    Channel,
    State,
    Campaign,
    Kind,
}

impl Field {
    const ALL: [Field; 12] = [
        Field::Date,
        Field::Impressions,
        Field::Clicks,
        Field::Conversions,
        Field::Cost,
        Field::Leads,
        Field::Disqualifications,
        Field::Appointments,
        Field::Channel,
        Field::State,
        Field::Campaign,
        Field::Kind,
    ];

    fn name(&self) -> &'static str {
        match self {
            Field::Date => "date",
            Field::Impressions => "impressions",
            Field::Clicks => "clicks",
            Field::Conversions => "conversions",
            Field::Cost => "cost",
            Field::Leads => "leads",
            Field::Disqualifications => "disqualifications",
            Field::Appointments => "appointments",
            Field::Channel => "channel",
            Field::State => "state",
            Field::Campaign => "campaign",
            Field::Kind => "type",
        }
    }

    /// Accepted column names, already normalized
    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Field::Date => &["date", "eventdate", "reportdate", "day"],
            Field::Impressions => &["impressions", "impression", "impr", "imps"],
            Field::Clicks => &["clicks", "click"],
            Field::Conversions => &["conversions", "conversion", "conv", "convs"],
            Field::Cost => &["cost", "costs", "spend"],
            Field::Leads => &["leads", "lead"],
            Field::Disqualifications => &["disqualifications", "disqualified", "dqs", "dq"],
            Field::Appointments => &["appointments", "appointment", "appts", "appt"],
            Field::Channel => &["channel", "channelnontruth"],
            Field::State => &["state"],
            Field::Campaign => &["campaign", "campaignname"],
            Field::Kind => &["type", "kind", "campaigntype"],
        }
    }

    fn is_required(&self) -> bool {
        !matches!(
            self,
            Field::Channel | Field::State | Field::Campaign | Field::Kind
        )
    }
}

/// Lowercase and drop everything but letters and digits
fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Mapping from each recognised field to the source column carrying it
#[derive(Debug, Clone)]
struct ColumnMap {
    columns: HashMap<Field, String>,
}

impl ColumnMap {
    /// Resolve columns from the set of names present in the input.
    ///
    /// For each field the first alias (in preference order) that matches a
    /// column wins.
    fn resolve<'a, I>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut by_normalized: HashMap<String, String> = HashMap::new();
        for name in names {
            by_normalized
                .entry(normalize_name(name))
                .or_insert_with(|| name.to_string());
        }

        let mut columns = HashMap::new();
        for field in Field::ALL {
            let found = field
                .aliases()
                .iter()
                .find_map(|alias| by_normalized.get(*alias));
            match found {
                Some(column) => {
                    columns.insert(field, column.clone());
                }
                None if field.is_required() => {
                    return Err(MetricsError::Schema {
                        field: field.name(),
                    });
                }
                None => {}
            }
        }

        Ok(Self { columns })
    }

    fn column(&self, field: Field) -> Option<&str> {
        self.columns.get(&field).map(String::as_str)
    }
}

/// A raw cell from either input shape
#[derive(Debug, Clone, Copy)]
enum Cell<'a> {
    Json(&'a Value),
    Text(&'a str),
    Missing,
}

impl<'a> Cell<'a> {
    fn as_text(&self) -> Option<&'a str> {
        match *self {
            Cell::Json(Value::String(s)) => Some(s.as_str()),
            Cell::Text(s) => Some(s),
            _ => None,
        }
    }

    fn is_blank(&self) -> bool {
        match *self {
            Cell::Missing | Cell::Json(Value::Null) => true,
            _ => self.as_text().is_some_and(|s| s.trim().is_empty()),
        }
    }
}

/// Counters describing what ingestion had to repair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Records read from the input
    pub rows_read: usize,
    /// Records dropped because their date was missing or unparseable
    pub skipped_rows: usize,
    /// Non-blank numeric cells that could not be read and became zero
    pub coerced_values: usize,
}

/// Canonical rows plus the ingestion report
#[derive(Debug, Clone, PartialEq)]
pub struct Ingested {
    pub rows: Vec<EventRow>,
    pub report: IngestReport,
}

/// Loader for warehouse result sets
#[derive(Debug)]
pub struct Ingestor;

impl Ingestor {
    /// Ingest JSON records, one object per row.
    ///
    /// The input shape is the union of keys over all records: a required
    /// field missing from every record is a [`MetricsError::Schema`] error,
    /// while a field missing from only some records reads as zero there.
    pub fn from_records(records: &[Value]) -> Result<Ingested> {
        let mut objects = Vec::with_capacity(records.len());
        for (index, record) in records.iter().enumerate() {
            match record.as_object() {
                Some(object) => objects.push(object),
                None => return Err(MetricsError::InvalidRecord { index }),
            }
        }

        if objects.is_empty() {
            return Ok(Ingested {
                rows: Vec::new(),
                report: IngestReport::default(),
            });
        }

        let keys: BTreeSet<&str> = objects
            .iter()
            .flat_map(|object| object.keys().map(String::as_str))
            .collect();
        let columns = ColumnMap::resolve(keys)?;

        let mut builder = RowBuilder::new(&columns);
        for object in objects {
            builder.push(|column| match object.get(column) {
                Some(value) => Cell::Json(value),
                None => Cell::Missing,
            });
        }

        Ok(builder.finish())
    }

    /// Ingest CSV with a header row from any reader
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Ingested> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let columns = ColumnMap::resolve(headers.iter())?;

        // Repeated headers resolve to their first column, as in ColumnMap
        let mut index_of: HashMap<&str, usize> = HashMap::new();
        for (idx, name) in headers.iter().enumerate() {
            index_of.entry(name).or_insert(idx);
        }

        let mut builder = RowBuilder::new(&columns);
        for record in csv_reader.records() {
            let record = record?;
            builder.push(|column| {
                index_of
                    .get(column)
                    .and_then(|idx| record.get(*idx))
                    .map(Cell::Text)
                    .unwrap_or(Cell::Missing)
            });
        }

        Ok(builder.finish())
    }

    /// Ingest a CSV file
    pub fn from_csv_path<P: AsRef<Path>>(path: P) -> Result<Ingested> {
        let file = File::open(path)?;
        Self::from_csv_reader(file)
    }
}

/// Accumulates canonical rows while counting repairs
struct RowBuilder<'c> {
    columns: &'c ColumnMap,
    rows: Vec<EventRow>,
    report: IngestReport,
}

impl<'c> RowBuilder<'c> {
    fn new(columns: &'c ColumnMap) -> Self {
        Self {
            columns,
            rows: Vec::new(),
            report: IngestReport::default(),
        }
    }

    /// Build one row; `lookup` fetches the cell for a source column name
    fn push<'v, F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Cell<'v>,
    {
        self.report.rows_read += 1;
        let cell = |field: Field| match self.columns.column(field) {
            Some(column) => lookup(column),
            None => Cell::Missing,
        };

        let date_cell = cell(Field::Date);
        let date = match parse_date_cell(date_cell) {
            Some(date) => date,
            None => {
                warn!(
                    row = self.report.rows_read - 1,
                    value = ?date_cell,
                    "skipping row with missing or unparseable date"
                );
                self.report.skipped_rows += 1;
                return;
            }
        };

        let mut coerced = 0usize;
        let mut count = |field: Field| {
            let (value, repaired) = coerce_count(cell(field));
            if repaired {
                debug!(field = field.name(), "coerced unreadable count to zero");
                coerced += 1;
            }
            value
        };

        let impressions = count(Field::Impressions);
        let clicks = count(Field::Clicks);
        let conversions = count(Field::Conversions);
        let leads = count(Field::Leads);
        let disqualifications = count(Field::Disqualifications);
        let appointments = count(Field::Appointments);

        let (cost, cost_repaired) = coerce_amount(cell(Field::Cost));
        if cost_repaired {
            debug!(field = Field::Cost.name(), "coerced unreadable cost to zero");
            coerced += 1;
        }

        self.report.coerced_values += coerced;
        self.rows.push(EventRow {
            date,
            impressions,
            clicks,
            conversions,
            cost,
            leads,
            disqualifications,
            appointments,
            channel: dimension_text(cell(Field::Channel)),
            state: dimension_text(cell(Field::State)),
            campaign: dimension_text(cell(Field::Campaign)),
            kind: dimension_text(cell(Field::Kind)),
        });
    }

    fn finish(self) -> Ingested {
        debug!(
            rows_read = self.report.rows_read,
            rows_kept = self.rows.len(),
            skipped = self.report.skipped_rows,
            coerced = self.report.coerced_values,
            "ingested funnel rows"
        );
        Ingested {
            rows: self.rows,
            report: self.report,
        }
    }
}

/// Parse a numeric-looking string: currency signs, thousands separators and
/// surrounding whitespace are ignored
fn parse_number_text(text: &str) -> Option<f64> {
    let cleaned: String = text
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' ' | '_'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

/// Read a cell as a finite, non-negative number.
///
/// Returns the value and whether a non-blank cell had to be replaced by zero.
fn coerce_number(cell: Cell<'_>) -> (f64, bool) {
    if cell.is_blank() {
        return (0.0, false);
    }
    let parsed = match cell {
        Cell::Json(Value::Number(n)) => n.as_f64(),
        _ => cell.as_text().and_then(parse_number_text),
    };
    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => (v, false),
        _ => (0.0, true),
    }
}

fn coerce_count(cell: Cell<'_>) -> (u64, bool) {
    let (value, repaired) = coerce_number(cell);
    (value.round() as u64, repaired)
}

fn coerce_amount(cell: Cell<'_>) -> (f64, bool) {
    coerce_number(cell)
}

fn dimension_text(cell: Cell<'_>) -> Option<String> {
    let text = match cell {
        Cell::Json(Value::Number(n)) => n.to_string(),
        Cell::Json(Value::Bool(b)) => b.to_string(),
        _ => cell.as_text()?.trim().to_string(),
    };
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn parse_date_cell(cell: Cell<'_>) -> Option<NaiveDate> {
    match cell {
        Cell::Json(Value::Number(n)) => n.as_i64().and_then(date_from_epoch),
        _ => cell.as_text().and_then(parse_date),
    }
}

/// Interpret an integer as epoch seconds, or epoch milliseconds when it is
/// too large to be a plausible number of seconds
fn date_from_epoch(value: i64) -> Option<NaiveDate> {
    let seconds = if value.abs() >= 100_000_000_000 {
        value / 1000
    } else {
        value
    };
    DateTime::from_timestamp(seconds, 0).map(|dt| dt.date_naive())
}

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];
const OFFSET_DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Reduce a date-like string to a calendar date.
///
/// Timestamps keep the calendar date they were written in; a trailing
/// ` UTC` marker is accepted. Bare integers are epoch values.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let text = text.strip_suffix(" UTC").unwrap_or(text);

    if text.chars().all(|c| c.is_ascii_digit()) && text.len() > 8 {
        return text.parse::<i64>().ok().and_then(date_from_epoch);
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.date_naive());
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.date_naive());
        }
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Some(dt.date());
        }
    }

    None
}
