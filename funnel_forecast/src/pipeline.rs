//! Filter, aggregate, summarize and forecast in one pass

use crate::config::{ModelConfig, PipelineConfig};
use crate::error::Result;
use crate::forecaster::Forecaster;
use crate::models::holt::HoltLinear;
use crate::models::seasonal_trend::SeasonalTrend;
use crate::models::Forecast;
use crate::series::DailySeries;
use crate::ForecastError;
use funnel_metrics::{
    aggregate_daily, DailyAggregate, EventRow, FunnelSummary, IngestReport, Ingested, Ingestor,
    Metric, RowFilter,
};
use serde_json::Value;
use std::io::Read;
use tracing::{debug, info, warn};

/// Everything one pipeline run produces
#[derive(Debug)]
pub struct PipelineOutput {
    /// Metric that was forecast
    pub metric: Metric,
    /// Rows left after filtering
    pub filtered_rows: usize,
    /// One aggregate per active day, ascending
    pub daily: Vec<DailyAggregate>,
    pub summary: FunnelSummary,
    /// Present when the run started from raw records
    pub ingest: Option<IngestReport>,
    /// A failed forecast leaves the aggregates above usable
    pub forecast: std::result::Result<Forecast, ForecastError>,
}

/// Configured aggregation and forecasting run.
///
/// Date ranges and dimension restrictions come from the [`RowFilter`]
/// passed to each run, so one pipeline serves any slice of the data.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline after validating `config`
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run over already canonical rows
    pub fn run(&self, rows: &[EventRow], filter: &RowFilter) -> PipelineOutput {
        let filtered = filter.apply(rows);
        debug!(
            input_rows = rows.len(),
            filtered_rows = filtered.len(),
            ?filter,
            "filtered rows"
        );

        let daily = aggregate_daily(&filtered);
        let summary = FunnelSummary::from_daily(&daily);

        let forecast = self.forecast_daily(&daily);
        match &forecast {
            Ok(forecast) => info!(
                metric = %self.config.metric,
                days = daily.len(),
                horizon = forecast.horizon(),
                "pipeline run complete"
            ),
            Err(error) => warn!(
                metric = %self.config.metric,
                days = daily.len(),
                %error,
                "forecast failed; returning aggregates only"
            ),
        }

        PipelineOutput {
            metric: self.config.metric,
            filtered_rows: filtered.len(),
            daily,
            summary,
            ingest: None,
            forecast,
        }
    }

    /// Ingest JSON records and run over them.
    ///
    /// Ingestion failures, such as a required field missing from the input
    /// shape, abort the run.
    pub fn run_records(&self, records: &[Value], filter: &RowFilter) -> Result<PipelineOutput> {
        let ingested = Ingestor::from_records(records)?;
        Ok(self.run_ingested(ingested, filter))
    }

    /// Ingest CSV with a header row and run over it
    pub fn run_csv<R: Read>(&self, reader: R, filter: &RowFilter) -> Result<PipelineOutput> {
        let ingested = Ingestor::from_csv_reader(reader)?;
        Ok(self.run_ingested(ingested, filter))
    }

    fn run_ingested(&self, ingested: Ingested, filter: &RowFilter) -> PipelineOutput {
        let Ingested { rows, report } = ingested;
        if report.skipped_rows > 0 || report.coerced_values > 0 {
            warn!(
                skipped_rows = report.skipped_rows,
                coerced_values = report.coerced_values,
                "ingestion repaired input"
            );
        }

        let mut output = self.run(&rows, filter);
        output.ingest = Some(report);
        output
    }

    /// Forecast the configured metric from daily aggregates
    pub fn forecast_daily(&self, daily: &[DailyAggregate]) -> Result<Forecast> {
        let series =
            DailySeries::from_aggregates(daily, self.config.metric, self.config.missing_days)?;
        let options = self.config.forecast_options();

        match self.config.model {
            ModelConfig::SeasonalTrend { weekly: true } => {
                Forecaster::new(SeasonalTrend::new(), options).forecast(&series)
            }
            ModelConfig::SeasonalTrend { weekly: false } => {
                Forecaster::new(SeasonalTrend::trend_only(), options).forecast(&series)
            }
            ModelConfig::Holt { alpha, beta } => {
                Forecaster::new(HoltLinear::new(alpha, beta)?, options).forecast(&series)
            }
        }
    }
}
