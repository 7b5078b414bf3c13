//! Pipeline configuration
//!
//! Configuration is request-scoped: callers build or load a
//! [`PipelineConfig`] and pass it to [`Pipeline::new`](crate::Pipeline::new).

use crate::error::{ForecastError, Result};
use crate::forecaster::ForecastOptions;
use funnel_metrics::Metric;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How calendar days without any activity enter a forecast series
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingDays {
    /// Only days with activity are used; the models place each
    /// observation at its true calendar offset
    #[default]
    Omit,
    /// Days with no activity count as zero
    Zero,
}

/// Which forecasting model the pipeline trains
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelConfig {
    /// Linear trend plus day-of-week profile
    SeasonalTrend {
        #[serde(default = "default_weekly")]
        weekly: bool,
    },
    /// Holt linear smoothing
    Holt { alpha: f64, beta: f64 },
}

impl Default for ModelConfig {
    fn default() -> Self {
        ModelConfig::SeasonalTrend {
            weekly: default_weekly(),
        }
    }
}

/// Settings for one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Days to project past the last historical date
    #[serde(default = "default_horizon_days")]
    pub horizon_days: usize,
    /// Fewest historical days a forecast accepts
    #[serde(default = "default_min_history_days")]
    pub min_history_days: usize,
    /// Coverage of the uncertainty band, in (0, 1)
    #[serde(default = "default_confidence_level")]
    pub confidence_level: f64,
    /// Metric to forecast
    #[serde(default = "default_metric")]
    pub metric: Metric,
    #[serde(default)]
    pub missing_days: MissingDays,
    /// Also return fitted values for historical dates
    #[serde(default)]
    pub include_history: bool,
    /// Floor predictions and bounds at zero
    #[serde(default = "default_non_negative")]
    pub non_negative: bool,
    #[serde(default)]
    pub model: ModelConfig,
}

fn default_weekly() -> bool {
    true
}

fn default_horizon_days() -> usize {
    120
}

fn default_min_history_days() -> usize {
    2
}

fn default_confidence_level() -> f64 {
    0.80
}

fn default_metric() -> Metric {
    Metric::Appointments
}

fn default_non_negative() -> bool {
    true
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            min_history_days: default_min_history_days(),
            confidence_level: default_confidence_level(),
            metric: default_metric(),
            missing_days: MissingDays::default(),
            include_history: false,
            non_negative: default_non_negative(),
            model: ModelConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Parse and validate a JSON document; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every setting is usable
    pub fn validate(&self) -> Result<()> {
        if self.horizon_days == 0 {
            return Err(ForecastError::Config(
                "horizon_days must be positive".to_string(),
            ));
        }
        if self.min_history_days < 2 {
            return Err(ForecastError::Config(format!(
                "min_history_days must be at least 2, got {}",
                self.min_history_days
            )));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ForecastError::Config(format!(
                "confidence_level must be between 0 and 1, got {}",
                self.confidence_level
            )));
        }
        if let ModelConfig::Holt { alpha, beta } = self.model {
            let in_unit = |v: f64| v > 0.0 && v < 1.0;
            if !in_unit(alpha) || !in_unit(beta) {
                return Err(ForecastError::Config(format!(
                    "Holt alpha and beta must be between 0 and 1, got alpha={} beta={}",
                    alpha, beta
                )));
            }
        }
        Ok(())
    }

    /// Forecaster settings carried by this configuration
    pub fn forecast_options(&self) -> ForecastOptions {
        ForecastOptions {
            horizon_days: self.horizon_days,
            min_history_days: self.min_history_days,
            confidence_level: self.confidence_level,
            include_history: self.include_history,
            non_negative: self.non_negative,
        }
    }
}
