//! Named measures and ratios that can be pulled out of a daily aggregate

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A measure or derived ratio of a [`DailyAggregate`](crate::DailyAggregate)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Impressions,
    Clicks,
    Conversions,
    Cost,
    Leads,
    Disqualifications,
    Appointments,
    /// Click-through rate, clicks / impressions
    Ctr,
    /// Conversion rate, conversions / impressions
    Cvr,
    /// Cost per lead
    Cpl,
    /// Cost per appointment
    Cpa,
    /// Cost per conversion
    CostPerConversion,
}

impl Metric {
    pub const ALL: [Metric; 12] = [
        Metric::Impressions,
        Metric::Clicks,
        Metric::Conversions,
        Metric::Cost,
        Metric::Leads,
        Metric::Disqualifications,
        Metric::Appointments,
        Metric::Ctr,
        Metric::Cvr,
        Metric::Cpl,
        Metric::Cpa,
        Metric::CostPerConversion,
    ];

    /// Whether the metric is a derived ratio that can be undefined
    pub fn is_ratio(&self) -> bool {
        matches!(
            self,
            Metric::Ctr | Metric::Cvr | Metric::Cpl | Metric::Cpa | Metric::CostPerConversion
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::Impressions => "impressions",
            Metric::Clicks => "clicks",
            Metric::Conversions => "conversions",
            Metric::Cost => "cost",
            Metric::Leads => "leads",
            Metric::Disqualifications => "disqualifications",
            Metric::Appointments => "appointments",
            Metric::Ctr => "ctr",
            Metric::Cvr => "cvr",
            Metric::Cpl => "cpl",
            Metric::Cpa => "cpa",
            Metric::CostPerConversion => "cost_per_conversion",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Metric::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| format!("Unknown metric: {}", s))
    }
}
