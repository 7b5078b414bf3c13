//! Canonical event rows

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One normalized row of funnel activity for a single calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRow {
    /// Calendar date of the activity
    pub date: NaiveDate,
    /// Ad impressions served
    pub impressions: u64,
    /// Clicks on the ad
    pub clicks: u64,
    /// Conversions attributed to the ad
    pub conversions: u64,
    /// Spend in account currency
    pub cost: f64,
    /// Leads generated
    pub leads: u64,
    /// Leads disqualified
    pub disqualifications: u64,
    /// Appointments booked
    pub appointments: u64,
    /// Marketing channel
    pub channel: Option<String>,
    /// Geographic state
    pub state: Option<String>,
    /// Campaign name
    pub campaign: Option<String>,
    /// Campaign type
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl EventRow {
    /// An all-zero row on `date` with no dimensions
    pub fn on(date: NaiveDate) -> Self {
        Self {
            date,
            impressions: 0,
            clicks: 0,
            conversions: 0,
            cost: 0.0,
            leads: 0,
            disqualifications: 0,
            appointments: 0,
            channel: None,
            state: None,
            campaign: None,
            kind: None,
        }
    }

    /// Value of a categorical dimension, if present
    pub fn dimension(&self, dimension: Dimension) -> Option<&str> {
        match dimension {
            Dimension::Channel => self.channel.as_deref(),
            Dimension::State => self.state.as_deref(),
            Dimension::Campaign => self.campaign.as_deref(),
            Dimension::Kind => self.kind.as_deref(),
        }
    }
}

/// Categorical dimensions carried by each row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Channel,
    State,
    Campaign,
    #[serde(rename = "type")]
    Kind,
}

impl std::fmt::Display for Dimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Dimension::Channel => "channel",
            Dimension::State => "state",
            Dimension::Campaign => "campaign",
            Dimension::Kind => "type",
        };
        f.write_str(name)
    }
}
