//! Daily aggregation of funnel rows

use crate::metric::Metric;
use crate::ratio::Ratio;
use crate::row::EventRow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, trace};

/// Summed funnel measures over some set of rows
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FunnelTotals {
    pub impressions: u64,
    pub clicks: u64,
    pub conversions: u64,
    pub cost: f64,
    pub leads: u64,
    pub disqualifications: u64,
    pub appointments: u64,
}

impl FunnelTotals {
    /// Sum the measures of `rows`.
    ///
    /// Counts saturate at `u64::MAX` instead of wrapping. Costs are added in ascending order so the total does not depend on
    /// the order the rows arrive in.
    pub fn from_rows<'a, I>(rows: I) -> Self
    where
        I: IntoIterator<Item = &'a EventRow>,
    {
        let mut totals = FunnelTotals::default();
        let mut costs = Vec::new();
        for row in rows {
            totals.impressions = totals.impressions.saturating_add(row.impressions);
            totals.clicks = totals.clicks.saturating_add(row.clicks);
            totals.conversions = totals.conversions.saturating_add(row.conversions);
            totals.leads = totals.leads.saturating_add(row.leads);
            totals.disqualifications = totals.disqualifications.saturating_add(row.disqualifications);
            totals.appointments = totals.appointments.saturating_add(row.appointments);
            costs.push(row.cost);
        }
        totals.cost = ordered_sum(costs);
        totals
    }

    /// Combine already-summed totals, with the same ordering rule for cost
    pub fn combine<'a, I>(parts: I) -> Self
    where
        I: IntoIterator<Item = &'a FunnelTotals>,
    {
        let mut totals = FunnelTotals::default();
        let mut costs = Vec::new();
        for part in parts {
            totals.impressions = totals.impressions.saturating_add(part.impressions);
            totals.clicks = totals.clicks.saturating_add(part.clicks);
            totals.conversions = totals.conversions.saturating_add(part.conversions);
            totals.leads = totals.leads.saturating_add(part.leads);
            totals.disqualifications = totals.disqualifications.saturating_add(part.disqualifications);
            totals.appointments = totals.appointments.saturating_add(part.appointments);
            costs.push(part.cost);
        }
        totals.cost = ordered_sum(costs);
        totals
    }

    /// Derived ratios of these totals
    pub fn ratios(&self) -> FunnelRatios {
        FunnelRatios {
            ctr: Ratio::of(self.clicks as f64, self.impressions as f64),
            cvr: Ratio::of(self.conversions as f64, self.impressions as f64),
            cpl: Ratio::of(self.cost, self.leads as f64),
            cpa: Ratio::of(self.cost, self.appointments as f64),
            cost_per_conversion: Ratio::of(self.cost, self.conversions as f64),
        }
    }
}

fn ordered_sum(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.iter().sum()
}

/// Ratios derived from summed measures
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FunnelRatios {
    /// Click-through rate, clicks / impressions
    pub ctr: Ratio,
    /// Conversion rate, conversions / impressions
    pub cvr: Ratio,
    /// Cost per lead
    pub cpl: Ratio,
    /// Cost per appointment
    pub cpa: Ratio,
    /// Cost per conversion
    pub cost_per_conversion: Ratio,
}

/// All activity of one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    /// Number of input rows that fell on this day
    pub rows: usize,
    #[serde(flatten)]
    pub totals: FunnelTotals,
    #[serde(flatten)]
    pub ratios: FunnelRatios,
}

impl DailyAggregate {
    /// Value of a measure or ratio; `None` when a ratio is undefined
    pub fn metric(&self, metric: Metric) -> Option<f64> {
        let t = &self.totals;
        match metric {
            Metric::Impressions => Some(t.impressions as f64),
            Metric::Clicks => Some(t.clicks as f64),
            Metric::Conversions => Some(t.conversions as f64),
            Metric::Cost => Some(t.cost),
            Metric::Leads => Some(t.leads as f64),
            Metric::Disqualifications => Some(t.disqualifications as f64),
            Metric::Appointments => Some(t.appointments as f64),
            Metric::Ctr => self.ratios.ctr.value(),
            Metric::Cvr => self.ratios.cvr.value(),
            Metric::Cpl => self.ratios.cpl.value(),
            Metric::Cpa => self.ratios.cpa.value(),
            Metric::CostPerConversion => self.ratios.cost_per_conversion.value(),
        }
    }
}

/// Group rows by calendar day.
///
/// Returns exactly one aggregate per distinct date, in ascending date
/// order. The result is identical for any permutation of `rows`.
pub fn aggregate_daily(rows: &[EventRow]) -> Vec<DailyAggregate> {
    let mut by_day: BTreeMap<NaiveDate, Vec<&EventRow>> = BTreeMap::new();
    for row in rows {
        by_day.entry(row.date).or_default().push(row);
    }

    let daily: Vec<DailyAggregate> = by_day
        .into_iter()
        .map(|(date, day_rows)| {
            let totals = FunnelTotals::from_rows(day_rows.iter().copied());
            let ratios = totals.ratios();
            trace!(%date, rows = day_rows.len(), ?totals, "aggregated day");
            DailyAggregate {
                date,
                rows: day_rows.len(),
                totals,
                ratios,
            }
        })
        .collect();

    debug!(rows = rows.len(), days = daily.len(), "aggregated rows by day");
    daily
}
