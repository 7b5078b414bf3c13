//! Range totals, per-dimension breakdowns and the cost/conversion trendline

use crate::aggregate::{DailyAggregate, FunnelRatios, FunnelTotals};
use crate::ratio::Ratio;
use crate::row::{Dimension, EventRow};
use crate::Result;
use chrono::NaiveDate;
use funnel_math::LinearRegression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key used for rows that lack the requested dimension
pub const UNKNOWN_DIMENSION: &str = "(unknown)";

/// Totals and ratios over a whole date range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelSummary {
    /// First date with activity
    pub start: Option<NaiveDate>,
    /// Last date with activity
    pub end: Option<NaiveDate>,
    /// Distinct days with activity
    pub days: usize,
    /// Input rows
    pub rows: usize,
    pub totals: FunnelTotals,
    pub ratios: FunnelRatios,
}

impl FunnelSummary {
    /// Summarize raw rows
    pub fn from_rows(rows: &[EventRow]) -> Self {
        let totals = FunnelTotals::from_rows(rows);
        let start = rows.iter().map(|r| r.date).min();
        let end = rows.iter().map(|r| r.date).max();
        let mut dates: Vec<NaiveDate> = rows.iter().map(|r| r.date).collect();
        dates.sort_unstable();
        dates.dedup();

        Self {
            start,
            end,
            days: dates.len(),
            rows: rows.len(),
            ratios: totals.ratios(),
            totals,
        }
    }

    /// Summarize already aggregated days
    pub fn from_daily(daily: &[DailyAggregate]) -> Self {
        let totals = FunnelTotals::combine(daily.iter().map(|d| &d.totals));
        Self {
            start: daily.iter().map(|d| d.date).min(),
            end: daily.iter().map(|d| d.date).max(),
            days: daily.len(),
            rows: daily.iter().map(|d| d.rows).sum(),
            ratios: totals.ratios(),
            totals,
        }
    }
}

impl std::fmt::Display for FunnelSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Funnel Summary:")?;
        writeln!(f, "  Total Impressions:  {}", self.totals.impressions)?;
        writeln!(f, "  Total Clicks:       {}", self.totals.clicks)?;
        writeln!(f, "  Total Conversions:  {}", self.totals.conversions)?;
        writeln!(f, "  Total Cost:         ${:.2}", self.totals.cost)?;
        writeln!(f, "  Total Leads:        {}", self.totals.leads)?;
        writeln!(f, "  Total Appointments: {}", self.totals.appointments)?;
        writeln!(f, "  CTR: {}", self.ratios.ctr.display_percent(2))?;
        writeln!(f, "  CVR: {}", self.ratios.cvr.display_percent(2))?;
        writeln!(f, "  CPL: {}", self.ratios.cpl.display_currency())?;
        writeln!(f, "  CPA: {}", self.ratios.cpa.display_currency())?;
        Ok(())
    }
}

/// Totals for one value of a dimension
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionBreakdown {
    pub key: String,
    pub rows: usize,
    pub totals: FunnelTotals,
    pub ratios: FunnelRatios,
    /// This key's share of all conversions
    pub conversion_share: Ratio,
}

/// Totals per value of `dimension`, largest conversion count first.
///
/// Ties are broken by key. Rows without the dimension are grouped under
/// [`UNKNOWN_DIMENSION`].
pub fn breakdown_by(rows: &[EventRow], dimension: Dimension) -> Vec<DimensionBreakdown> {
    let mut groups: BTreeMap<&str, Vec<&EventRow>> = BTreeMap::new();
    for row in rows {
        let key = row.dimension(dimension).unwrap_or(UNKNOWN_DIMENSION);
        groups.entry(key).or_default().push(row);
    }

    let all_conversions = rows
        .iter()
        .fold(0u64, |acc, r| acc.saturating_add(r.conversions));

    let mut breakdown: Vec<DimensionBreakdown> = groups
        .into_iter()
        .map(|(key, group)| {
            let totals = FunnelTotals::from_rows(group.iter().copied());
            DimensionBreakdown {
                key: key.to_string(),
                rows: group.len(),
                ratios: totals.ratios(),
                conversion_share: Ratio::of(totals.conversions as f64, all_conversions as f64),
                totals,
            }
        })
        .collect();

    breakdown.sort_by(|a, b| {
        b.totals
            .conversions
            .cmp(&a.totals.conversions)
            .then_with(|| a.key.cmp(&b.key))
    });
    breakdown
}

/// Least squares line of conversions against cost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trendline {
    /// Additional conversions per unit of cost
    pub slope: f64,
    pub intercept: f64,
    /// Coefficient of determination, absent when conversions are constant
    pub r_squared: Option<f64>,
    /// Rows used in the fit
    pub points: usize,
}

impl Trendline {
    /// Conversions the line predicts at `cost`
    pub fn predict(&self, cost: f64) -> f64 {
        self.slope * cost + self.intercept
    }
}

/// Fit conversions as a linear function of cost, one point per row
pub fn cost_conversion_trend(rows: &[EventRow]) -> Result<Trendline> {
    let points: Vec<(f64, f64)> = rows
        .iter()
        .map(|r| (r.cost, r.conversions as f64))
        .collect();
    let fit = LinearRegression::new().fit(&points)?;

    Ok(Trendline {
        slope: fit.slope,
        intercept: fit.intercept,
        r_squared: fit.r_squared(),
        points: fit.n,
    })
}
