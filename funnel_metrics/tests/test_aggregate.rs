use chrono::{Duration, NaiveDate};
use funnel_metrics::{
    aggregate_daily, breakdown_by, DailyAggregate, Dimension, EventRow, FunnelSummary, Ingestor,
    Ratio,
};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rstest::rstest;
use std::collections::BTreeSet;

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()
}

/// Seeded random rows spread over `days` days
fn generate_rows(count: usize, days: i64) -> Vec<EventRow> {
    let mut rng = StdRng::seed_from_u64(42);

    (0..count)
        .map(|_| {
            let day = rng.gen_range(0..days);
            let impressions = rng.gen_range(0..5000u64);
            let clicks = rng.gen_range(0..=impressions);
            EventRow {
                impressions,
                clicks,
                conversions: rng.gen_range(0..20),
                cost: (rng.gen_range(0.1..1000.0_f64) * 100.0).round() / 100.0,
                leads: rng.gen_range(0..10),
                disqualifications: rng.gen_range(0..3),
                appointments: rng.gen_range(0..4),
                ..EventRow::on(base_date() + Duration::days(day))
            }
        })
        .collect()
}

#[rstest]
#[case(0, 5)]
#[case(1, 1)]
#[case(50, 7)]
#[case(500, 45)]
fn test_one_aggregate_per_distinct_date(#[case] count: usize, #[case] days: i64) {
    let rows = generate_rows(count, days);
    let distinct: BTreeSet<NaiveDate> = rows.iter().map(|r| r.date).collect();
    let daily = aggregate_daily(&rows);

    assert_eq!(daily.len(), distinct.len());
    let dates: Vec<NaiveDate> = daily.iter().map(|d| d.date).collect();
    assert_eq!(dates, distinct.into_iter().collect::<Vec<_>>());
}

#[test]
fn test_sums_match_rows_of_each_date() {
    let rows = generate_rows(400, 20);
    for day in aggregate_daily(&rows) {
        let matching: Vec<&EventRow> = rows.iter().filter(|r| r.date == day.date).collect();

        assert_eq!(day.rows, matching.len());
        assert_eq!(
            day.totals.impressions,
            matching.iter().map(|r| r.impressions).sum::<u64>()
        );
        assert_eq!(day.totals.clicks, matching.iter().map(|r| r.clicks).sum::<u64>());
        assert_eq!(
            day.totals.conversions,
            matching.iter().map(|r| r.conversions).sum::<u64>()
        );
        assert_eq!(day.totals.leads, matching.iter().map(|r| r.leads).sum::<u64>());
        assert_eq!(
            day.totals.disqualifications,
            matching.iter().map(|r| r.disqualifications).sum::<u64>()
        );
        assert_eq!(
            day.totals.appointments,
            matching.iter().map(|r| r.appointments).sum::<u64>()
        );
        let cost: f64 = matching.iter().map(|r| r.cost).sum();
        assert!((day.totals.cost - cost).abs() < 1e-6);
    }
}

#[test]
fn test_permutation_invariance() {
    let rows = generate_rows(300, 15);
    let expected: Vec<DailyAggregate> = aggregate_daily(&rows);

    let mut reversed = rows.clone();
    reversed.reverse();
    assert_eq!(aggregate_daily(&reversed), expected);

    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..5 {
        let mut shuffled = rows.clone();
        shuffled.shuffle(&mut rng);
        assert_eq!(aggregate_daily(&shuffled), expected);
    }

    let mut by_cost = rows.clone();
    by_cost.sort_by(|a, b| b.cost.total_cmp(&a.cost));
    assert_eq!(aggregate_daily(&by_cost), expected);

    // Aggregating twice gives the same answer
    assert_eq!(aggregate_daily(&rows), expected);
}

#[test]
fn test_zero_denominators_never_raise() {
    let rows = vec![EventRow::on(base_date())];
    let day = &aggregate_daily(&rows)[0];

    for ratio in [
        day.ratios.ctr,
        day.ratios.cvr,
        day.ratios.cpl,
        day.ratios.cpa,
        day.ratios.cost_per_conversion,
    ] {
        assert_eq!(ratio, Ratio::Undefined);
        assert_eq!(ratio.to_string(), "N/A");
    }

    let summary = FunnelSummary::from_daily(&aggregate_daily(&rows));
    assert_eq!(summary.ratios.ctr.display_percent(2), "N/A");
}

#[test]
fn test_three_day_ctr_example() {
    let day = base_date();
    let rows = vec![
        EventRow {
            impressions: 0,
            clicks: 0,
            ..EventRow::on(day + Duration::days(2))
        },
        EventRow {
            impressions: 100,
            clicks: 10,
            ..EventRow::on(day)
        },
        EventRow {
            impressions: 200,
            clicks: 30,
            ..EventRow::on(day + Duration::days(1))
        },
    ];

    let ctr: Vec<Option<f64>> = aggregate_daily(&rows)
        .iter()
        .map(|d| d.ratios.ctr.value())
        .collect();
    assert_eq!(ctr, vec![Some(0.10), Some(0.15), None]);
}

#[test]
fn test_oversized_counts_saturate() {
    let csv = "\
Date,Impressions,Clicks,Conversions,Cost,Leads,Disqualifications,Appointments
2023-10-17,10000000000000000000,1,1e30,1.0,0,0,0
2023-10-17,10000000000000000000,2,1e30,2.0,0,0,0
";
    let ingested = Ingestor::from_csv_reader(csv.as_bytes()).unwrap();
    let daily = aggregate_daily(&ingested.rows);

    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0].totals.impressions, u64::MAX);
    assert_eq!(daily[0].totals.conversions, u64::MAX);
    assert_eq!(daily[0].totals.clicks, 3);

    let summary = FunnelSummary::from_daily(&daily);
    assert_eq!(summary.totals.impressions, u64::MAX);
    let breakdown = breakdown_by(&ingested.rows, Dimension::Channel);
    assert_eq!(breakdown[0].totals.conversions, u64::MAX);
}
