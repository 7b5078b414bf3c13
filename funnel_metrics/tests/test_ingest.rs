use chrono::NaiveDate;
use funnel_metrics::{aggregate_daily, Ingestor, MetricsError, Ratio};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::io::Write;
use tempfile::NamedTempFile;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_ingest_csv_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        "Date,Channel,State,Campaign,Type,Impressions,Clicks,Conversions,Costs,Leads,DQs,Appointments"
    )
    .unwrap();
    writeln!(file, "2023-10-17,Search,CA,Brand,search,100,10,2,\"$1,050.25\",4,1,2").unwrap();
    writeln!(file, "2023-10-17,Social,CA,Generic,display,200,30,1,49.75,2,0,n/a").unwrap();
    writeln!(file, "2023-10-18 09:30:00,Search,TX,Brand,search,0,0,0,0,0,0,").unwrap();
    writeln!(file, ",Search,TX,Brand,search,5,1,0,1,0,0,0").unwrap();

    let ingested = Ingestor::from_csv_path(file.path()).unwrap();

    assert_eq!(ingested.report.rows_read, 4);
    assert_eq!(ingested.report.skipped_rows, 1);
    assert_eq!(ingested.report.coerced_values, 1);
    assert_eq!(ingested.rows.len(), 3);

    let first = &ingested.rows[0];
    assert_eq!(first.date, ymd(2023, 10, 17));
    assert_eq!(first.cost, 1050.25);
    assert_eq!(first.disqualifications, 1);
    assert_eq!(first.campaign.as_deref(), Some("Brand"));
    assert_eq!(first.kind.as_deref(), Some("search"));

    // Non-numeric appointments coerce to zero
    assert_eq!(ingested.rows[1].appointments, 0);
    assert_eq!(ingested.rows[2].date, ymd(2023, 10, 18));

    let daily = aggregate_daily(&ingested.rows);
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].totals.cost, 1100.0);
    assert_eq!(daily[0].totals.clicks, 40);
    assert_eq!(daily[1].ratios.ctr, Ratio::Undefined);
}

#[test]
fn test_ingest_csv_missing_column() {
    let data = "Date,Impressions,Clicks,Conversions,Cost,Leads,Appointments\n2023-10-17,1,1,1,1,1,1\n";
    let err = Ingestor::from_csv_reader(data.as_bytes()).unwrap_err();

    match err {
        MetricsError::Schema { field } => assert_eq!(field, "disqualifications"),
        other => panic!("Expected schema error, got {other:?}"),
    }
}

#[test]
fn test_ingest_csv_headers_only() {
    let data = "date,impressions,clicks,conversions,cost,leads,disqualifications,appointments\n";
    let ingested = Ingestor::from_csv_reader(data.as_bytes()).unwrap();
    assert!(ingested.rows.is_empty());
    assert_eq!(ingested.report.rows_read, 0);
}

#[test]
fn test_ingest_json_records() {
    let records = vec![
        json!({
            "Date": "2023-10-17",
            "Impressions": 1000,
            "Clicks": "25",
            "Conversions": 3,
            "Cost": 75.5,
            "Leads": 5,
            "Disqualifications": null,
            "Appointments": "two",
            "Campaign": "Brand"
        }),
        json!({
            "Date": "2023-10-17T22:00:00-07:00",
            "Impressions": 500,
            "Clicks": 5,
            "Conversions": 1,
            "Cost": "24.50",
            "Leads": 1,
            "Disqualifications": 1
        }),
        json!({
            "Date": 1697587200,
            "Impressions": 10,
            "Clicks": 1,
            "Conversions": 0,
            "Cost": 1,
            "Leads": 0,
            "Disqualifications": 0,
            "Appointments": 1
        }),
    ];

    let ingested = Ingestor::from_records(&records).unwrap();
    assert_eq!(ingested.rows.len(), 3);
    assert_eq!(ingested.report.coerced_values, 1);

    let rows = &ingested.rows;
    assert_eq!(rows[0].clicks, 25);
    assert_eq!(rows[0].appointments, 0);
    assert_eq!(rows[0].disqualifications, 0);
    assert_eq!(rows[1].date, ymd(2023, 10, 17));
    assert_eq!(rows[1].cost, 24.5);
    // Appointments is absent from this record only, so it reads as zero
    assert_eq!(rows[1].appointments, 0);
    assert_eq!(rows[1].campaign, None);
    assert_eq!(rows[2].date, ymd(2023, 10, 18));

    let daily = aggregate_daily(rows);
    assert_eq!(daily.len(), 2);
    assert_eq!(daily[0].totals.impressions, 1500);
    assert_eq!(daily[0].totals.cost, 100.0);
}

#[test]
fn test_ingest_json_missing_field_everywhere() {
    let records = vec![json!({
        "Date": "2023-10-17",
        "Impressions": 1,
        "Clicks": 1,
        "Conversions": 1,
        "Cost": 1,
        "Leads": 1,
        "Disqualifications": 1
    })];

    let err = Ingestor::from_records(&records).unwrap_err();
    assert!(matches!(
        err,
        MetricsError::Schema {
            field: "appointments"
        }
    ));
}

#[test]
fn test_ingest_json_rejects_non_objects() {
    let records = vec![json!({"Date": "2023-10-17"}), json!([1, 2, 3])];
    assert!(matches!(
        Ingestor::from_records(&records),
        Err(MetricsError::InvalidRecord { index: 1 })
    ));
}

#[test]
fn test_ingest_missing_file() {
    let result = Ingestor::from_csv_path("/nonexistent/funnel.csv");
    assert!(matches!(result, Err(MetricsError::Io(_))));
}

#[test]
fn test_ingest_csv_duplicate_header_uses_first_column() {
    let csv = "\
Date,Impressions,Clicks,Conversions,Cost,Leads,Disqualifications,Appointments,Clicks
2023-10-17,100,7,1,5.0,1,0,1,99
";
    let ingested = Ingestor::from_csv_reader(csv.as_bytes()).unwrap();

    assert_eq!(ingested.rows.len(), 1);
    assert_eq!(ingested.rows[0].clicks, 7);
    assert_eq!(ingested.rows[0].date, ymd(2023, 10, 17));
}
