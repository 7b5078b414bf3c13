use chrono::{Duration, NaiveDate};
use funnel_forecast::{ModelConfig, Pipeline, PipelineConfig};
use funnel_metrics::{breakdown_by, Dimension, EventRow, Metric, Ratio, RowFilter};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal, Poisson};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "funnel_forecast=info,funnel_metrics=info".into()),
        )
        .init();

    println!("Funnel Forecast: Daily Pipeline Example");
    println!("=======================================\n");

    println!("Creating sample data...");
    let rows = create_sample_rows(90)?;
    println!("Sample data created: {} rows\n", rows.len());

    let config = PipelineConfig {
        horizon_days: 28,
        metric: Metric::Appointments,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(config.clone())?;
    let output = pipeline.run(&rows, &RowFilter::all());

    println!("{}", output.summary);

    println!("Breakdown by channel:");
    for part in breakdown_by(&rows, Dimension::Channel) {
        println!(
            "  {:<10} conversions: {:>5}  share: {:>8}  CPL: {}",
            part.key,
            part.totals.conversions,
            part.conversion_share.display_percent(1),
            part.ratios.cpl.display_currency()
        );
    }

    println!("\nLast week of history:");
    for day in output.daily.iter().rev().take(7).rev() {
        println!(
            "  {}  appointments: {:>3}  CTR: {:>7}  CPA: {}",
            day.date,
            day.totals.appointments,
            day.ratios.ctr.display_percent(2),
            day.ratios.cpa.display_currency()
        );
    }

    match &output.forecast {
        Ok(forecast) => {
            println!(
                "\n{} forecast with {:.0}% band ({}):",
                output.metric,
                forecast.confidence_level * 100.0,
                forecast.model
            );
            for point in forecast.future().iter().take(7) {
                println!(
                    "  {}  {:>7.2}  [{:>7.2}, {:>7.2}]",
                    point.date, point.predicted, point.lower, point.upper
                );
            }
            if let Some(accuracy) = &forecast.in_sample_accuracy {
                println!("\n{}", accuracy);
            }
        }
        Err(e) => println!("\nForecast unavailable: {}", e),
    }

    // Same data through Holt smoothing, with empty days counted as zero
    let holt = Pipeline::new(PipelineConfig {
        model: ModelConfig::Holt {
            alpha: 0.3,
            beta: 0.1,
        },
        missing_days: funnel_forecast::MissingDays::Zero,
        ..config
    })?;
    let search_only = RowFilter::all().with_values(Dimension::Channel, ["Search"]);
    let output = holt.run(&rows, &search_only);
    if let Ok(forecast) = &output.forecast {
        let total: f64 = forecast.future().iter().map(|p| p.predicted).sum();
        println!(
            "Search appointments over the next {} days ({}): {:.1}",
            forecast.horizon(),
            forecast.model,
            total
        );
    }

    // A single day cannot be forecast, but its ratios are still reported
    let one_day = create_sample_rows(1)?;
    let output = pipeline.run(&one_day, &RowFilter::all());
    println!(
        "\nOne day of data: CVR {}, forecast: {}",
        output.summary.ratios.cvr.display_percent(2),
        match &output.forecast {
            Ok(_) => "available".to_string(),
            Err(e) => e.to_string(),
        }
    );
    println!("Undefined ratios print as {}", Ratio::Undefined);

    Ok(())
}

/// Synthetic funnel rows with a weekday pattern and a slow upward trend
fn create_sample_rows(days: i64) -> Result<Vec<EventRow>, Box<dyn std::error::Error>> {
    let mut rng = StdRng::seed_from_u64(42);
    let start = NaiveDate::from_ymd_opt(2023, 7, 3).ok_or("invalid start date")?;
    let cpc = Normal::new(2.5_f64, 0.4)?;

    let mut rows = Vec::new();
    for d in 0..days {
        let date = start + Duration::days(d);
        let weekend = d % 7 >= 5;
        let growth = 1.0 + d as f64 / 180.0;

        for (channel, base) in [("Search", 4000.0), ("Social", 2500.0), ("Display", 1500.0)] {
            let mean = base * growth * if weekend { 0.6 } else { 1.0 };
            let impressions = Poisson::new(mean)?.sample(&mut rng) as u64;
            let clicks = (impressions as f64 * rng.gen_range(0.02..0.06_f64)) as u64;
            let conversions = (clicks as f64 * rng.gen_range(0.05..0.15_f64)) as u64;
            let leads = conversions + rng.gen_range(0..3u64);
            let appointments = (leads as f64 * rng.gen_range(0.2..0.5_f64)) as u64;
            let cost = clicks as f64 * cpc.sample(&mut rng).max(0.5);

            rows.push(EventRow {
                impressions,
                clicks,
                conversions,
                cost,
                leads,
                disqualifications: leads / 5,
                appointments,
                channel: Some(channel.to_string()),
                state: Some(if d % 2 == 0 { "TX" } else { "CA" }.to_string()),
                ..EventRow::on(date)
            });
        }
    }
    Ok(rows)
}
