use anyhow::{Context, Result};
use rate_service::{
    config::{AppConfig, OutputFormat},
    load_readings,
    observability::{self, MetricsReporter},
    report,
};
use time::{format_description::well_known::Rfc3339, OffsetDateTime};

fn parse_bound(name: &str, raw: &str) -> Result<OffsetDateTime> {
    OffsetDateTime::parse(raw, &Rfc3339).with_context(|| format!("invalid {name} timestamp '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let args: Vec<String> = std::env::args().collect();
    if args.len() != 4 {
        anyhow::bail!("usage: analyze_range <readings-file> <start-rfc3339> <end-rfc3339>");
    }
    let path = &args[1];
    let start = parse_bound("start", &args[2])?;
    let end = parse_bound("end", &args[3])?;

    let cfg = AppConfig::load()?;
    let metrics = MetricsReporter::install(cfg.metrics.as_ref())?;
    let readings = load_readings(path, &cfg.input)
        .await
        .with_context(|| format!("failed to load readings from {path}"))?;

    let analysis = tariff_core::analyze_range(&readings, &cfg.tariff, start, end)?;
    tracing::info!(
        readings = analysis.reading_count,
        cheapest = %analysis.comparison.cheapest,
        "range analysis complete"
    );

    match cfg.output.format {
        OutputFormat::Text => print!("{}", report::render_range(&analysis)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&analysis)?),
    }

    if let Some(metrics) = &metrics {
        metrics.flush()?;
    }

    Ok(())
}
