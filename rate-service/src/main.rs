use anyhow::{bail, Context, Result};
use rate_service::{
    config::{AppConfig, OutputFormat},
    load_readings,
    observability::{self, MetricsReporter},
    report,
};

#[tokio::main]
async fn main() -> Result<()> {
    observability::init_tracing();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: rate-service <readings-file>");
    };

    let cfg = AppConfig::load()?;
    let metrics = MetricsReporter::install(cfg.metrics.as_ref())?;
    let readings = load_readings(&path, &cfg.input)
        .await
        .with_context(|| format!("failed to load readings from {path}"))?;

    // Billing is CPU-bound; keep it off the async workers.
    let tariff = cfg.tariff.clone();
    let comparison = tokio::task::spawn_blocking(move || tariff_core::compare(&readings, &tariff)).await??;

    tracing::info!(
        months = comparison.months.len(),
        cheapest = %comparison.annual.cheapest,
        "comparison complete"
    );

    match cfg.output.format {
        OutputFormat::Text => print!("{}", report::render_comparison(&comparison)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&comparison)?),
    }

    if let Some(metrics) = &metrics {
        metrics.flush()?;
    }

    Ok(())
}
