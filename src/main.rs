use anyhow::Context;
use dotenv::dotenv;
use rust_ingest::config::Config;
use rust_ingest::ingestion::{ingest_sources, PipelineManager};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::init().context("failed to load settings")?;
    let manager = PipelineManager::with_default_sources(&config);

    // Sources named on the command line, or every registered one
    let mut sources: Vec<String> = std::env::args().skip(1).collect();
    if sources.is_empty() {
        sources = manager.registered_sources();
    }
    if sources.is_empty() {
        anyhow::bail!("no sources configured; set ATLASSIAN_* or AWS_* variables");
    }

    tracing::info!("🚀 Ingesting sources: {}", sources.join(", "));
    let reports = ingest_sources(&manager, sources.as_slice()).await?;

    for report in &reports {
        for item in &report.items {
            println!("{}", serde_json::to_string(item)?);
        }
        tracing::info!(
            "📊 {} pipeline {}: {} item(s) in {} ms",
            report.source,
            report.pipeline_index,
            report.item_count,
            report.duration_ms
        );
    }

    Ok(())
}
