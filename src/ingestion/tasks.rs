use super::items::NormalizedItem;
use super::manager::PipelineManager;
use super::pipeline::StepOutput;
use crate::error::Result;
use serde::Serialize;
use std::time::Instant;
use tracing::{error, info, warn};

/// Outcome of one pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct IngestionReport {
    pub source: String,
    pub pipeline_index: usize,
    pub item_count: usize,
    pub duration_ms: u128,
    pub items: Vec<NormalizedItem>,
}

/// Run every pipeline registered for each named source, one after another.
///
/// The first configuration or pipeline error is returned and stops the run.
pub async fn ingest_sources<S: AsRef<str>>(
    manager: &PipelineManager,
    sources: &[S],
) -> Result<Vec<IngestionReport>> {
    let mut reports = Vec::new();

    for source in sources {
        let source = source.as_ref();
        let pipelines = manager.create_pipeline(source)?;
        info!("🚚 Ingesting {} with {} pipeline(s)", source, pipelines.len());

        for (index, pipeline) in pipelines.iter().enumerate() {
            let started = Instant::now();
            let output = pipeline.run().await.map_err(|e| {
                error!("❌ Pipeline {} for {} failed: {}", index, source, e);
                e
            })?;

            let items = match output {
                StepOutput::Items(items) => items,
                other => {
                    warn!(
                        "⚠️ Pipeline {} for {} ended without items ({:?}); reporting 0",
                        index, source, other
                    );
                    Vec::new()
                }
            };

            reports.push(IngestionReport {
                source: source.to_string(),
                pipeline_index: index,
                item_count: items.len(),
                duration_ms: started.elapsed().as_millis(),
                items,
            });
        }
    }

    Ok(reports)
}
