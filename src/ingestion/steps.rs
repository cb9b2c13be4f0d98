use super::pipeline::{PipelineStep, StepOutput};
use super::readers::Reader;
use crate::error::Result;
use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

/// Step that ignores its input and loads every item from a reader
pub struct LoadItemsStep {
    reader: Box<dyn Reader>,
    task_id: String,
}

impl LoadItemsStep {
    pub fn new(reader: Box<dyn Reader>) -> Self {
        Self::with_task_id(reader, Uuid::new_v4().to_string())
    }

    pub fn with_task_id(reader: Box<dyn Reader>, task_id: impl Into<String>) -> Self {
        Self {
            reader,
            task_id: task_id.into(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }
}

#[async_trait]
impl PipelineStep for LoadItemsStep {
    async fn call(&self, input: StepOutput) -> Result<StepOutput> {
        if !input.is_empty() {
            debug!("🔁 [{}] load_items ignores its input", self.task_id);
        }

        info!("📥 [{}] Loading items from {}", self.task_id, self.reader.provider());
        let items = self.reader.load_items().await?;
        info!("📦 [{}] Loaded {} item(s)", self.task_id, items.len());

        Ok(StepOutput::Items(items))
    }

    fn name(&self) -> &str {
        "load_items"
    }
}
