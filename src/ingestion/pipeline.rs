//! Pipeline and step abstractions
//!
//! A pipeline is an ordered list of steps. Running it calls every step in
//! insertion order, handing each one the output of the step before it. The
//! first step receives [`StepOutput::Empty`].

use super::items::NormalizedItem;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};

/// Value passed between pipeline steps
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StepOutput {
    /// No input yet, or a step that produced nothing
    Empty,
    Items(Vec<NormalizedItem>),
    Value(serde_json::Value),
}

impl StepOutput {
    pub fn is_empty(&self) -> bool {
        matches!(self, StepOutput::Empty)
    }

    pub fn items(&self) -> Option<&[NormalizedItem]> {
        match self {
            StepOutput::Items(items) => Some(items),
            _ => None,
        }
    }

    pub fn into_items(self) -> Option<Vec<NormalizedItem>> {
        match self {
            StepOutput::Items(items) => Some(items),
            _ => None,
        }
    }
}

impl Default for StepOutput {
    fn default() -> Self {
        StepOutput::Empty
    }
}

/// A single stage of a pipeline
#[async_trait]
pub trait PipelineStep: Send + Sync {
    /// Run the step with the previous step's output
    async fn call(&self, input: StepOutput) -> Result<StepOutput>;

    /// Step name used in logs
    fn name(&self) -> &str;
}

/// Ordered sequence of steps
#[derive(Default)]
pub struct Pipeline {
    steps: Vec<Box<dyn PipelineStep>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Append a step. Steps are never replaced or reordered.
    pub fn add_step<S: PipelineStep + 'static>(mut self, step: S) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Execute every step in order and return the last step's output.
    ///
    /// A step error is returned as-is and stops the run.
    pub async fn run(&self) -> Result<StepOutput> {
        info!("🚀 Running pipeline with {} step(s)", self.steps.len());

        let mut result = StepOutput::Empty;
        for (index, step) in self.steps.iter().enumerate() {
            debug!("▶️ Step {} '{}'", index, step.name());
            result = step.call(result).await?;
        }

        debug!("🏁 Pipeline finished");
        Ok(result)
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.name()).collect()
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("steps", &self.step_names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct ConstantStep {
        name: String,
        value: i64,
        seen: Arc<Mutex<Vec<StepOutput>>>,
    }

    #[async_trait]
    impl PipelineStep for ConstantStep {
        async fn call(&self, input: StepOutput) -> Result<StepOutput> {
            self.seen.lock().unwrap().push(input);
            Ok(StepOutput::Value(json!(self.value)))
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    struct FailingStep;

    #[async_trait]
    impl PipelineStep for FailingStep {
        async fn call(&self, _input: StepOutput) -> Result<StepOutput> {
            Err(AppError::ProviderError("listing failed".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn constant(value: i64, seen: &Arc<Mutex<Vec<StepOutput>>>) -> ConstantStep {
        ConstantStep {
            name: format!("step-{}", value),
            value,
            seen: Arc::clone(seen),
        }
    }

    #[tokio::test]
    async fn test_empty_pipeline_returns_empty() {
        let pipeline = Pipeline::new();

        assert!(pipeline.is_empty());
        assert_eq!(pipeline.run().await.unwrap(), StepOutput::Empty);
    }

    #[tokio::test]
    async fn test_steps_thread_outputs_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new()
            .add_step(constant(1, &seen))
            .add_step(constant(2, &seen))
            .add_step(constant(3, &seen));

        let result = pipeline.run().await.unwrap();

        assert_eq!(result, StepOutput::Value(json!(3)));
        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                StepOutput::Empty,
                StepOutput::Value(json!(1)),
                StepOutput::Value(json!(2)),
            ]
        );
        assert_eq!(pipeline.step_names(), vec!["step-1", "step-2", "step-3"]);
    }

    #[tokio::test]
    async fn test_step_error_stops_the_run() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let pipeline = Pipeline::new()
            .add_step(FailingStep)
            .add_step(constant(7, &seen));

        let result = pipeline.run().await;

        assert!(matches!(result, Err(AppError::ProviderError(_))));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_step_output_accessors() {
        assert!(StepOutput::default().is_empty());
        assert!(StepOutput::Items(Vec::new()).items().unwrap().is_empty());
        assert!(StepOutput::Value(json!(null)).into_items().is_none());
    }
}
