//! Pipeline manager implementation
//!
//! The manager is a registry from a source-type name (`"atlassian"`,
//! `"aws_s3"`, ...) to the builders that produce its pipelines. It is built
//! once at startup and handed to whatever runs the pipelines.

use super::builders::{JiraIngestionPipeline, PipelineBuilder, S3IngestionPipeline};
use super::pipeline::Pipeline;
use crate::config::Config;
use crate::error::{AppError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const ATLASSIAN_SOURCE: &str = "atlassian";
pub const S3_SOURCE: &str = "aws_s3";

/// Produces a fresh builder each time it is called
pub type BuilderConstructor = Arc<dyn Fn() -> Box<dyn PipelineBuilder> + Send + Sync>;

/// Wrap a closure returning a concrete builder as a [`BuilderConstructor`]
pub fn constructor<B, F>(make: F) -> BuilderConstructor
where
    B: PipelineBuilder + 'static,
    F: Fn() -> B + Send + Sync + 'static,
{
    Arc::new(move || Box::new(make()) as Box<dyn PipelineBuilder>)
}

#[derive(Default)]
pub struct PipelineManager {
    builders: HashMap<String, Vec<BuilderConstructor>>,
}

impl PipelineManager {
    pub fn new() -> Self {
        Self {
            builders: HashMap::new(),
        }
    }

    /// Manager with a source registered for every provider present in `config`
    pub fn with_default_sources(config: &Config) -> Self {
        let mut manager = Self::new();

        if let Some(jira) = &config.jira {
            let jira = jira.clone();
            let user = config.user.clone();
            let timeout = config.http_timeout_seconds;
            manager.register(
                ATLASSIAN_SOURCE,
                vec![constructor(move || {
                    JiraIngestionPipeline::new(jira.clone(), user.clone(), timeout)
                })],
            );
        }

        if let Some(s3) = &config.s3 {
            let s3 = s3.clone();
            let user = config.user.clone();
            manager.register(
                S3_SOURCE,
                vec![constructor(move || S3IngestionPipeline::new(s3.clone(), user.clone()))],
            );
        }

        info!(
            "🎯 PipelineManager initialized with sources: {:?}",
            manager.registered_sources()
        );
        manager
    }

    /// Register the builders for a source type, replacing any earlier registration
    pub fn register(&mut self, source_type: &str, builders: Vec<BuilderConstructor>) {
        info!(
            "🏭 Registering {} builder(s) for source type: {}",
            builders.len(),
            source_type
        );
        if self.builders.insert(source_type.to_string(), builders).is_some() {
            debug!("♻️ Replaced previous registration for: {}", source_type);
        }
    }

    /// Build one pipeline per registered builder, in registration order
    pub fn create_pipeline(&self, source_type: &str) -> Result<Vec<Pipeline>> {
        let Some(builders) = self.builders.get(source_type) else {
            error!("❌ Unsupported source type requested: {}", source_type);
            return Err(AppError::ConfigurationError(format!(
                "Unsupported source type {} not registered",
                source_type
            )));
        };

        let mut instances = Vec::with_capacity(builders.len());
        for make in builders {
            let builder = make();
            debug!("🔨 Building pipeline '{}' for {}", builder.name(), source_type);
            instances.push(builder.build()?);
        }

        Ok(instances)
    }

    pub fn is_registered(&self, source_type: &str) -> bool {
        self.builders.contains_key(source_type)
    }

    /// Registered source types, sorted
    pub fn registered_sources(&self) -> Vec<String> {
        let mut sources: Vec<String> = self.builders.keys().cloned().collect();
        sources.sort();
        sources
    }

    pub fn builder_count(&self, source_type: &str) -> usize {
        self.builders.get(source_type).map_or(0, Vec::len)
    }
}
