//! Pipeline builders
//!
//! A builder wires one reader into a [`LoadItemsStep`] inside a fresh
//! [`Pipeline`]. Builders only hold settings; every `build()` call creates
//! a new client, reader and pipeline.

use super::pipeline::Pipeline;
use super::readers::{JiraReader, S3Reader};
use super::steps::LoadItemsStep;
use crate::config::{JiraSettings, S3Settings, UserContext};
use crate::error::Result;
use crate::gateways::{JiraClient, S3Client};
use std::sync::Arc;
use tracing::debug;

pub trait PipelineBuilder: Send + Sync {
    fn build(&self) -> Result<Pipeline>;

    fn name(&self) -> &str;
}

/// Atlassian Jira issue ingestion
#[derive(Debug, Clone)]
pub struct JiraIngestionPipeline {
    settings: JiraSettings,
    user: UserContext,
    timeout_seconds: u64,
}

impl JiraIngestionPipeline {
    pub fn new(settings: JiraSettings, user: UserContext, timeout_seconds: u64) -> Self {
        Self {
            settings,
            user,
            timeout_seconds,
        }
    }
}

impl PipelineBuilder for JiraIngestionPipeline {
    fn build(&self) -> Result<Pipeline> {
        debug!("🔧 Building Jira ingestion pipeline for {}", self.settings.domain);

        let client = JiraClient::new(&self.settings, self.timeout_seconds)?;
        let reader = JiraReader::new(Arc::new(client), self.user.user_id.clone())
            .with_page_size(self.settings.page_size);

        Ok(Pipeline::new().add_step(LoadItemsStep::new(Box::new(reader))))
    }

    fn name(&self) -> &str {
        "atlassian_jira_ingestion"
    }
}

/// S3 bucket file ingestion
#[derive(Debug, Clone)]
pub struct S3IngestionPipeline {
    settings: S3Settings,
    user: UserContext,
}

impl S3IngestionPipeline {
    pub fn new(settings: S3Settings, user: UserContext) -> Self {
        Self { settings, user }
    }
}

impl PipelineBuilder for S3IngestionPipeline {
    fn build(&self) -> Result<Pipeline> {
        debug!("🔧 Building S3 ingestion pipeline for bucket {}", self.settings.bucket_name);

        let client = S3Client::new(&self.settings)?;
        let reader = S3Reader::new(Arc::new(client), self.settings.prefix.clone(), self.user.clone());

        Ok(Pipeline::new().add_step(LoadItemsStep::new(Box::new(reader))))
    }

    fn name(&self) -> &str {
        "aws_s3_ingestion"
    }
}
