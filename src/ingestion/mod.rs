//! Ingestion pipelines
//!
//! Pulls records from external providers and normalizes them into
//! [`NormalizedItem`]s.
//!
//! ## Architecture
//!
//! - **Reader**: one implementation per provider, owns pagination and normalization
//! - **Pipeline**: ordered [`PipelineStep`]s, each fed the previous output
//! - **Builder**: wires a reader into a [`LoadItemsStep`] inside a fresh pipeline
//! - **Manager**: maps a source-type name to its builders
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rust_ingest::config::Config;
//! use rust_ingest::ingestion::PipelineManager;
//!
//! # async fn run() -> rust_ingest::Result<()> {
//! let manager = PipelineManager::with_default_sources(&Config::init()?);
//! for pipeline in manager.create_pipeline("atlassian")? {
//!     let output = pipeline.run().await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod builders;
pub mod items;
pub mod manager;
pub mod pipeline;
pub mod readers;
pub mod steps;
pub mod tasks;


pub use builders::{JiraIngestionPipeline, PipelineBuilder, S3IngestionPipeline};
pub use items::{FileItem, IssueItem, NormalizedItem};
pub use manager::{constructor, BuilderConstructor, PipelineManager, ATLASSIAN_SOURCE, S3_SOURCE};
pub use pipeline::{Pipeline, PipelineStep, StepOutput};
pub use readers::{JiraReader, Reader, S3Reader};
pub use steps::LoadItemsStep;
pub use tasks::{ingest_sources, IngestionReport};
