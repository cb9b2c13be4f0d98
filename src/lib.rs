//! RustIngest - connector framework for ingesting provider records
//!
//! This library pulls issues from Jira and files from S3, normalizes them
//! into a common item shape, and exposes the pipelines that do it through a
//! source-type registry.

pub mod config;
pub mod error;
pub mod gateways;
pub mod ingestion;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use ingestion::{NormalizedItem, Pipeline, PipelineManager};
