use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Minimal issue reference returned by an issue search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    pub id: String,
    #[serde(default)]
    pub key: String,
}

impl IssueRef {
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }
}

/// One object as reported by a bucket listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredObject {
    pub key: String,
    pub last_modified: DateTime<Utc>,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub content_length: u64,
    pub last_modified: DateTime<Utc>,
    pub content_type: Option<String>,
    pub e_tag: Option<String>,
    /// User-defined object metadata
    pub metadata: HashMap<String, String>,
}

/// Client for a ticket-tracking provider
#[async_trait]
pub trait IssueTrackerClient: Send + Sync {
    /// Fetch one page of the issue search starting at `start_at`
    async fn list_issues(&self, start_at: usize, max_results: usize) -> Result<Vec<IssueRef>>;

    /// Fetch the full issue record. `expand` names extra sections such as
    /// `renderedFields`.
    async fn get_issue_data(&self, issue_id: &str, expand: &[&str]) -> Result<serde_json::Value>;
}

/// Client for an object-storage bucket
#[async_trait]
pub trait ObjectStorageClient: Send + Sync {
    /// List every object under `prefix`, across all listing pages
    async fn list_files(&self, prefix: &str) -> Result<Vec<StoredObject>>;

    /// Download `key` to `destination` and return the written path
    async fn download_file(&self, key: &str, destination: &Path) -> Result<PathBuf>;

    async fn get_file_metadata(&self, key: &str) -> Result<FileMetadata>;
}
