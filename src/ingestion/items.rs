use serde::{Deserialize, Serialize};

pub const JIRA_PROVIDER: &str = "jira";
pub const S3_PROVIDER: &str = "aws_s3";

/// Provider-independent record produced by a reader
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NormalizedItem {
    Issue(IssueItem),
    File(FileItem),
}

impl NormalizedItem {
    pub fn provider(&self) -> &str {
        match self {
            NormalizedItem::Issue(item) => &item.provider,
            NormalizedItem::File(item) => &item.provider,
        }
    }

    pub fn provider_id(&self) -> &str {
        match self {
            NormalizedItem::Issue(item) => &item.provider_id,
            NormalizedItem::File(item) => &item.provider_id,
        }
    }

    pub fn path(&self) -> &str {
        match self {
            NormalizedItem::Issue(item) => &item.path,
            NormalizedItem::File(item) => &item.path,
        }
    }

    pub fn created_at(&self) -> &str {
        match self {
            NormalizedItem::Issue(item) => &item.created_at,
            NormalizedItem::File(item) => &item.created_at,
        }
    }

    pub fn updated_at(&self) -> &str {
        match self {
            NormalizedItem::Issue(item) => &item.updated_at,
            NormalizedItem::File(item) => &item.updated_at,
        }
    }

    pub fn as_issue(&self) -> Option<&IssueItem> {
        match self {
            NormalizedItem::Issue(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileItem> {
        match self {
            NormalizedItem::File(item) => Some(item),
            _ => None,
        }
    }
}

/// A ticket-tracker issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueItem {
    pub id: String,
    pub key: String,
    pub title: String,
    pub description: String,
    pub description_html: String,
    #[serde(rename = "type")]
    pub issue_type: String,
    pub project_id: String,
    pub project_name: String,
    pub project_key: String,
    /// `{project_key}/{epic}/{issue_key}`
    pub path: String,
    pub watches: String,
    pub sprint: String,
    pub priority: String,
    pub status: String,
    pub labels: Vec<String>,
    pub assignees: Vec<String>,
    pub creator: String,
    pub reporter: String,
    pub subtasks: Vec<String>,
    pub provider: String,
    pub user_id: String,
    pub provider_id: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A file stored in a bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileItem {
    pub name: String,
    pub path: String,
    pub provider_id: String,
    pub mime_type: String,
    pub size: u64,
    pub created_at: String,
    pub updated_at: String,
    pub user_id: String,
    pub owners: Vec<String>,
    pub shared_with: Vec<String>,
    pub provider: String,
}
