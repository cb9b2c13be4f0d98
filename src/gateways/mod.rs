//! Provider clients
//!
//! Readers talk to providers only through the traits in [`traits`], so the
//! HTTP and object-storage details stay here and readers can be exercised
//! against in-memory fakes.

pub mod jira;
pub mod s3;
pub mod traits;

pub use jira::{JiraAuth, JiraClient};
pub use s3::S3Client;
pub use traits::{FileMetadata, IssueRef, IssueTrackerClient, ObjectStorageClient, StoredObject};
