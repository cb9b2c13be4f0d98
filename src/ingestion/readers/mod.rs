//! Readers pull records from one provider and normalize them
//!
//! Every reader implements [`Reader`]. `Ok(items)` with an empty vector means
//! the provider had nothing to return; `Err` means the read as a whole failed.

pub mod jira;
pub mod s3;

use super::items::NormalizedItem;
use crate::error::Result;
use async_trait::async_trait;

pub use jira::JiraReader;
pub use s3::S3Reader;

#[async_trait]
pub trait Reader: Send + Sync {
    /// Load and normalize every item the provider exposes
    async fn load_items(&self) -> Result<Vec<NormalizedItem>>;

    /// Provider tag written into every item
    fn provider(&self) -> &str;
}
