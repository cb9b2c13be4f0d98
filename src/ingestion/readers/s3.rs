use super::Reader;
use crate::config::UserContext;
use crate::error::Result;
use crate::gateways::{ObjectStorageClient, StoredObject};
use crate::ingestion::items::{FileItem, NormalizedItem, S3_PROVIDER};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Reads the files stored under a bucket prefix
pub struct S3Reader {
    client: Arc<dyn ObjectStorageClient>,
    prefix: String,
    user: UserContext,
}

impl S3Reader {
    pub fn new(client: Arc<dyn ObjectStorageClient>, prefix: impl Into<String>, user: UserContext) -> Self {
        Self {
            client,
            prefix: prefix.into(),
            user,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    fn to_item(&self, object: &StoredObject) -> FileItem {
        let timestamp = object.last_modified.to_rfc3339();
        let owners = if self.user.email.is_empty() {
            Vec::new()
        } else {
            vec![self.user.email.clone()]
        };

        FileItem {
            name: file_name(&object.key).to_string(),
            path: object.key.clone(),
            provider_id: object.key.clone(),
            mime_type: guess_mime_type(&object.key),
            size: object.size,
            created_at: timestamp.clone(),
            updated_at: timestamp,
            user_id: self.user.user_id.clone(),
            owners,
            shared_with: Vec::new(),
            provider: S3_PROVIDER.to_string(),
        }
    }

    /// Download a previously listed file into `directory`, keeping its basename.
    pub async fn download_item(&self, item: &FileItem, directory: &Path) -> Result<PathBuf> {
        let destination = directory.join(&item.name);
        self.client.download_file(&item.path, &destination).await
    }
}

#[async_trait]
impl Reader for S3Reader {
    async fn load_items(&self) -> Result<Vec<NormalizedItem>> {
        info!("🪣 Listing files under prefix '{}'", self.prefix);
        let objects = self.client.list_files(&self.prefix).await?;

        let items: Vec<NormalizedItem> = objects
            .iter()
            .filter(|object| {
                let is_dir = object.key.ends_with('/');
                if is_dir {
                    debug!("📁 Skipping directory marker {}", object.key);
                }
                !is_dir
            })
            .map(|object| NormalizedItem::File(self.to_item(object)))
            .collect();

        info!("✅ Collected {} file(s) from S3", items.len());
        Ok(items)
    }

    fn provider(&self) -> &str {
        S3_PROVIDER
    }
}

fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

/// Infer a MIME type from the key's file extension.
pub fn guess_mime_type(key: &str) -> String {
    let extension = Path::new(file_name(key))
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let mime = match extension.as_str() {
        "txt" | "log" => "text/plain",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "yaml" | "yml" => "application/yaml",
        "toml" => "application/toml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "gz" => "application/gzip",
        "tar" => "application/x-tar",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "mp4" => "video/mp4",
        _ => DEFAULT_MIME_TYPE,
    };
    mime.to_string()
}
