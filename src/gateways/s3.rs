use super::traits::{FileMetadata, ObjectStorageClient, StoredObject};
use crate::config::S3Settings;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, GetOptions, ObjectMeta, ObjectStore};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// S3 bucket client
pub struct S3Client {
    store: Arc<dyn ObjectStore>,
    bucket_name: String,
}

impl S3Client {
    pub fn new(settings: &S3Settings) -> Result<Self> {
        let store = Self::build_store(settings)?;
        info!("🪣 S3 client ready for bucket: {}", settings.bucket_name);

        Ok(Self {
            store: Arc::new(store),
            bucket_name: settings.bucket_name.clone(),
        })
    }

    /// Wrap any `ObjectStore`; used for local and in-memory stores
    pub fn with_store(store: Arc<dyn ObjectStore>, bucket_name: impl Into<String>) -> Self {
        Self {
            store,
            bucket_name: bucket_name.into(),
        }
    }

    pub fn bucket_name(&self) -> &str {
        &self.bucket_name
    }

    fn build_store(settings: &S3Settings) -> Result<AmazonS3> {
        let mut builder = AmazonS3Builder::new()
            .with_bucket_name(&settings.bucket_name)
            .with_region(&settings.region)
            .with_access_key_id(&settings.access_key_id)
            .with_secret_access_key(&settings.secret_access_key);

        if let Some(token) = &settings.session_token {
            builder = builder.with_token(token);
        }

        builder
            .build()
            .map_err(|e| AppError::ConfigurationError(format!("Invalid S3 settings: {}", e)))
    }
}

fn to_stored_object(meta: ObjectMeta) -> StoredObject {
    StoredObject {
        key: meta.location.to_string(),
        last_modified: meta.last_modified,
        size: meta.size as u64,
    }
}

/// The complete path segments of a raw S3 prefix. `object_store` lists by
/// whole segments, so `reports/2024-` is listed under `reports`.
fn listing_base(prefix: &str) -> Option<ObjectPath> {
    let base = prefix.rfind('/').map_or("", |end| &prefix[..end]);
    let base = base.trim_matches('/');
    (!base.is_empty()).then(|| ObjectPath::from(base))
}

fn key_of(meta: &ObjectMeta) -> &str {
    meta.location.as_ref()
}

fn parent_of(key: &str) -> &str {
    key.rfind('/').map_or("", |end| &key[..end])
}

/// Listed keys come back with the trailing `/` of directory markers
/// stripped. A key is a marker when another listed key lives under it, or
/// when it is empty and the store reports it as a common prefix.
fn restore_directory_markers(
    objects: Vec<ObjectMeta>,
    folder_prefixes: &HashSet<String>,
) -> Vec<StoredObject> {
    let ancestors: HashSet<&str> = objects
        .iter()
        .flat_map(|meta| {
            let key = key_of(meta);
            key.match_indices('/').map(move |(end, _)| &key[..end])
        })
        .collect();

    let markers: HashSet<String> = objects
        .iter()
        .map(key_of)
        .filter(|key| ancestors.contains(key))
        .map(str::to_string)
        .collect();

    objects
        .into_iter()
        .map(|meta| {
            let mut object = to_stored_object(meta);
            if markers.contains(&object.key)
                || (object.size == 0 && folder_prefixes.contains(&object.key))
            {
                object.key.push('/');
            }
            object
        })
        .collect()
}

impl S3Client {
    /// Common prefixes next to every empty object, used to spot empty folder markers
    async fn folder_prefixes(&self, objects: &[ObjectMeta]) -> Result<HashSet<String>> {
        let parents: BTreeSet<&str> = objects
            .iter()
            .filter(|meta| meta.size == 0)
            .map(|meta| parent_of(key_of(meta)))
            .collect();

        let mut prefixes = HashSet::new();
        for parent in parents {
            let parent_path = (!parent.is_empty()).then(|| ObjectPath::from(parent));
            let listing = self
                .store
                .list_with_delimiter(parent_path.as_ref())
                .await
                .map_err(|e| AppError::ProviderError(format!("Error listing folders: {}", e)))?;
            prefixes.extend(listing.common_prefixes.iter().map(|p| p.to_string()));
        }

        Ok(prefixes)
    }
}

#[async_trait]
impl ObjectStorageClient for S3Client {
    async fn list_files(&self, prefix: &str) -> Result<Vec<StoredObject>> {
        let prefix = prefix.trim_start_matches('/');
        let base = listing_base(prefix);

        let objects: Vec<ObjectMeta> = self
            .store
            .list(base.as_ref())
            .try_collect()
            .await
            .map_err(|e| AppError::ProviderError(format!("Error listing files: {}", e)))?;

        let folder_prefixes = self.folder_prefixes(&objects).await?;
        let files: Vec<StoredObject> = restore_directory_markers(objects, &folder_prefixes)
            .into_iter()
            .filter(|object| object.key.starts_with(prefix))
            .collect();

        debug!("📋 Listed {} object(s) under '{}'", files.len(), prefix);
        Ok(files)
    }

    async fn download_file(&self, key: &str, destination: &Path) -> Result<PathBuf> {
        let location = ObjectPath::from(key);
        let body = self.store.get(&location).await?.bytes().await?;

        if let Some(parent) = destination.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(destination, &body).await?;

        debug!("📥 Downloaded {} ({} bytes) to {}", key, body.len(), destination.display());
        Ok(destination.to_path_buf())
    }

    async fn get_file_metadata(&self, key: &str) -> Result<FileMetadata> {
        let options = GetOptions {
            head: true,
            ..Default::default()
        };
        let result = self.store.get_opts(&ObjectPath::from(key), options).await?;

        let mut content_type = None;
        let mut metadata = HashMap::new();
        for (attribute, value) in result.attributes.iter() {
            let value: &str = value.as_ref();
            match attribute {
                Attribute::ContentType => content_type = Some(value.to_string()),
                Attribute::Metadata(name) => {
                    metadata.insert(name.to_string(), value.to_string());
                }
                _ => {}
            }
        }

        Ok(FileMetadata {
            content_length: result.meta.size as u64,
            last_modified: result.meta.last_modified,
            content_type,
            e_tag: result.meta.e_tag,
            metadata,
        })
    }
}
