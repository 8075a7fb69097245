use crate::keys::{object_url, validate_key};
use crate::traits::{ByteStream, PutObjectOutput, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use vidvault_core::validation::content_type_for;

/// Local filesystem storage implementation
///
/// Each container is a directory under `base_path`; objects are flat files inside it.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for containers (e.g., "/var/lib/vidvault")
    /// * `base_url` - Base URL the directory is served from (e.g., "http://localhost:5000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    fn container_path(&self, container: &str) -> StorageResult<PathBuf> {
        if container.contains('/') {
            return Err(StorageError::InvalidKey(format!(
                "Container name contains a path separator: {}",
                container
            )));
        }
        validate_key(container)?;
        Ok(self.base_path.join(container))
    }

    /// Generated keys are flat, so any separator is rejected outright.
    fn object_path(&self, container: &str, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        if key.contains('/') {
            return Err(StorageError::InvalidKey(format!(
                "Storage key contains a path separator: {}",
                key
            )));
        }
        Ok(self.container_path(container)?.join(key))
    }

    async fn remove_partial(path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            tracing::warn!(error = %e, path = %path.display(), "Failed to remove partial upload");
        }
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn create_container(&self, container: &str) -> StorageResult<()> {
        let path = self.container_path(container)?;
        match fs::create_dir(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                Err(StorageError::ContainerAlreadyExists(container.to_string()))
            }
            Err(e) => Err(StorageError::BackendError(format!(
                "Failed to create container directory {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn container_exists(&self, container: &str) -> StorageResult<bool> {
        let path = self.container_path(container)?;
        Ok(fs::metadata(&path)
            .await
            .map(|meta| meta.is_dir())
            .unwrap_or(false))
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        mut data: ByteStream<'_>,
        _content_type: &str,
    ) -> StorageResult<PutObjectOutput> {
        let path = self.object_path(container, key)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let mut size: u64 = 0;
        while let Some(chunk) = data.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(e) => {
                    drop(file);
                    Self::remove_partial(&path).await;
                    return Err(e);
                }
            };
            if let Err(e) = file.write_all(&chunk).await {
                drop(file);
                Self::remove_partial(&path).await;
                return Err(StorageError::WriteFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                )));
            }
            size += chunk.len() as u64;
        }

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(PutObjectOutput {
            url: object_url(&self.base_url, container, key),
            size,
        })
    }

    async fn list_objects(&self, container: &str) -> StorageResult<Vec<StoredObject>> {
        let path = self.container_path(container)?;

        let mut entries = match fs::read_dir(&path).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::ContainerNotFound(container.to_string()));
            }
            Err(e) => {
                return Err(StorageError::ListFailed(format!(
                    "Failed to read container directory {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let mut objects = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StorageError::ListFailed(e.to_string()))?
        {
            let meta = entry
                .metadata()
                .await
                .map_err(|e| StorageError::ListFailed(e.to_string()))?;
            if !meta.is_file() {
                continue;
            }
            let Some(key) = entry.file_name().to_str().map(String::from) else {
                continue;
            };
            objects.push(StoredObject {
                content_type: content_type_for(&key).to_string(),
                size: meta.len(),
                last_modified: meta.modified().ok().map(DateTime::<Utc>::from),
                url: object_url(&self.base_url, container, &key),
                key,
            });
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
