//! In-process storage backend.
//!
//! Objects live in a map guarded by a mutex. Used by tests and for running the service
//! without any cloud account (`STORAGE_BACKEND=memory`).

use crate::keys::{object_url, validate_key};
use crate::traits::{ByteStream, PutObjectOutput, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use chrono::{DateTime, Utc};
use futures::StreamExt;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

const DEFAULT_BASE_URL: &str = "http://localhost/memory";

#[derive(Debug, Clone)]
struct MemoryObject {
    data: Bytes,
    content_type: String,
    last_modified: DateTime<Utc>,
}

type Containers = HashMap<String, BTreeMap<String, MemoryObject>>;

/// Memory storage implementation
pub struct MemoryStorage {
    containers: Mutex<Containers>,
    base_url: String,
    fail_writes: AtomicBool,
    fail_creates: AtomicBool,
    fail_lists: AtomicBool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            containers: Mutex::new(HashMap::new()),
            base_url: base_url.into(),
            fail_writes: AtomicBool::new(false),
            fail_creates: AtomicBool::new(false),
            fail_lists: AtomicBool::new(false),
        }
    }

    /// Make every subsequent `put_object` fail with `WriteFailed`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `create_container` fail with `BackendError`, even for existing containers.
    pub fn set_fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    /// Make `list_objects` fail with `ListFailed`.
    pub fn set_fail_lists(&self, fail: bool) {
        self.fail_lists.store(fail, Ordering::SeqCst);
    }

    /// Stored bytes for an object (for test assertions)
    pub fn get_object(&self, container: &str, key: &str) -> Option<Bytes> {
        self.lock()
            .ok()?
            .get(container)?
            .get(key)
            .map(|o| o.data.clone())
    }

    /// Number of objects in a container, 0 if it does not exist
    pub fn object_count(&self, container: &str) -> usize {
        self.lock()
            .ok()
            .and_then(|c| c.get(container).map(|objects| objects.len()))
            .unwrap_or(0)
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Containers>> {
        self.containers
            .lock()
            .map_err(|_| StorageError::BackendError("memory storage lock poisoned".to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn create_container(&self, container: &str) -> StorageResult<()> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(StorageError::BackendError(format!(
                "simulated create failure for {}",
                container
            )));
        }
        let mut containers = self.lock()?;
        if containers.contains_key(container) {
            return Err(StorageError::ContainerAlreadyExists(container.to_string()));
        }
        containers.insert(container.to_string(), BTreeMap::new());
        Ok(())
    }

    async fn container_exists(&self, container: &str) -> StorageResult<bool> {
        Ok(self.lock()?.contains_key(container))
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        mut data: ByteStream<'_>,
        content_type: &str,
    ) -> StorageResult<PutObjectOutput> {
        validate_key(key)?;

        let mut buffer = BytesMut::new();
        while let Some(chunk) = data.next().await {
            buffer.extend_from_slice(&chunk?);
        }

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::WriteFailed(format!(
                "simulated write failure for {}",
                key
            )));
        }

        let size = buffer.len() as u64;
        let mut containers = self.lock()?;
        let objects = containers
            .get_mut(container)
            .ok_or_else(|| StorageError::WriteFailed(format!("container not found: {}", container)))?;
        objects.insert(
            key.to_string(),
            MemoryObject {
                data: buffer.freeze(),
                content_type: content_type.to_string(),
                last_modified: Utc::now(),
            },
        );

        tracing::debug!(container = %container, key = %key, size_bytes = size, "Memory storage upload successful");

        Ok(PutObjectOutput {
            url: object_url(&self.base_url, container, key),
            size,
        })
    }

    async fn list_objects(&self, container: &str) -> StorageResult<Vec<StoredObject>> {
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(StorageError::ListFailed(format!(
                "simulated list failure for {}",
                container
            )));
        }
        let containers = self.lock()?;
        let objects = containers
            .get(container)
            .ok_or_else(|| StorageError::ContainerNotFound(container.to_string()))?;

        Ok(objects
            .iter()
            .map(|(key, object)| StoredObject {
                key: key.clone(),
                size: object.data.len() as u64,
                content_type: object.content_type.clone(),
                last_modified: Some(object.last_modified),
                url: object_url(&self.base_url, container, key),
            })
            .collect())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Memory
    }
}
