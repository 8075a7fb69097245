//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage backend is not configured")]
    Unavailable,

    #[error("Container already exists: {0}")]
    ContainerAlreadyExists(String),

    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("List failed: {0}")]
    ListFailed(String),

    #[error("Failed to read upload body: {0}")]
    BodyStream(String),

    #[error("Upload body exceeds the limit of {limit_bytes} bytes")]
    PayloadTooLarge { limit_bytes: usize },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Credential error: {0}")]
    Credential(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked request body handed to [`Storage::put_object`].
pub type ByteStream<'a> = Pin<Box<dyn Stream<Item = StorageResult<Bytes>> + Send + 'a>>;

/// Outcome of a successful write
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutObjectOutput {
    /// Publicly resolvable URL of the stored object
    pub url: String,
    /// Number of bytes written
    pub size: u64,
}

/// An object as enumerated from a container
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub content_type: String,
    pub last_modified: Option<DateTime<Utc>>,
    pub url: String,
}

/// Storage abstraction trait
///
/// Every backend (Azure Blob Storage, local filesystem, in-memory) implements this trait
/// so request handlers never depend on a concrete store. Handlers go through
/// [`StorageGateway`](crate::StorageGateway), which adds the idempotent container
/// semantics on top.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Create a container.
    ///
    /// Must fail with [`StorageError::ContainerAlreadyExists`] when the container is
    /// already there, so callers can tell that case apart without inspecting messages.
    async fn create_container(&self, container: &str) -> StorageResult<()>;

    /// Check whether a container exists
    async fn container_exists(&self, container: &str) -> StorageResult<bool>;

    /// Write `data` under `key`, overwriting any existing object, and tag it with
    /// `content_type`. Returns the public URL and the byte count written.
    async fn put_object(
        &self,
        container: &str,
        key: &str,
        data: ByteStream<'_>,
        content_type: &str,
    ) -> StorageResult<PutObjectOutput>;

    /// List every object in a container, in backend order.
    ///
    /// Fails with [`StorageError::ContainerNotFound`] when the container is missing.
    async fn list_objects(&self, container: &str) -> StorageResult<Vec<StoredObject>>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
