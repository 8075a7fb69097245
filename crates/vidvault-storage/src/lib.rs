//! Vidvault Storage Library
//!
//! Storage abstraction and backends for uploaded videos: Azure Blob Storage, the local
//! filesystem and an in-memory store. Handlers only ever see [`StorageGateway`].
//!
//! # Storage key format
//!
//! Keys are flat: `{uuid-v4}.{extension}` inside the configured container. They never
//! contain `/` or `..`. Key generation lives in [`keys`] so every backend agrees.

#[cfg(feature = "storage-azure")]
pub mod azure;
#[cfg(feature = "storage-azure")]
pub mod credentials;
pub mod factory;
pub mod gateway;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-memory")]
pub mod memory;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-azure")]
pub use azure::AzureBlobStorage;
pub use factory::create_storage;
pub use gateway::StorageGateway;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-memory")]
pub use memory::MemoryStorage;
pub use traits::{ByteStream, PutObjectOutput, Storage, StorageError, StorageResult, StoredObject};
pub use vidvault_core::{AuthMethod, StorageBackend};
