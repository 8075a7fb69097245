//! Vidvault Core Library
//!
//! This crate provides configuration, error types, upload validation and the
//! response models shared by the storage and API crates.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{BaseConfig, Config, StorageConfig, UploaderConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::{AuthMethod, StorageBackend};
