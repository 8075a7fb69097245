//! Application state shared by every handler.

use vidvault_core::Config;
use vidvault_storage::StorageGateway;

/// Immutable configuration plus the storage gateway, wrapped in `Arc` by the router.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: StorageGateway,
}

impl AppState {
    pub fn new(config: Config, storage: StorageGateway) -> Self {
        Self { config, storage }
    }

    pub fn container_name(&self) -> &str {
        self.config.container_name()
    }

    /// Upload limit in whole megabytes, as shown to clients.
    pub fn max_upload_size_mb(&self) -> usize {
        self.config.max_upload_size_bytes() / 1024 / 1024
    }
}
