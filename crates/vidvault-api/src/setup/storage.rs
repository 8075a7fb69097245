//! Storage setup and initialization

use vidvault_core::Config;
use vidvault_storage::{create_storage, StorageGateway};

/// Build the storage gateway.
///
/// A backend that fails to initialize does not stop the process: the error is logged
/// and the gateway stays unconfigured, so uploads and listing answer with a
/// "not configured" error while health keeps reporting.
pub async fn setup_storage(config: &Config) -> StorageGateway {
    tracing::info!(backend = %config.storage_backend(), "Initializing storage...");

    match create_storage(config).await {
        Ok(gateway) => {
            if gateway.is_configured() {
                tracing::info!(
                    backend = ?gateway.backend_type(),
                    auth_method = %gateway.auth_method(),
                    container = %config.container_name(),
                    "Storage initialized successfully"
                );
            }
            gateway
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize storage backend");
            StorageGateway::unconfigured()
        }
    }
}
