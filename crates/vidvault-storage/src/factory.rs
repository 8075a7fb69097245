#[cfg(feature = "storage-azure")]
use crate::credentials::{
    AnonymousCredential, ManagedIdentityCredential, StaticTokenCredential, TokenCredential,
};
#[cfg(feature = "storage-azure")]
use crate::AzureBlobStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-memory")]
use crate::MemoryStorage;
#[allow(unused_imports)]
use crate::{AuthMethod, StorageBackend, StorageError, StorageGateway, StorageResult};
#[allow(unused_imports)]
use std::sync::Arc;
use vidvault_core::Config;

/// Create the storage gateway based on configuration.
///
/// Azure without an account name is not an error: the gateway comes back unconfigured
/// and every storage operation reports that instead.
pub async fn create_storage(config: &Config) -> StorageResult<StorageGateway> {
    match config.storage_backend() {
        #[cfg(feature = "storage-azure")]
        StorageBackend::Azure => {
            let Some(account) = config.azure_storage_account_name().map(String::from) else {
                tracing::warn!(
                    "AZURE_STORAGE_ACCOUNT_NAME not set; uploads and listing are disabled"
                );
                return Ok(StorageGateway::unconfigured());
            };

            let credential: Arc<dyn TokenCredential> = match config.azure_auth_method() {
                AuthMethod::ManagedIdentity => Arc::new(ManagedIdentityCredential::from_env(
                    config.azure_client_id().map(String::from),
                )),
                AuthMethod::StaticToken => {
                    let token = config.azure_storage_bearer_token().ok_or_else(|| {
                        StorageError::ConfigError(
                            "AZURE_STORAGE_BEARER_TOKEN not configured".to_string(),
                        )
                    })?;
                    Arc::new(StaticTokenCredential::new(token))
                }
                AuthMethod::Anonymous => Arc::new(AnonymousCredential),
                other => {
                    return Err(StorageError::ConfigError(format!(
                        "Unsupported Azure auth method: {}",
                        other
                    )))
                }
            };

            let auth_method = credential.auth_method();
            let storage = AzureBlobStorage::new(
                account,
                config.azure_storage_endpoint().map(String::from),
                credential,
            )?;
            tracing::info!(
                account_url = %storage.account_url(),
                auth_method = %auth_method,
                "Azure Blob Storage configured"
            );
            Ok(StorageGateway::new(Arc::new(storage), auth_method))
        }

        #[cfg(not(feature = "storage-azure"))]
        StorageBackend::Azure => Err(StorageError::ConfigError(
            "Azure storage backend not available (storage-azure feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = config
                .local_storage_path()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
                })?;
            let base_url = config
                .local_storage_base_url()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
                })?;

            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(StorageGateway::new(Arc::new(storage), AuthMethod::NotRequired))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-memory")]
        StorageBackend::Memory => Ok(StorageGateway::new(
            Arc::new(MemoryStorage::new()),
            AuthMethod::NotRequired,
        )),

        #[cfg(not(feature = "storage-memory"))]
        StorageBackend::Memory => Err(StorageError::ConfigError(
            "Memory storage backend not available (storage-memory feature not enabled)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(feature = "storage-azure")]
    #[tokio::test]
    async fn azure_without_account_is_unconfigured() {
        let gateway = create_storage(&Config::default()).await.unwrap();
        assert!(!gateway.is_configured());
        assert_eq!(gateway.auth_method(), AuthMethod::NotConfigured);
    }

    #[cfg(feature = "storage-azure")]
    #[tokio::test]
    async fn azure_static_token() {
        let mut config = Config::default();
        config.0.storage.azure_storage_account_name = Some("acct".to_string());
        config.0.storage.azure_auth_method = AuthMethod::StaticToken;
        config.0.storage.azure_storage_bearer_token = Some("token".to_string());

        let gateway = create_storage(&config).await.unwrap();
        assert!(gateway.is_configured());
        assert_eq!(gateway.auth_method(), AuthMethod::StaticToken);
        assert_eq!(gateway.backend_type(), Some(StorageBackend::Azure));
    }

    #[cfg(feature = "storage-memory")]
    #[tokio::test]
    async fn memory_backend() {
        let mut config = Config::default();
        config.0.storage.storage_backend = StorageBackend::Memory;

        let gateway = create_storage(&config).await.unwrap();
        assert_eq!(gateway.backend_type(), Some(StorageBackend::Memory));
        assert_eq!(gateway.auth_method(), AuthMethod::NotRequired);
    }

    #[cfg(feature = "storage-local")]
    #[tokio::test]
    async fn local_backend_creates_base_directory() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("nested");

        let mut config = Config::default();
        config.0.storage.storage_backend = StorageBackend::Local;
        config.0.storage.local_storage_path = Some(base.display().to_string());
        config.0.storage.local_storage_base_url = Some("http://localhost:5000/media".to_string());

        let gateway = create_storage(&config).await.unwrap();
        assert_eq!(gateway.backend_type(), Some(StorageBackend::Local));
        assert!(base.is_dir());
    }
}
