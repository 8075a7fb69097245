//! Storage gateway used by request handlers.
//!
//! The gateway is built once at startup and injected into the application state. It owns
//! an optional backend: when storage configuration is missing (or the backend failed to
//! initialize) every storage operation fails with [`StorageError::Unavailable`] instead of
//! the process refusing to start.

use crate::traits::{ByteStream, PutObjectOutput, Storage, StorageError, StorageResult, StoredObject};
use crate::{AuthMethod, StorageBackend};
use std::sync::Arc;

#[derive(Clone)]
pub struct StorageGateway {
    backend: Option<Arc<dyn Storage>>,
    auth_method: AuthMethod,
}

impl StorageGateway {
    pub fn new(backend: Arc<dyn Storage>, auth_method: AuthMethod) -> Self {
        Self {
            backend: Some(backend),
            auth_method,
        }
    }

    /// A gateway with no backend; every operation reports `Unavailable`.
    pub fn unconfigured() -> Self {
        Self {
            backend: None,
            auth_method: AuthMethod::NotConfigured,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.backend.is_some()
    }

    pub fn auth_method(&self) -> AuthMethod {
        self.auth_method
    }

    pub fn backend_type(&self) -> Option<StorageBackend> {
        self.backend.as_ref().map(|b| b.backend_type())
    }

    fn backend(&self) -> StorageResult<&Arc<dyn Storage>> {
        self.backend.as_ref().ok_or(StorageError::Unavailable)
    }

    /// Create the container unless it already exists.
    pub async fn ensure_container(&self, container: &str) -> StorageResult<()> {
        match self.backend()?.create_container(container).await {
            Ok(()) => {
                tracing::info!(container = %container, "Container created");
                Ok(())
            }
            Err(StorageError::ContainerAlreadyExists(_)) => {
                tracing::debug!(container = %container, "Container already exists");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, container = %container, "Container creation failed");
                Err(e)
            }
        }
    }

    pub async fn put_object(
        &self,
        container: &str,
        key: &str,
        data: ByteStream<'_>,
        content_type: &str,
    ) -> StorageResult<PutObjectOutput> {
        self.backend()?
            .put_object(container, key, data, content_type)
            .await
    }

    /// List a container; `None` when the container has not been created yet.
    pub async fn list_existing(&self, container: &str) -> StorageResult<Option<Vec<StoredObject>>> {
        match self.backend()?.list_objects(container).await {
            Ok(objects) => Ok(Some(objects)),
            Err(StorageError::ContainerNotFound(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// List a container; a missing container yields an empty list.
    pub async fn list_objects(&self, container: &str) -> StorageResult<Vec<StoredObject>> {
        Ok(self.list_existing(container).await?.unwrap_or_default())
    }
}

#[cfg(all(test, feature = "storage-memory"))]
mod tests {
    use super::*;
    use crate::MemoryStorage;
    use bytes::Bytes;
    use futures::stream;

    fn body(data: &'static [u8]) -> ByteStream<'static> {
        Box::pin(stream::iter(vec![Ok(Bytes::from_static(data))]))
    }

    fn gateway() -> StorageGateway {
        StorageGateway::new(Arc::new(MemoryStorage::new()), AuthMethod::NotRequired)
    }

    #[tokio::test]
    async fn unconfigured_gateway_reports_unavailable() {
        let gateway = StorageGateway::unconfigured();
        assert!(!gateway.is_configured());
        assert_eq!(gateway.auth_method(), AuthMethod::NotConfigured);

        assert!(matches!(
            gateway.ensure_container("videos").await,
            Err(StorageError::Unavailable)
        ));
        assert!(matches!(
            gateway.put_object("videos", "a.mp4", body(b"x"), "video/mp4").await,
            Err(StorageError::Unavailable)
        ));
        assert!(matches!(
            gateway.list_objects("videos").await,
            Err(StorageError::Unavailable)
        ));
    }

    #[tokio::test]
    async fn ensure_container_is_idempotent() {
        let gateway = gateway();
        gateway.ensure_container("videos").await.unwrap();
        gateway.ensure_container("videos").await.unwrap();
    }

    #[tokio::test]
    async fn missing_container_lists_empty() {
        let gateway = gateway();
        assert!(gateway.list_existing("videos").await.unwrap().is_none());
        assert!(gateway.list_objects("videos").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn put_then_list() {
        let gateway = gateway();
        gateway.ensure_container("videos").await.unwrap();
        let output = gateway
            .put_object("videos", "abc.mp4", body(b"12345"), "video/mp4")
            .await
            .unwrap();
        assert_eq!(output.size, 5);

        let objects = gateway.list_objects("videos").await.unwrap();
        assert_eq!(objects.len(), 1);
        assert_eq!(objects[0].key, "abc.mp4");
        assert_eq!(objects[0].size, 5);
        assert_eq!(objects[0].content_type, "video/mp4");
        assert_eq!(objects[0].url, output.url);
    }
}
