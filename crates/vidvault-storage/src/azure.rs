use crate::credentials::{ObjectStoreCredential, TokenCredential};
use crate::keys::{object_url, validate_key};
use crate::traits::{ByteStream, PutObjectOutput, Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::BytesMut;
use futures::{StreamExt, TryStreamExt};
use object_store::azure::{MicrosoftAzure, MicrosoftAzureBuilder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, Attributes, ClientOptions, ObjectStore, PutMode, PutOptions, PutPayload,
};
use reqwest::{Client, RequestBuilder, StatusCode};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use vidvault_core::validation::content_type_for;

const BLOB_API_VERSION: &str = "2021-08-06";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Azure Blob Storage implementation
///
/// Object reads and writes go through `object_store`; container management uses the
/// Blob REST API directly since `object_store` has no notion of creating a container.
pub struct AzureBlobStorage {
    account: String,
    account_url: String,
    allow_http: bool,
    credential: Arc<dyn TokenCredential>,
    http: Client,
    stores: RwLock<HashMap<String, Arc<MicrosoftAzure>>>,
}

impl AzureBlobStorage {
    /// Create a new AzureBlobStorage instance
    ///
    /// # Arguments
    /// * `account` - Storage account name
    /// * `endpoint` - Optional service URL override (e.g. Azurite
    ///   "http://127.0.0.1:10000/devstoreaccount1"); defaults to
    ///   `https://{account}.blob.core.windows.net`
    /// * `credential` - Token source used to sign every request
    pub fn new(
        account: String,
        endpoint: Option<String>,
        credential: Arc<dyn TokenCredential>,
    ) -> StorageResult<Self> {
        if account.is_empty() {
            return Err(StorageError::ConfigError(
                "Azure storage account name is empty".to_string(),
            ));
        }

        let account_url = endpoint
            .map(|e| e.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{}.blob.core.windows.net", account));
        let allow_http = account_url.starts_with("http://");

        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            account,
            account_url,
            allow_http,
            credential,
            http,
            stores: RwLock::new(HashMap::new()),
        })
    }

    pub fn account_url(&self) -> &str {
        &self.account_url
    }

    /// One `object_store` client per container, built on first use.
    fn store(&self, container: &str) -> StorageResult<Arc<MicrosoftAzure>> {
        if let Some(store) = self
            .stores
            .read()
            .map_err(|_| StorageError::BackendError("Azure store cache poisoned".to_string()))?
            .get(container)
        {
            return Ok(store.clone());
        }

        let client_options = ClientOptions::new()
            .with_timeout(REQUEST_TIMEOUT)
            .with_connect_timeout(CONNECT_TIMEOUT)
            .with_allow_http(self.allow_http);

        let mut builder = MicrosoftAzureBuilder::new()
            .with_account(&self.account)
            .with_container_name(container)
            .with_endpoint(self.account_url.clone())
            .with_allow_http(self.allow_http)
            .with_client_options(client_options);

        builder = match self.credential.auth_method() {
            crate::AuthMethod::Anonymous => builder.with_skip_signature(true),
            _ => builder.with_credentials(Arc::new(ObjectStoreCredential(self.credential.clone()))),
        };

        let store = Arc::new(
            builder
                .build()
                .map_err(|e| StorageError::ConfigError(format!("Azure: {}", e)))?,
        );

        self.stores
            .write()
            .map_err(|_| StorageError::BackendError("Azure store cache poisoned".to_string()))?
            .insert(container.to_string(), store.clone());

        Ok(store)
    }

    fn container_url(&self, container: &str) -> String {
        format!("{}/{}?restype=container", self.account_url, container)
    }

    /// Attach version, date and (when available) bearer token headers.
    async fn sign(&self, request: RequestBuilder) -> StorageResult<RequestBuilder> {
        let date = chrono::Utc::now()
            .format("%a, %d %b %Y %H:%M:%S GMT")
            .to_string();
        let request = request
            .header("x-ms-version", BLOB_API_VERSION)
            .header("x-ms-date", date);

        Ok(match self.credential.token().await? {
            Some(token) => request.bearer_auth(token.token),
            None => request,
        })
    }
}

fn error_code(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get("x-ms-error-code")
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

#[async_trait]
impl Storage for AzureBlobStorage {
    async fn create_container(&self, container: &str) -> StorageResult<()> {
        let request = self.sign(self.http.put(self.container_url(container))).await?;
        let response = request
            .header(reqwest::header::CONTENT_LENGTH, 0)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(format!("Create container request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            tracing::info!(account = %self.account, container = %container, "Azure container created");
            return Ok(());
        }

        let code = error_code(&response);
        if status == StatusCode::CONFLICT && code.as_deref() == Some("ContainerAlreadyExists") {
            return Err(StorageError::ContainerAlreadyExists(container.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(StorageError::BackendError(format!(
            "Create container returned {} ({}): {}",
            status,
            code.unwrap_or_else(|| "no error code".to_string()),
            body
        )))
    }

    async fn container_exists(&self, container: &str) -> StorageResult<bool> {
        let request = self.sign(self.http.head(self.container_url(container))).await?;
        let response = request
            .send()
            .await
            .map_err(|e| StorageError::BackendError(format!("Container lookup failed: {}", e)))?;

        match response.status() {
            status if status.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            status => Err(StorageError::BackendError(format!(
                "Container lookup returned {}",
                status
            ))),
        }
    }

    async fn put_object(
        &self,
        container: &str,
        key: &str,
        mut data: ByteStream<'_>,
        content_type: &str,
    ) -> StorageResult<PutObjectOutput> {
        validate_key(key)?;
        let store = self.store(container)?;

        let mut buffer = BytesMut::new();
        while let Some(chunk) = data.next().await {
            buffer.extend_from_slice(&chunk?);
        }
        let size = buffer.len() as u64;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let options = PutOptions {
            mode: PutMode::Overwrite,
            attributes,
            ..Default::default()
        };

        let location = Path::from(key);
        let start = std::time::Instant::now();

        store
            .put_opts(&location, PutPayload::from(buffer.freeze()), options)
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    container = %container,
                    key = %key,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Azure upload failed"
                );
                StorageError::WriteFailed(e.to_string())
            })?;

        tracing::info!(
            container = %container,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Azure upload successful"
        );

        Ok(PutObjectOutput {
            url: object_url(&self.account_url, container, key),
            size,
        })
    }

    async fn list_objects(&self, container: &str) -> StorageResult<Vec<StoredObject>> {
        if !self.container_exists(container).await? {
            return Err(StorageError::ContainerNotFound(container.to_string()));
        }

        let store = self.store(container)?;
        let metas: Vec<_> = store
            .list(None)
            .try_collect()
            .await
            .map_err(|e| match e {
                ObjectStoreError::NotFound { .. } => {
                    StorageError::ContainerNotFound(container.to_string())
                }
                other => StorageError::ListFailed(other.to_string()),
            })?;

        Ok(metas
            .into_iter()
            .map(|meta| {
                let key = meta.location.to_string();
                StoredObject {
                    content_type: content_type_for(&key).to_string(),
                    size: meta.size as u64,
                    last_modified: Some(meta.last_modified),
                    url: object_url(&self.account_url, container, &key),
                    key,
                }
            })
            .collect())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Azure
    }
}
