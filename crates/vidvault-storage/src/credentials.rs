//! Azure AD token sources for Blob Storage.
//!
//! Managed identity is the production path: the token is fetched from the App Service
//! identity endpoint when `IDENTITY_ENDPOINT`/`IDENTITY_HEADER` are set, otherwise from the
//! VM instance metadata service. Tokens are cached and refreshed shortly before expiry.

use crate::traits::{StorageError, StorageResult};
use crate::AuthMethod;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use object_store::azure::AzureCredential;
use reqwest::Client;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

const STORAGE_RESOURCE: &str = "https://storage.azure.com/";
const IMDS_ENDPOINT: &str = "http://169.254.169.254/metadata/identity/oauth2/token";
const IMDS_API_VERSION: &str = "2018-02-01";
const APP_SERVICE_API_VERSION: &str = "2019-08-01";
const REFRESH_MARGIN_SECS: i64 = 300;
const TOKEN_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// A bearer token and the instant it stops being valid
#[derive(Clone)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .checked_sub_signed(ChronoDuration::seconds(REFRESH_MARGIN_SECS))
            .is_some_and(|refresh_at| refresh_at > now)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Source of bearer tokens for storage requests.
///
/// `Ok(None)` means requests go out unsigned.
#[async_trait]
pub trait TokenCredential: fmt::Debug + Send + Sync {
    async fn token(&self) -> StorageResult<Option<AccessToken>>;

    fn auth_method(&self) -> AuthMethod;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum IdentitySource {
    AppService { endpoint: String, header: String },
    Imds,
}

#[derive(Debug)]
pub struct ManagedIdentityCredential {
    client: Client,
    source: IdentitySource,
    client_id: Option<String>,
    cache: RwLock<Option<AccessToken>>,
}

impl ManagedIdentityCredential {
    /// Pick the identity endpoint from the process environment.
    pub fn from_env(client_id: Option<String>) -> Self {
        let source = match (
            std::env::var("IDENTITY_ENDPOINT").ok(),
            std::env::var("IDENTITY_HEADER").ok(),
        ) {
            (Some(endpoint), Some(header)) if !endpoint.is_empty() && !header.is_empty() => {
                IdentitySource::AppService { endpoint, header }
            }
            _ => IdentitySource::Imds,
        };

        let client = Client::builder()
            .timeout(TOKEN_REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            source,
            client_id,
            cache: RwLock::new(None),
        }
    }

    async fn fetch(&self) -> StorageResult<AccessToken> {
        let request = match &self.source {
            IdentitySource::AppService { endpoint, header } => {
                let mut query = vec![
                    ("api-version", APP_SERVICE_API_VERSION),
                    ("resource", STORAGE_RESOURCE),
                ];
                if let Some(client_id) = &self.client_id {
                    query.push(("client_id", client_id.as_str()));
                }
                self.client
                    .get(endpoint)
                    .query(&query)
                    .header("X-IDENTITY-HEADER", header)
            }
            IdentitySource::Imds => {
                let mut query = vec![
                    ("api-version", IMDS_API_VERSION),
                    ("resource", STORAGE_RESOURCE),
                ];
                if let Some(client_id) = &self.client_id {
                    query.push(("client_id", client_id.as_str()));
                }
                self.client
                    .get(IMDS_ENDPOINT)
                    .query(&query)
                    .header("Metadata", "true")
            }
        };

        let response = request.send().await.map_err(|e| {
            StorageError::Credential(format!("Managed identity token request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StorageError::Credential(format!(
                "Managed identity endpoint returned {}: {}",
                status, body
            )));
        }

        let body: Value = response.json().await.map_err(|e| {
            StorageError::Credential(format!("Invalid managed identity token response: {}", e))
        })?;

        parse_token_response(&body, Utc::now())
    }
}

#[async_trait]
impl TokenCredential for ManagedIdentityCredential {
    async fn token(&self) -> StorageResult<Option<AccessToken>> {
        let now = Utc::now();
        if let Some(token) = self.cache.read().await.as_ref() {
            if token.is_fresh(now) {
                return Ok(Some(token.clone()));
            }
        }

        let mut cache = self.cache.write().await;
        // Another task may have refreshed while we waited for the lock
        if let Some(token) = cache.as_ref() {
            if token.is_fresh(now) {
                return Ok(Some(token.clone()));
            }
        }

        let token = self.fetch().await?;
        tracing::debug!(expires_at = %token.expires_at, "Acquired managed identity token");
        *cache = Some(token.clone());
        Ok(Some(token))
    }

    fn auth_method(&self) -> AuthMethod {
        AuthMethod::ManagedIdentity
    }
}

/// A fixed bearer token from configuration.
pub struct StaticTokenCredential {
    token: String,
}

impl StaticTokenCredential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for StaticTokenCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenCredential")
            .field("token", &"<redacted>")
            .finish()
    }
}

#[async_trait]
impl TokenCredential for StaticTokenCredential {
    async fn token(&self) -> StorageResult<Option<AccessToken>> {
        Ok(Some(AccessToken {
            token: self.token.clone(),
            expires_at: DateTime::<Utc>::MAX_UTC,
        }))
    }

    fn auth_method(&self) -> AuthMethod {
        AuthMethod::StaticToken
    }
}

/// Unsigned requests, for public containers and local emulators.
#[derive(Debug, Default)]
pub struct AnonymousCredential;

#[async_trait]
impl TokenCredential for AnonymousCredential {
    async fn token(&self) -> StorageResult<Option<AccessToken>> {
        Ok(None)
    }

    fn auth_method(&self) -> AuthMethod {
        AuthMethod::Anonymous
    }
}

/// Bridges a [`TokenCredential`] into `object_store`'s credential provider.
#[derive(Debug)]
pub struct ObjectStoreCredential(pub Arc<dyn TokenCredential>);

#[async_trait]
impl object_store::CredentialProvider for ObjectStoreCredential {
    type Credential = AzureCredential;

    async fn get_credential(&self) -> object_store::Result<Arc<AzureCredential>> {
        match self.0.token().await {
            Ok(Some(token)) => Ok(Arc::new(AzureCredential::BearerToken(token.token))),
            Ok(None) => Err(object_store::Error::Generic {
                store: "MicrosoftAzure",
                source: Box::new(StorageError::Credential(
                    "No bearer token available for signed request".to_string(),
                )),
            }),
            Err(e) => Err(object_store::Error::Generic {
                store: "MicrosoftAzure",
                source: Box::new(e),
            }),
        }
    }
}

/// Parse an identity endpoint response.
///
/// `expires_on` is epoch seconds, sent as a string by App Service and IMDS but as a
/// number by some hosts. `expires_in` (seconds from now) is the fallback.
fn parse_token_response(body: &Value, now: DateTime<Utc>) -> StorageResult<AccessToken> {
    let token = body
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| StorageError::Credential("Token response has no access_token".to_string()))?
        .to_string();

    let expires_at = seconds_field(body, "expires_on")
        .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
        .or_else(|| {
            seconds_field(body, "expires_in")
                .and_then(ChronoDuration::try_seconds)
                .and_then(|delta| now.checked_add_signed(delta))
        })
        .ok_or_else(|| {
            StorageError::Credential("Token response has no usable expiry".to_string())
        })?;

    Ok(AccessToken { token, expires_at })
}

fn seconds_field(body: &Value, field: &str) -> Option<i64> {
    match body.get(field)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
