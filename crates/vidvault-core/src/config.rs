//! Configuration module
//!
//! Configuration is read once from the environment at startup (a `.env` file is honored)
//! and shared read-only for the lifetime of the process.

use std::env;

use crate::storage_types::{AuthMethod, StorageBackend};

// Common constants
const SERVER_PORT: u16 = 5000;
const MAX_UPLOAD_SIZE_MB: usize = 100;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;
const REQUEST_TIMEOUT_SECS: u64 = 300;
const DEFAULT_CONTAINER_NAME: &str = "videos";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub max_upload_size_bytes: usize,
    pub http_concurrency_limit: usize,
    pub request_timeout_secs: u64,
}

/// Object storage settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub storage_backend: StorageBackend,
    pub container_name: String,
    pub azure_storage_account_name: Option<String>,
    // Custom endpoint for emulators (Azurite) and sovereign clouds
    pub azure_storage_endpoint: Option<String>,
    pub azure_auth_method: AuthMethod,
    // User-assigned managed identity
    pub azure_client_id: Option<String>,
    pub azure_storage_bearer_token: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct UploaderConfig {
    pub base: BaseConfig,
    pub storage: StorageConfig,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<UploaderConfig>);

impl Config {
    fn inner(&self) -> &UploaderConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env_name(&self.inner().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = UploaderConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.inner().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.inner().base.max_upload_size_bytes
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.inner().base.http_concurrency_limit
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.inner().base.request_timeout_secs
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage.storage_backend
    }

    pub fn container_name(&self) -> &str {
        &self.inner().storage.container_name
    }

    pub fn azure_storage_account_name(&self) -> Option<&str> {
        self.inner().storage.azure_storage_account_name.as_deref()
    }

    pub fn azure_storage_endpoint(&self) -> Option<&str> {
        self.inner().storage.azure_storage_endpoint.as_deref()
    }

    pub fn azure_auth_method(&self) -> AuthMethod {
        self.inner().storage.azure_auth_method
    }

    pub fn azure_client_id(&self) -> Option<&str> {
        self.inner().storage.azure_client_id.as_deref()
    }

    pub fn azure_storage_bearer_token(&self) -> Option<&str> {
        self.inner().storage.azure_storage_bearer_token.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().storage.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().storage.local_storage_base_url.as_deref()
    }
}

impl Default for Config {
    /// Development defaults with no storage account configured.
    fn default() -> Self {
        Config(Box::new(UploaderConfig {
            base: BaseConfig {
                server_port: SERVER_PORT,
                cors_origins: vec!["*".to_string()],
                environment: "development".to_string(),
                max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
                http_concurrency_limit: HTTP_CONCURRENCY_LIMIT,
                request_timeout_secs: REQUEST_TIMEOUT_SECS,
            },
            storage: StorageConfig {
                storage_backend: StorageBackend::Azure,
                container_name: DEFAULT_CONTAINER_NAME.to_string(),
                azure_storage_account_name: None,
                azure_storage_endpoint: None,
                azure_auth_method: AuthMethod::ManagedIdentity,
                azure_client_id: None,
                azure_storage_bearer_token: None,
                local_storage_path: None,
                local_storage_base_url: None,
            },
        }))
    }
}

/// `production` and `prod` (any case) count as production.
pub fn is_production_env_name(environment: &str) -> bool {
    let environment = environment.to_lowercase();
    environment == "production" || environment == "prod"
}

fn megabytes_to_bytes(megabytes: usize) -> Result<usize, anyhow::Error> {
    megabytes
        .checked_mul(1024 * 1024)
        .ok_or_else(|| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB is too large: {}", megabytes))
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

impl UploaderConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins: Vec<String> = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let max_upload_size_mb: usize = env::var("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|_| MAX_UPLOAD_SIZE_MB.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be a valid number"))?;

        let base = BaseConfig {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            max_upload_size_bytes: megabytes_to_bytes(max_upload_size_mb)?,
            http_concurrency_limit: env::var("HTTP_CONCURRENCY_LIMIT")
                .ok()
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS)
                .max(1),
        };

        let storage_backend = match non_empty_var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Azure,
        };

        let azure_auth_method = match non_empty_var("AZURE_STORAGE_AUTH_METHOD") {
            Some(value) => value.parse()?,
            None => AuthMethod::ManagedIdentity,
        };

        let storage = StorageConfig {
            storage_backend,
            container_name: non_empty_var("CONTAINER_NAME")
                .unwrap_or_else(|| DEFAULT_CONTAINER_NAME.to_string()),
            azure_storage_account_name: non_empty_var("AZURE_STORAGE_ACCOUNT_NAME"),
            azure_storage_endpoint: non_empty_var("AZURE_STORAGE_ENDPOINT"),
            azure_auth_method,
            azure_client_id: non_empty_var("AZURE_CLIENT_ID"),
            azure_storage_bearer_token: non_empty_var("AZURE_STORAGE_BEARER_TOKEN"),
            local_storage_path: non_empty_var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty_var("LOCAL_STORAGE_BASE_URL"),
        };

        let config = UploaderConfig { base, storage };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.max_upload_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }

        validate_container_name(&self.storage.container_name)?;

        match self.storage.storage_backend {
            StorageBackend::Azure => {
                if self.storage.azure_auth_method == AuthMethod::StaticToken
                    && self.storage.azure_storage_bearer_token.is_none()
                {
                    return Err(anyhow::anyhow!(
                        "AZURE_STORAGE_BEARER_TOKEN must be set when AZURE_STORAGE_AUTH_METHOD=static-token"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
            StorageBackend::Memory => {}
        }

        Ok(())
    }
}

/// Azure container naming rules: 3-63 characters, lowercase letters, digits and
/// hyphens, starting and ending with a letter or digit, no consecutive hyphens.
pub fn validate_container_name(name: &str) -> Result<(), anyhow::Error> {
    let valid_chars = name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if !(3..=63).contains(&name.len())
        || !valid_chars
        || name.starts_with('-')
        || name.ends_with('-')
        || name.contains("--")
    {
        return Err(anyhow::anyhow!(
            "CONTAINER_NAME '{}' is invalid: use 3-63 lowercase letters, digits or single hyphens",
            name
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid_and_unconfigured() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.container_name(), "videos");
        assert_eq!(config.max_upload_size_bytes(), 100 * 1024 * 1024);
        assert!(config.azure_storage_account_name().is_none());
        assert!(!config.is_production());
    }

    #[test]
    fn container_name_rules() {
        assert!(validate_container_name("videos").is_ok());
        assert!(validate_container_name("my-videos-2024").is_ok());
        assert!(validate_container_name("ab").is_err());
        assert!(validate_container_name("Videos").is_err());
        assert!(validate_container_name("-videos").is_err());
        assert!(validate_container_name("videos-").is_err());
        assert!(validate_container_name("my--videos").is_err());
        assert!(validate_container_name("my_videos").is_err());
    }

    #[test]
    fn static_token_requires_token() {
        let mut config = Config::default();
        config.0.storage.azure_auth_method = AuthMethod::StaticToken;
        assert!(config.validate().is_err());

        config.0.storage.azure_storage_bearer_token = Some("token".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn local_backend_requires_path_and_base_url() {
        let mut config = Config::default();
        config.0.storage.storage_backend = StorageBackend::Local;
        assert!(config.validate().is_err());

        config.0.storage.local_storage_path = Some("/tmp/vidvault".to_string());
        assert!(config.validate().is_err());

        config.0.storage.local_storage_base_url = Some("http://localhost:5000/media".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn upload_limit_conversion_rejects_overflow() {
        assert_eq!(megabytes_to_bytes(100).unwrap(), 100 * 1024 * 1024);
        assert!(megabytes_to_bytes(usize::MAX).is_err());
        assert!(megabytes_to_bytes(usize::MAX / 1024).is_err());
    }

    #[test]
    fn production_detection() {
        assert!(is_production_env_name("production"));
        assert!(is_production_env_name("PROD"));
        assert!(!is_production_env_name("development"));
        assert!(!is_production_env_name("staging"));
    }
}
