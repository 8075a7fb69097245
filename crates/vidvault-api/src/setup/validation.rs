//! Configuration validation
//!
//! Validates configuration at startup to catch misconfigurations early.

use anyhow::Result;
use vidvault_core::{AuthMethod, Config, StorageBackend};

const MAX_SINGLE_PUT_BYTES: u64 = 5000 * 1024 * 1024;

/// Validate configuration values
///
/// Hard errors come from [`Config::validate`]; risky but workable settings only warn so
/// the service still starts.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() {
        if config.cors_origins().iter().any(|o| o == "*") {
            tracing::warn!(
                "CORS allows all origins in production; set CORS_ORIGINS to restrict it"
            );
        }

        if config.storage_backend() != StorageBackend::Azure {
            tracing::warn!(
                backend = %config.storage_backend(),
                "Non-Azure storage backend in production; stored videos are not durable across hosts"
            );
        }

        if config.storage_backend() == StorageBackend::Azure
            && config.azure_auth_method() == AuthMethod::StaticToken
        {
            tracing::warn!("Static bearer token in production; tokens expire and are not refreshed");
        }
    }

    if config.max_upload_size_bytes() as u64 > MAX_SINGLE_PUT_BYTES {
        tracing::warn!(
            max_upload_size_mb = config.max_upload_size_bytes() / 1024 / 1024,
            "Upload limit above 5000MB; Azure single-request uploads are capped there"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_passes() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn hard_errors_propagate() {
        let mut config = Config::default();
        config.0.storage.container_name = "Bad_Name".to_string();
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn production_wildcard_cors_only_warns() {
        let mut config = Config::default();
        config.0.base.environment = "production".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
