use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Storage backend types
///
/// Defined in core because configuration selects the backend before the
/// storage crate is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Azure,
    Local,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "azure" | "azure-blob" => Ok(StorageBackend::Azure),
            "local" => Ok(StorageBackend::Local),
            "memory" => Ok(StorageBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid storage backend: {}", s)),
        }
    }
}

impl Display for StorageBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            StorageBackend::Azure => write!(f, "azure"),
            StorageBackend::Local => write!(f, "local"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

/// How the service authenticates against the storage backend.
///
/// Reported verbatim by the health endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMethod {
    /// Platform identity (App Service / instance metadata endpoint)
    ManagedIdentity,
    /// Pre-issued bearer token supplied through configuration
    StaticToken,
    /// No credentials (public containers, emulators)
    Anonymous,
    /// Backend needs no credentials at all (local filesystem, in-memory)
    NotRequired,
    /// No storage backend is configured
    NotConfigured,
}

impl AuthMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthMethod::ManagedIdentity => "managed-identity",
            AuthMethod::StaticToken => "static-token",
            AuthMethod::Anonymous => "anonymous",
            AuthMethod::NotRequired => "not-required",
            AuthMethod::NotConfigured => "not-configured",
        }
    }
}

impl FromStr for AuthMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "managed-identity" | "managed_identity" | "msi" => Ok(AuthMethod::ManagedIdentity),
            "static-token" | "static_token" | "token" => Ok(AuthMethod::StaticToken),
            "anonymous" | "none" => Ok(AuthMethod::Anonymous),
            _ => Err(anyhow::anyhow!("Invalid Azure storage auth method: {}", s)),
        }
    }
}

impl Display for AuthMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_storage_backend_case_insensitively() {
        assert_eq!("Azure".parse::<StorageBackend>().unwrap(), StorageBackend::Azure);
        assert_eq!(" local ".parse::<StorageBackend>().unwrap(), StorageBackend::Local);
        assert!("s3".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn auth_method_round_trips_through_display() {
        for method in [
            AuthMethod::ManagedIdentity,
            AuthMethod::StaticToken,
            AuthMethod::Anonymous,
        ] {
            assert_eq!(method.to_string().parse::<AuthMethod>().unwrap(), method);
        }
        assert_eq!(AuthMethod::NotConfigured.to_string(), "not-configured");
    }
}
