//! Shared key generation for storage backends.
//!
//! Key format: `{uuid-v4}.{extension}`. The client filename only contributes its
//! lower-cased extension, so keys never carry path components.

use crate::{StorageError, StorageResult};
use uuid::Uuid;
use vidvault_core::validation::extension;

/// Generate a unique storage key for an uploaded file.
///
/// The random part is a v4 UUID (122 random bits), so two uploads never share a key
/// even when the client filenames are identical.
pub fn generate_key(filename: &str) -> String {
    let id = Uuid::new_v4();
    match extension(filename).filter(|ext| is_safe_extension(ext)) {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}

fn is_safe_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Reject keys that could escape a container when mapped onto a filesystem.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty()
        || key.contains("..")
        || key.starts_with('/')
        || key.contains('\\')
        || key.contains('\0')
    {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            key
        )));
    }
    Ok(())
}

/// Public URL of an object: `{base}/{container}/{url-encoded key}`.
pub fn object_url(base_url: &str, container: &str, key: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        container,
        urlencoding::encode(key)
    )
}
