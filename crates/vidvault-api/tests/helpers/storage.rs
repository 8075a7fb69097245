use std::path::PathBuf;
use tempfile::TempDir;
use vidvault_storage::LocalStorage;

/// Temporary directory for filesystem-backed tests.
pub struct TestStorage {
    pub temp_dir: TempDir,
    pub base_path: PathBuf,
    pub base_url: String,
}

impl TestStorage {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
        let base_path = temp_dir.path().to_path_buf();
        let base_url = "http://localhost:5000/media".to_string();
        Self {
            temp_dir,
            base_path,
            base_url,
        }
    }

    pub async fn local_storage(&self) -> LocalStorage {
        LocalStorage::new(self.base_path.clone(), self.base_url.clone())
            .await
            .expect("Failed to create local storage")
    }
}

impl Default for TestStorage {
    fn default() -> Self {
        Self::new()
    }
}
