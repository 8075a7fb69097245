//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p vidvault-api`. The default app is backed by
//! in-memory storage so no Azure account or emulator is needed.

#![allow(dead_code)]

pub mod fixtures;
pub mod storage;

use axum_test::TestServer;
use std::sync::Arc;
use tempfile::TempDir;
use vidvault_api::setup::routes;
use vidvault_api::state::AppState;
use vidvault_core::Config;
use vidvault_storage::{AuthMethod, MemoryStorage, StorageGateway};

/// Test application: server plus handles on the storage behind it.
pub struct TestApp {
    pub server: TestServer,
    pub memory: Option<Arc<MemoryStorage>>,
    pub container: String,
    pub _temp_dir: Option<TempDir>,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    /// In-memory backend; panics for apps built without one.
    pub fn memory(&self) -> &MemoryStorage {
        self.memory
            .as_deref()
            .expect("test app is not backed by memory storage")
    }
}

/// Development config with a known container and the given upload limit.
pub fn test_config(max_upload_size_bytes: usize) -> Config {
    let mut config = Config::default();
    config.0.base.max_upload_size_bytes = max_upload_size_bytes;
    config.0.storage.container_name = "videos".to_string();
    config
}

fn build_server(config: Config, gateway: StorageGateway) -> TestServer {
    let state = Arc::new(AppState::new(config, gateway));
    let app = routes::setup_routes(state).expect("Failed to build routes");
    TestServer::new(app.into_make_service()).expect("Failed to create test server")
}

/// App backed by in-memory storage with a 100MB upload limit.
pub fn setup_test_app() -> TestApp {
    setup_test_app_with_limit(100 * 1024 * 1024)
}

pub fn setup_test_app_with_limit(max_upload_size_bytes: usize) -> TestApp {
    setup_test_app_with_config(test_config(max_upload_size_bytes))
}

/// Memory-backed app running with the production environment name.
pub fn setup_production_app() -> TestApp {
    let mut config = test_config(100 * 1024 * 1024);
    config.0.base.environment = "production".to_string();
    setup_test_app_with_config(config)
}

pub fn setup_test_app_with_config(config: Config) -> TestApp {
    let container = config.container_name().to_string();
    let memory = Arc::new(MemoryStorage::new());
    let gateway = StorageGateway::new(memory.clone(), AuthMethod::NotRequired);

    TestApp {
        server: build_server(config, gateway),
        memory: Some(memory),
        container,
        _temp_dir: None,
    }
}

/// App whose storage account is not configured.
pub fn setup_unconfigured_app() -> TestApp {
    let config = test_config(100 * 1024 * 1024);
    let container = config.container_name().to_string();

    TestApp {
        server: build_server(config, StorageGateway::unconfigured()),
        memory: None,
        container,
        _temp_dir: None,
    }
}

/// App backed by the local filesystem under a temporary directory.
pub async fn setup_local_app() -> TestApp {
    let test_storage = storage::TestStorage::new();
    let config = test_config(100 * 1024 * 1024);
    let container = config.container_name().to_string();
    let local = test_storage.local_storage().await;
    let gateway = StorageGateway::new(Arc::new(local), AuthMethod::NotRequired);

    TestApp {
        server: build_server(config, gateway),
        memory: None,
        container,
        _temp_dir: Some(test_storage.temp_dir),
    }
}
