//! Shared test utilities for creating test environments.
//!
//! This module is only compiled when running tests (`#[cfg(test)]`).

use crate::storage::KeyValueStore;
use crate::{Config, Result};
use anyhow::anyhow;
use tempfile::TempDir;

/// Test environment that sets up an expenses home directory with Config and database.
/// Holds TempDir to keep the directory alive for the duration of the test.
pub struct TestEnv {
    _temp_dir: TempDir,
    config: Config,
}

impl TestEnv {
    /// Creates a test environment with Config and initialized database.
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("expenses");
        let config = Config::create(&root).await.unwrap();

        Self {
            _temp_dir: temp_dir,
            config,
        }
    }

    /// Returns a clone of the Config.
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// The expenses home directory.
    pub fn home(&self) -> std::path::PathBuf {
        self.config.root().to_path_buf()
    }
}

/// A `KeyValueStore` whose every operation fails, e.g. a full disk or a revoked permission.
pub struct FailingStore;

#[async_trait::async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Err(anyhow!("storage unavailable"))
    }

    async fn set(&self, _key: &str, _value: &str) -> Result<()> {
        Err(anyhow!("storage unavailable"))
    }

    async fn remove(&self, _keys: &[&str]) -> Result<()> {
        Err(anyhow!("storage unavailable"))
    }

    async fn set_many(&self, _entries: &[(&str, &str)]) -> Result<()> {
        Err(anyhow!("storage unavailable"))
    }
}
