//! Test utilities for storage tests
//!
//! Each environment owns a temporary data directory that is removed when the
//! environment is dropped, even if the test panics.

use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use super::json::JsonConnection;
use super::traits::KeyValueStore;

pub struct TestEnvironment {
    /// Kept alive so the directory survives until drop
    _temp_dir: TempDir,
    pub connection: JsonConnection,
    pub base_path: PathBuf,
}

impl TestEnvironment {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = JsonConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub fn new_with_prefix(prefix: &str) -> Result<Self> {
        let temp_dir = TempDir::with_prefix(prefix)?;
        let base_path = temp_dir.path().to_path_buf();
        let connection = JsonConnection::new(&base_path)?;

        Ok(TestEnvironment {
            _temp_dir: temp_dir,
            connection,
            base_path,
        })
    }

    pub fn store(&self) -> Arc<dyn KeyValueStore> {
        Arc::new(self.connection.clone())
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_cleanup() -> Result<()> {
        let base_path;

        {
            let env = TestEnvironment::new_with_prefix("daybook_test_")?;
            base_path = env.base_directory().to_path_buf();
            assert!(base_path.exists());

            env.store().set("tasks", serde_json::json!([]))?;
            assert!(base_path.join("tasks.json").exists());
        }

        assert!(!base_path.exists());
        Ok(())
    }
}
