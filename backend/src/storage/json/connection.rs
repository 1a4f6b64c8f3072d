use anyhow::{anyhow, Context, Result};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info, warn};

use crate::storage::traits::KeyValueStore;

/// JsonConnection stores each key as a `<key>.json` file in the data directory
#[derive(Clone)]
pub struct JsonConnection {
    base_directory: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl JsonConnection {
    /// Create a new JSON connection with a base directory
    pub fn new<P: AsRef<Path>>(base_directory: P) -> Result<Self> {
        let base_path = base_directory.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).with_context(|| {
                format!("Failed to create data directory {}", base_path.display())
            })?;
            info!("Created data directory: {}", base_path.display());
        }

        Ok(Self {
            base_directory: base_path,
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// ~/Documents/Daybook, falling back to the home directory when the
    /// platform has no documents folder
    pub fn default_data_directory() -> Result<PathBuf> {
        let documents_dir = dirs::document_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
            .ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Ok(documents_dir.join("Daybook"))
    }

    pub fn base_directory(&self) -> &Path {
        &self.base_directory
    }

    /// File backing `key`. Characters that are awkward in file names
    /// (the `::` of quarantine keys included) become underscores.
    pub fn file_path(&self, key: &str) -> PathBuf {
        let file_stem: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.base_directory.join(format!("{}.json", file_stem))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| anyhow!("storage lock poisoned"))
    }

    fn read(&self, key: &str) -> Result<Option<Value>> {
        let path = self.file_path(key);
        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str(&contents) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                // Hand the raw text up as a single value; record decoding
                // quarantines it instead of failing every request.
                warn!("{} is not valid JSON ({}); treating it as malformed", path.display(), e);
                Ok(Some(Value::String(contents)))
            }
        }
    }

    /// Write through a temp file and rename so readers never see a partial file
    fn write(&self, key: &str, value: &Value) -> Result<()> {
        let path = self.file_path(key);
        let temp_path = path.with_extension("json.tmp");

        let bytes = serde_json::to_vec_pretty(value)
            .with_context(|| format!("Failed to serialize '{}'", key))?;
        fs::write(&temp_path, bytes)
            .with_context(|| format!("Failed to write {}", temp_path.display()))?;
        fs::rename(&temp_path, &path)
            .with_context(|| format!("Failed to replace {}", path.display()))?;

        debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl KeyValueStore for JsonConnection {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        self.read(key)
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        let _guard = self.lock()?;
        self.write(key, &value)
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let _guard = self.lock()?;
        let path = self.file_path(key);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).with_context(|| format!("Failed to delete {}", path.display()))?;
        Ok(true)
    }

    fn update(&self, key: &str, apply: &mut dyn FnMut(Option<Value>) -> Result<Value>) -> Result<()> {
        let _guard = self.lock()?;
        let current = self.read(key)?;
        let updated = apply(current)?;
        self.write(key, &updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_set_get_delete() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let connection = JsonConnection::new(temp_dir.path())?;

        assert_eq!(connection.get("tasks")?, None);

        connection.set("tasks", json!([{"id": "task::1"}]))?;
        assert_eq!(connection.get("tasks")?, Some(json!([{"id": "task::1"}])));
        assert!(temp_dir.path().join("tasks.json").exists());

        assert!(connection.delete("tasks")?);
        assert!(!connection.delete("tasks")?);
        assert_eq!(connection.get("tasks")?, None);
        Ok(())
    }

    #[test]
    fn test_update_leaves_no_temp_file() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let connection = JsonConnection::new(temp_dir.path())?;

        connection.update("people", &mut |current| {
            assert!(current.is_none());
            Ok(json!(["first"]))
        })?;
        connection.update("people", &mut |current| {
            let mut items = current.and_then(|v| v.as_array().cloned()).unwrap_or_default();
            items.push(json!("second"));
            Ok(Value::Array(items))
        })?;

        assert_eq!(connection.get("people")?, Some(json!(["first", "second"])));
        assert!(!temp_dir.path().join("people.json.tmp").exists());
        Ok(())
    }

    #[test]
    fn test_failed_update_keeps_previous_value() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let connection = JsonConnection::new(temp_dir.path())?;
        connection.set("settings", json!({"darkMode": true}))?;

        let result = connection.update("settings", &mut |_| Err(anyhow!("rejected")));

        assert!(result.is_err());
        assert_eq!(connection.get("settings")?, Some(json!({"darkMode": true})));
        Ok(())
    }

    #[test]
    fn test_quarantine_key_file_name() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let connection = JsonConnection::new(temp_dir.path())?;

        assert_eq!(
            connection.file_path("quarantine::tasks"),
            temp_dir.path().join("quarantine__tasks.json")
        );
        Ok(())
    }

    #[test]
    fn test_corrupt_file_is_returned_as_raw_text() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let connection = JsonConnection::new(temp_dir.path())?;
        fs::write(temp_dir.path().join("tasks.json"), "[{\"id\": ")?;

        assert_eq!(connection.get("tasks")?, Some(Value::String("[{\"id\": ".to_string())));
        Ok(())
    }

    #[test]
    fn test_creates_missing_directory() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let nested = temp_dir.path().join("a").join("b");

        let connection = JsonConnection::new(&nested)?;

        assert!(nested.is_dir());
        assert_eq!(connection.base_directory(), nested.as_path());
        Ok(())
    }
}
