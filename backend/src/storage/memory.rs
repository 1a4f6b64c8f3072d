//! In-process key-value store, used by tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use serde_json::Value;

use crate::storage::traits::KeyValueStore;

#[derive(Clone, Default)]
pub struct MemoryConnection {
    entries: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> Result<MutexGuard<'_, HashMap<String, Value>>> {
        self.entries
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl KeyValueStore for MemoryConnection {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<()> {
        self.entries()?.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.entries()?.remove(key).is_some())
    }

    fn update(&self, key: &str, apply: &mut dyn FnMut(Option<Value>) -> Result<Value>) -> Result<()> {
        let mut entries = self.entries()?;
        let updated = apply(entries.get(key).cloned())?;
        entries.insert(key.to_string(), updated);
        Ok(())
    }
}
