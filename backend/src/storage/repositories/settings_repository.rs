//! Settings are a single JSON object rather than a collection.

use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::domain::models::settings::Settings;
use crate::mappers::SettingsMapper;
use crate::storage::records::quarantine_key;
use crate::storage::traits::{KeyValueStore, SettingsStorage};

const SETTINGS_KEY: &str = "settings";

#[derive(Clone)]
pub struct SettingsRepository {
    store: Arc<dyn KeyValueStore>,
}

impl SettingsRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    fn quarantine(&self, record: Value, reason: String) -> Result<()> {
        self.store.update(&quarantine_key(SETTINGS_KEY), &mut |current| {
            let mut entries = match current {
                Some(Value::Array(entries)) => entries,
                Some(other) => vec![other],
                None => Vec::new(),
            };
            entries.push(json!({ "record": record, "reason": reason }));
            Ok(Value::Array(entries))
        })?;
        self.store.delete(SETTINGS_KEY)?;
        Ok(())
    }
}

impl SettingsStorage for SettingsRepository {
    /// `None` when nothing valid is stored; a malformed document is
    /// quarantined so defaults apply.
    fn get_settings(&self) -> Result<Option<Settings>> {
        let Some(value) = self.store.get(SETTINGS_KEY)? else {
            return Ok(None);
        };

        match serde_json::from_value::<shared::Settings>(value.clone()) {
            Ok(dto) => Ok(Some(SettingsMapper::to_domain(dto))),
            Err(e) => {
                warn!("Quarantining malformed settings: {}", e);
                self.quarantine(value, e.to_string())?;
                Ok(None)
            }
        }
    }

    fn store_settings(&self, settings: &Settings) -> Result<()> {
        self.store
            .set(SETTINGS_KEY, serde_json::to_value(SettingsMapper::to_dto(settings))?)
    }
}
