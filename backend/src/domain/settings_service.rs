use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::domain::commands::settings::UpdateSettingsCommand;
use crate::domain::models::settings::{PrayerLocation, Settings};
use crate::domain::validation::{currency_code, required_text};
use crate::storage::{KeyValueStore, SettingsRepository, SettingsStorage};

/// Service for user preferences
#[derive(Clone)]
pub struct SettingsService {
    settings: SettingsRepository,
    default_currency: String,
}

impl SettingsService {
    /// `default_currency` applies until the user stores settings of their own
    pub fn new(store: Arc<dyn KeyValueStore>, default_currency: impl Into<String>) -> Self {
        Self {
            settings: SettingsRepository::new(store),
            default_currency: default_currency.into(),
        }
    }

    pub fn get_settings(&self) -> Result<Settings> {
        Ok(self
            .settings
            .get_settings()?
            .unwrap_or_else(|| Settings::with_currency(self.default_currency.clone())))
    }

    /// Partial update; omitted fields keep their current value
    pub fn update_settings(&self, command: UpdateSettingsCommand) -> Result<Settings> {
        info!("Updating settings: {:?}", command);

        let mut settings = self.get_settings()?;

        if let Some(dark_mode) = command.dark_mode {
            settings.dark_mode = dark_mode;
        }
        if let Some(currency) = command.default_currency {
            settings.default_currency = currency_code(&currency)?;
        }
        if let Some(location) = command.prayer_location {
            settings.prayer_location = location.map(Self::validate_location).transpose()?;
        }
        if let Some(enabled) = command.prayer_tasks_enabled {
            settings.prayer_tasks_enabled = enabled;
        }

        self.settings.store_settings(&settings)?;
        info!("Settings updated");
        Ok(settings)
    }

    fn validate_location(location: PrayerLocation) -> Result<PrayerLocation> {
        Ok(PrayerLocation {
            city: required_text("prayerLocation.city", &location.city, 100)?,
            country: required_text("prayerLocation.country", &location.country, 100)?,
            latitude: location.latitude,
            longitude: location.longitude,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{as_validation, ValidationError};
    use crate::storage::MemoryConnection;

    fn service() -> SettingsService {
        SettingsService::new(Arc::new(MemoryConnection::new()), "GBP")
    }

    #[test]
    fn test_defaults_until_saved() -> Result<()> {
        let service = service();

        let settings = service.get_settings()?;

        assert_eq!(settings.default_currency, "GBP");
        assert!(settings.prayer_tasks_enabled);
        assert!(!settings.dark_mode);
        Ok(())
    }

    #[test]
    fn test_partial_update() -> Result<()> {
        let service = service();

        service.update_settings(UpdateSettingsCommand {
            dark_mode: Some(true),
            prayer_location: Some(Some(PrayerLocation {
                city: " Cairo ".to_string(),
                country: "Egypt".to_string(),
                latitude: Some(30.04),
                longitude: Some(31.24),
            })),
            ..Default::default()
        })?;
        let settings = service.update_settings(UpdateSettingsCommand {
            default_currency: Some("egp".to_string()),
            ..Default::default()
        })?;

        assert!(settings.dark_mode);
        assert_eq!(settings.default_currency, "EGP");
        assert_eq!(settings.prayer_location.map(|l| l.city), Some("Cairo".to_string()));
        assert_eq!(service.get_settings()?.default_currency, "EGP");
        Ok(())
    }

    #[test]
    fn test_clearing_location() -> Result<()> {
        let service = service();
        service.update_settings(UpdateSettingsCommand {
            prayer_location: Some(Some(PrayerLocation {
                city: "Oslo".to_string(),
                country: "Norway".to_string(),
                latitude: None,
                longitude: None,
            })),
            ..Default::default()
        })?;

        let settings = service.update_settings(UpdateSettingsCommand {
            prayer_location: Some(None),
            ..Default::default()
        })?;

        assert!(settings.prayer_location.is_none());
        Ok(())
    }

    #[test]
    fn test_rejects_bad_currency() {
        let error = service()
            .update_settings(UpdateSettingsCommand {
                default_currency: Some("dollars".to_string()),
                ..Default::default()
            })
            .unwrap_err();

        assert!(matches!(
            as_validation(&error),
            Some(ValidationError::InvalidCurrency(_))
        ));
    }
}
