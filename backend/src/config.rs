//! # Application Configuration
//!
//! Server settings read from a single YAML file:
//!
//! ```yaml
//! data_directory: /home/me/Documents/Daybook
//! bind_address: 127.0.0.1:3000
//! log_filter: info
//! default_currency: USD
//! prayer_times:
//!   fajr: "05:00"
//!   dhuhr: "12:30"
//!   asr: "15:45"
//!   maghrib: "18:15"
//!   isha: "19:45"
//! ```
//!
//! Every field is optional. The file is `$DAYBOOK_CONFIG` when set,
//! otherwise `daybook.yaml` in the data directory. `DAYBOOK_DATA_DIR` and
//! `DAYBOOK_BIND` override the file.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::domain::validation::currency_code;
use crate::domain::PrayerTimes;
use crate::mappers::parse_time;
use crate::storage::JsonConnection;

pub const CONFIG_ENV: &str = "DAYBOOK_CONFIG";
pub const DATA_DIR_ENV: &str = "DAYBOOK_DATA_DIR";
pub const BIND_ENV: &str = "DAYBOOK_BIND";
pub const CONFIG_FILE_NAME: &str = "daybook.yaml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Defaults to ~/Documents/Daybook
    pub data_directory: Option<PathBuf>,
    pub bind_address: String,
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` takes precedence
    pub log_filter: String,
    pub default_currency: String,
    pub prayer_times: PrayerTimesConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: None,
            bind_address: "127.0.0.1:3000".to_string(),
            log_filter: "info".to_string(),
            default_currency: "USD".to_string(),
            prayer_times: PrayerTimesConfig::default(),
        }
    }
}

/// Fixed daily prayer timings, `HH:MM`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrayerTimesConfig {
    pub fajr: String,
    pub dhuhr: String,
    pub asr: String,
    pub maghrib: String,
    pub isha: String,
}

impl Default for PrayerTimesConfig {
    fn default() -> Self {
        Self {
            fajr: "05:00".to_string(),
            dhuhr: "12:30".to_string(),
            asr: "15:45".to_string(),
            maghrib: "18:15".to_string(),
            isha: "19:45".to_string(),
        }
    }
}

impl PrayerTimesConfig {
    pub fn to_prayer_times(&self) -> Result<PrayerTimes> {
        Ok(PrayerTimes {
            fajr: parse_time("prayer_times.fajr", &self.fajr)?,
            dhuhr: parse_time("prayer_times.dhuhr", &self.dhuhr)?,
            asr: parse_time("prayer_times.asr", &self.asr)?,
            maghrib: parse_time("prayer_times.maghrib", &self.maghrib)?,
            isha: parse_time("prayer_times.isha", &self.isha)?,
        })
    }
}

impl AppConfig {
    /// Load from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load using `lookup` in place of the process environment
    pub fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let explicit_path = lookup(CONFIG_ENV).map(PathBuf::from);
        let data_directory_override = lookup(DATA_DIR_ENV).map(PathBuf::from);

        let path = match (&explicit_path, &data_directory_override) {
            (Some(path), _) => path.clone(),
            (None, Some(directory)) => directory.join(CONFIG_FILE_NAME),
            (None, None) => JsonConnection::default_data_directory()?.join(CONFIG_FILE_NAME),
        };

        let mut config = if path.exists() {
            Self::from_file(&path)?
        } else if explicit_path.is_some() {
            bail!("Config file {} does not exist", path.display());
        } else {
            Self::default()
        };

        if let Some(directory) = data_directory_override {
            config.data_directory = Some(directory);
        }
        if let Some(bind_address) = lookup(BIND_ENV) {
            config.bind_address = bind_address;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let yaml_content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&yaml_content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_yaml(yaml_content: &str) -> Result<Self> {
        if yaml_content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml_content)?)
    }

    pub fn data_directory(&self) -> Result<PathBuf> {
        match &self.data_directory {
            Some(directory) => Ok(directory.clone()),
            None => JsonConnection::default_data_directory(),
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_address
            .parse()
            .with_context(|| format!("Invalid bind address '{}'", self.bind_address))
    }

    fn validate(&mut self) -> Result<()> {
        self.default_currency = currency_code(&self.default_currency)?;
        self.prayer_times.to_prayer_times()?;
        self.socket_addr()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() -> Result<()> {
        let config = AppConfig::from_yaml("bind_address: 0.0.0.0:8080\nprayer_times:\n  fajr: \"04:30\"\n")?;

        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.default_currency, "USD");
        assert_eq!(config.prayer_times.fajr, "04:30");
        assert_eq!(config.prayer_times.isha, "19:45");
        assert_eq!(AppConfig::from_yaml("")?, AppConfig::default());
        Ok(())
    }

    #[test]
    fn test_file_in_data_directory_with_env_overrides() -> Result<()> {
        let temp_dir = TempDir::new()?;
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "default_currency: eur\nlog_filter: debug\n",
        )?;
        let data_dir = temp_dir.path().to_string_lossy().to_string();

        let config = AppConfig::load_with(env(&[
            (DATA_DIR_ENV, data_dir.as_str()),
            (BIND_ENV, "127.0.0.1:4000"),
        ]))?;

        assert_eq!(config.default_currency, "EUR");
        assert_eq!(config.log_filter, "debug");
        assert_eq!(config.data_directory()?, temp_dir.path());
        assert_eq!(config.socket_addr()?.port(), 4000);
        Ok(())
    }

    #[test]
    fn test_explicit_config_must_exist_and_be_valid() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let missing = temp_dir.path().join("nope.yaml");
        let missing = missing.to_string_lossy().to_string();
        assert!(AppConfig::load_with(env(&[(CONFIG_ENV, missing.as_str())])).is_err());

        let bad = temp_dir.path().join("bad.yaml");
        fs::write(&bad, "prayer_times:\n  asr: noon\n")?;
        let bad = bad.to_string_lossy().to_string();
        assert!(AppConfig::load_with(env(&[(CONFIG_ENV, bad.as_str())])).is_err());
        Ok(())
    }

    #[test]
    fn test_prayer_times_parse() -> Result<()> {
        let times = PrayerTimesConfig::default().to_prayer_times()?;
        assert_eq!(times, PrayerTimes::default());
        Ok(())
    }
}
