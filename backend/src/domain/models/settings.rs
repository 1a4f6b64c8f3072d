//! Domain model for user settings.

#[derive(Debug, Clone, PartialEq)]
pub struct PrayerLocation {
    pub city: String,
    pub country: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub dark_mode: bool,
    pub default_currency: String,
    pub prayer_location: Option<PrayerLocation>,
    pub prayer_tasks_enabled: bool,
}

impl Settings {
    pub fn with_currency(default_currency: impl Into<String>) -> Self {
        Self {
            dark_mode: false,
            default_currency: default_currency.into(),
            prayer_location: None,
            prayer_tasks_enabled: true,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::with_currency("USD")
    }
}
