use shared::{
    PrayerLocation as SharedPrayerLocation, Settings as SharedSettings, UpdateSettingsRequest,
};

use crate::domain::commands::settings::UpdateSettingsCommand;
use crate::domain::models::settings::{PrayerLocation, Settings as DomainSettings};

/// Mapper to convert between shared Settings DTOs and domain Settings.
pub struct SettingsMapper;

impl SettingsMapper {
    pub fn to_domain(dto: SharedSettings) -> DomainSettings {
        DomainSettings {
            dark_mode: dto.dark_mode,
            default_currency: dto.default_currency,
            prayer_location: dto.prayer_location.map(Self::location_to_domain),
            prayer_tasks_enabled: dto.prayer_tasks_enabled,
        }
    }

    pub fn to_dto(domain: &DomainSettings) -> SharedSettings {
        SharedSettings {
            dark_mode: domain.dark_mode,
            default_currency: domain.default_currency.clone(),
            prayer_location: domain.prayer_location.as_ref().map(Self::location_to_dto),
            prayer_tasks_enabled: domain.prayer_tasks_enabled,
        }
    }

    fn location_to_domain(dto: SharedPrayerLocation) -> PrayerLocation {
        PrayerLocation {
            city: dto.city,
            country: dto.country,
            latitude: dto.latitude,
            longitude: dto.longitude,
        }
    }

    fn location_to_dto(domain: &PrayerLocation) -> SharedPrayerLocation {
        SharedPrayerLocation {
            city: domain.city.clone(),
            country: domain.country.clone(),
            latitude: domain.latitude,
            longitude: domain.longitude,
        }
    }

    pub fn to_update_command(request: UpdateSettingsRequest) -> UpdateSettingsCommand {
        UpdateSettingsCommand {
            dark_mode: request.dark_mode,
            default_currency: request.default_currency,
            prayer_location: request
                .prayer_location
                .map(|location| location.map(Self::location_to_domain)),
            prayer_tasks_enabled: request.prayer_tasks_enabled,
        }
    }
}
