//! Daily prayer tasks.
//!
//! Prayer times come from a [`PrayerTimesProvider`]. The bundled
//! [`StaticPrayerTimes`] returns configured fixed timings; a provider that
//! calls an online timetable can be plugged in behind the same trait.
//!
//! Scheduling a date writes one high-priority task per prayer into the
//! `prayers` category. Task ids are derived from the date and prayer name,
//! so scheduling the same date again updates the times in place and keeps
//! any completion the user already recorded.

use anyhow::Result;
use chrono::{NaiveDate, NaiveTime};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

use crate::domain::clock::Clock;
use crate::domain::commands::prayers::PrayerSchedule;
use crate::domain::models::category::{Category, PRAYERS_CATEGORY_ID};
use crate::domain::models::settings::PrayerLocation;
use crate::domain::models::task::{Priority, Task};
use crate::domain::settings_service::SettingsService;
use crate::storage::{CategoryRepository, CategoryStorage, KeyValueStore, TaskRepository, TaskStorage};

const PRAYERS_CATEGORY_NAME: &str = "Prayers";
const PRAYERS_CATEGORY_COLOR: &str = "#10b981";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// In the order they fall during the day
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }

    pub fn task_id(&self, date: NaiveDate) -> String {
        format!("{}{}", prayer_task_prefix(date), self.name())
    }
}

fn prayer_task_prefix(date: NaiveDate) -> String {
    format!("prayer::{}::", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrayerTimes {
    pub fajr: NaiveTime,
    pub dhuhr: NaiveTime,
    pub asr: NaiveTime,
    pub maghrib: NaiveTime,
    pub isha: NaiveTime,
}

impl PrayerTimes {
    pub fn time(&self, prayer: Prayer) -> NaiveTime {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }
}

impl Default for PrayerTimes {
    fn default() -> Self {
        let at = |hour, minute| NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN);
        Self {
            fajr: at(5, 0),
            dhuhr: at(12, 30),
            asr: at(15, 45),
            maghrib: at(18, 15),
            isha: at(19, 45),
        }
    }
}

/// Source of prayer timings for a date and, optionally, a location
pub trait PrayerTimesProvider: Send + Sync {
    fn prayer_times(&self, date: NaiveDate, location: Option<&PrayerLocation>) -> Result<PrayerTimes>;
}

/// Same timings every day, wherever the user is
#[derive(Debug, Clone, Default)]
pub struct StaticPrayerTimes {
    times: PrayerTimes,
}

impl StaticPrayerTimes {
    pub fn new(times: PrayerTimes) -> Self {
        Self { times }
    }
}

impl PrayerTimesProvider for StaticPrayerTimes {
    fn prayer_times(&self, _date: NaiveDate, _location: Option<&PrayerLocation>) -> Result<PrayerTimes> {
        Ok(self.times)
    }
}

#[derive(Clone)]
pub struct PrayerService {
    tasks: TaskRepository,
    categories: CategoryRepository,
    settings_service: SettingsService,
    provider: Arc<dyn PrayerTimesProvider>,
    clock: Arc<dyn Clock>,
}

impl PrayerService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        settings_service: SettingsService,
        provider: Arc<dyn PrayerTimesProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tasks: TaskRepository::new(store.clone()),
            categories: CategoryRepository::new(store),
            settings_service,
            provider,
            clock,
        }
    }

    /// Replace the prayer tasks of `date` with freshly timed ones.
    ///
    /// Returns an empty schedule without touching storage when prayer tasks
    /// are turned off in settings.
    pub fn schedule_prayers(&self, date: NaiveDate) -> Result<PrayerSchedule> {
        info!("Scheduling prayers for {}", date);

        let settings = self.settings_service.get_settings()?;
        if !settings.prayer_tasks_enabled {
            info!("Prayer tasks are disabled; nothing scheduled");
            return Ok(PrayerSchedule {
                date,
                tasks: Vec::new(),
            });
        }

        let location = settings.prayer_location.as_ref();
        let times = self.provider.prayer_times(date, location)?;
        self.ensure_prayers_category()?;

        let prefix = prayer_task_prefix(date);
        let existing: HashMap<String, Task> = self
            .tasks
            .list_tasks()?
            .into_iter()
            .filter(|task| task.id.starts_with(&prefix))
            .map(|task| (task.id.clone(), task))
            .collect();

        let description = location.map(|location| format!("{}, {}", location.city, location.country));
        let now = self.clock.now();
        let tasks: Vec<Task> = Prayer::ALL
            .iter()
            .map(|prayer| {
                let id = prayer.task_id(date);
                let previous = existing.get(&id);
                Task {
                    title: prayer.name().to_string(),
                    description: description.clone(),
                    completed: previous.is_some_and(|task| task.completed),
                    completed_at: previous.and_then(|task| task.completed_at),
                    parent_id: None,
                    scheduled_date: Some(date),
                    scheduled_time: Some(times.time(*prayer)),
                    priority: Priority::High,
                    created_at: previous.and_then(|task| task.created_at).or(Some(now)),
                    ..Task::new(id, prayer.name(), PRAYERS_CATEGORY_ID)
                }
            })
            .collect();

        let stale: Vec<String> = existing
            .keys()
            .filter(|id| !tasks.iter().any(|task| &task.id == *id))
            .cloned()
            .collect();
        if !stale.is_empty() {
            self.tasks.delete_tasks(&stale)?;
        }
        self.tasks.store_tasks(&tasks)?;

        info!("Scheduled {} prayer tasks for {}", tasks.len(), date);
        Ok(PrayerSchedule { date, tasks })
    }

    fn ensure_prayers_category(&self) -> Result<()> {
        if self.categories.get_category(PRAYERS_CATEGORY_ID)?.is_some() {
            return Ok(());
        }

        info!("Creating the {} category", PRAYERS_CATEGORY_NAME);
        self.categories.store_category(&Category {
            id: PRAYERS_CATEGORY_ID.to_string(),
            name: PRAYERS_CATEGORY_NAME.to_string(),
            color: Some(PRAYERS_CATEGORY_COLOR.to_string()),
            created_at: self.clock.now(),
            order: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::commands::settings::UpdateSettingsCommand;
    use crate::domain::test_support::{date, fixed_clock, memory_store};
    use std::sync::Mutex;

    struct Fixture {
        service: PrayerService,
        settings: SettingsService,
        tasks: TaskRepository,
        categories: CategoryRepository,
    }

    fn fixture_with(provider: Arc<dyn PrayerTimesProvider>) -> Fixture {
        let store = memory_store();
        let settings = SettingsService::new(store.clone(), "USD");
        Fixture {
            service: PrayerService::new(store.clone(), settings.clone(), provider, fixed_clock()),
            settings,
            tasks: TaskRepository::new(store.clone()),
            categories: CategoryRepository::new(store),
        }
    }

    fn fixture() -> Fixture {
        fixture_with(Arc::new(StaticPrayerTimes::default()))
    }

    /// Remembers which location it was asked about
    struct RecordingProvider {
        seen: Mutex<Vec<Option<String>>>,
    }

    impl PrayerTimesProvider for RecordingProvider {
        fn prayer_times(&self, _date: NaiveDate, location: Option<&PrayerLocation>) -> Result<PrayerTimes> {
            self.seen
                .lock()
                .unwrap()
                .push(location.map(|location| location.city.clone()));
            Ok(PrayerTimes::default())
        }
    }

    #[test]
    fn test_schedules_five_prayers_in_their_category() -> Result<()> {
        let fixture = fixture();

        let schedule = fixture.service.schedule_prayers(date("2024-03-10"))?;

        let titles: Vec<&str> = schedule.tasks.iter().map(|task| task.title.as_str()).collect();
        assert_eq!(titles, vec!["Fajr", "Dhuhr", "Asr", "Maghrib", "Isha"]);
        assert_eq!(schedule.tasks[0].id, "prayer::2024-03-10::Fajr");
        assert!(schedule.tasks.iter().all(|task| task.priority == Priority::High));
        assert_eq!(schedule.tasks[1].scheduled_time, NaiveTime::from_hms_opt(12, 30, 0));

        let category = fixture.categories.get_category(PRAYERS_CATEGORY_ID)?.unwrap();
        assert_eq!(category.name, "Prayers");
        assert_eq!(fixture.tasks.list_tasks()?.len(), 5);
        Ok(())
    }

    #[test]
    fn test_rescheduling_keeps_completion_and_replaces_in_place() -> Result<()> {
        let fixture = fixture();
        let day = date("2024-03-10");
        fixture.service.schedule_prayers(day)?;
        fixture.service.schedule_prayers(date("2024-03-11"))?;

        let mut fajr = fixture.tasks.get_task("prayer::2024-03-10::Fajr")?.unwrap();
        fajr.completed = true;
        fixture.tasks.store_task(&fajr)?;

        let schedule = fixture.service.schedule_prayers(day)?;

        assert!(schedule.tasks[0].completed);
        assert!(!schedule.tasks[1].completed);
        assert_eq!(fixture.tasks.list_tasks()?.len(), 10);
        Ok(())
    }

    #[test]
    fn test_disabled_schedules_nothing() -> Result<()> {
        let fixture = fixture();
        fixture.settings.update_settings(UpdateSettingsCommand {
            prayer_tasks_enabled: Some(false),
            ..Default::default()
        })?;

        let schedule = fixture.service.schedule_prayers(date("2024-03-10"))?;

        assert!(schedule.tasks.is_empty());
        assert!(fixture.categories.get_category(PRAYERS_CATEGORY_ID)?.is_none());
        Ok(())
    }

    #[test]
    fn test_provider_receives_configured_location() -> Result<()> {
        let provider = Arc::new(RecordingProvider {
            seen: Mutex::new(Vec::new()),
        });
        let fixture = fixture_with(provider.clone());
        fixture.settings.update_settings(UpdateSettingsCommand {
            prayer_location: Some(Some(PrayerLocation {
                city: "Istanbul".to_string(),
                country: "Turkey".to_string(),
                latitude: None,
                longitude: None,
            })),
            ..Default::default()
        })?;

        let schedule = fixture.service.schedule_prayers(date("2024-03-10"))?;

        assert_eq!(*provider.seen.lock().unwrap(), vec![Some("Istanbul".to_string())]);
        assert_eq!(schedule.tasks[0].description.as_deref(), Some("Istanbul, Turkey"));
        Ok(())
    }
}
