//! Fixtures shared by the service tests.

use chrono::{NaiveDate, TimeZone, Utc};
use std::sync::Arc;

use crate::domain::clock::{Clock, FixedClock};
use crate::domain::models::category::Category;
use crate::storage::{CategoryRepository, CategoryStorage, KeyValueStore, MemoryConnection};

pub fn memory_store() -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryConnection::new())
}

/// Monday 2024-01-15, 10:00 UTC
pub fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock::new(Utc.with_ymd_and_hms(2024, 1, 15, 10, 0, 0).unwrap()))
}

pub fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").unwrap()
}

pub fn seed_category(store: &Arc<dyn KeyValueStore>, id: &str) -> Category {
    let category = Category {
        id: id.to_string(),
        name: id.to_string(),
        color: None,
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        order: None,
    };
    CategoryRepository::new(store.clone())
        .store_category(&category)
        .unwrap();
    category
}
