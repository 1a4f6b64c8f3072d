//! # Domain Module
//!
//! Contains all business logic for Daybook.
//!
//! Two independent cores live here: a task planner (categories, subtask
//! trees, scheduling and recurrence) and a personal ledger (people,
//! loans and payments, balances). Neither knows about HTTP or files; the
//! services reach storage only through the traits in
//! [`crate::storage::traits`].
//!
//! ## Module Organization
//!
//! - **recurrence**: expands recurring tasks into virtual occurrences for a date
//! - **task_tree**: parent/child index used for subtree walks and progress
//! - **ledger**: balance fold over a person's transactions
//! - **\*_service**: CRUD and orchestration on top of the repositories
//!
//! ## Business Rules
//!
//! - Virtual occurrences are derived on every read and never stored
//! - A subtask always lives in its parent's category
//! - Deleting a task, category or person removes everything that hangs off it
//! - Balances are positive when the other person owes you

pub mod category_service;
pub mod clock;
pub mod commands;
pub mod errors;
pub mod export_service;
pub mod integrity_service;
pub mod ledger;
pub mod models;
pub mod person_service;
pub mod prayer_service;
pub mod recurrence;
pub mod settings_service;
pub mod task_service;
pub mod task_tree;
pub mod transaction_service;
pub mod validation;

#[cfg(test)]
pub mod test_support;

pub use category_service::CategoryService;
pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{DomainError, ValidationError};
pub use export_service::ExportService;
pub use integrity_service::{IntegrityReport, IntegrityService};
pub use person_service::PersonService;
pub use prayer_service::{Prayer, PrayerService, PrayerTimes, PrayerTimesProvider, StaticPrayerTimes};
pub use settings_service::SettingsService;
pub use task_service::TaskService;
pub use transaction_service::TransactionService;
