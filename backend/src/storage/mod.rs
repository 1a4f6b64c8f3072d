//! # Storage Module
//!
//! Handles all data persistence for Daybook.
//!
//! Everything is kept in a key-value store of JSON documents: one document
//! per collection (`tasks`, `categories`, `people`, `transactions`,
//! `task_completions`) plus a `settings` object. The production store writes
//! one file per key into the data directory; tests use the in-memory store.
//!
//! ## Key Responsibilities
//!
//! - **Data Persistence**: atomic file writes through a temp file and rename
//! - **Boundary Validation**: each stored record is decoded into its domain
//!   type on load; records that fail are moved to `quarantine::<key>`
//! - **Storage Abstraction**: services see the per-entity traits in
//!   [`traits`], never the raw store

pub mod json;
pub mod memory;
pub mod records;
pub mod repositories;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use json::JsonConnection;
pub use memory::MemoryConnection;
pub use records::RecordError;
pub use repositories::{
    CategoryRepository, CompletionRepository, PersonRepository, SettingsRepository,
    TaskRepository, TransactionRepository,
};
pub use traits::{
    CategoryStorage, CompletionStorage, KeyValueStore, PersonStorage, SettingsStorage,
    TaskStorage, TransactionStorage,
};
