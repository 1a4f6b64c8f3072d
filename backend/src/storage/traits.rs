//! # Storage Traits
//!
//! This module defines the storage abstraction traits that allow different
//! storage backends to be used interchangeably in the domain layer.
//!
//! The lowest layer is [`KeyValueStore`]: a JSON document per key. The
//! per-entity traits sit on top of it and speak domain types only.

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::Value;

use crate::domain::models::category::Category;
use crate::domain::models::person::Person;
use crate::domain::models::settings::Settings;
use crate::domain::models::task::{Task, TaskCompletion};
use crate::domain::models::transaction::Transaction;

/// Persistent key-value collaborator holding one JSON document per key.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>>;

    fn set(&self, key: &str, value: Value) -> Result<()>;

    /// Returns true if the key existed
    fn delete(&self, key: &str) -> Result<bool>;

    /// Read-modify-write of a single key, run while holding the store's lock.
    /// Nothing is written if `apply` fails.
    fn update(&self, key: &str, apply: &mut dyn FnMut(Option<Value>) -> Result<Value>) -> Result<()>;
}

/// Trait defining the interface for task storage operations.
///
/// Only master and one-off tasks are ever stored; virtual occurrences of
/// recurring tasks are rejected.
pub trait TaskStorage: Send + Sync {
    /// All stored tasks, in insertion order
    fn list_tasks(&self) -> Result<Vec<Task>>;

    fn get_task(&self, task_id: &str) -> Result<Option<Task>>;

    /// Insert or replace by id
    fn store_task(&self, task: &Task) -> Result<()>;

    /// Insert or replace several tasks in one write
    fn store_tasks(&self, tasks: &[Task]) -> Result<()>;

    /// Returns the ids that were actually removed
    fn delete_tasks(&self, task_ids: &[String]) -> Result<Vec<String>>;
}

pub trait CategoryStorage: Send + Sync {
    fn list_categories(&self) -> Result<Vec<Category>>;

    fn get_category(&self, category_id: &str) -> Result<Option<Category>>;

    fn store_category(&self, category: &Category) -> Result<()>;

    fn store_categories(&self, categories: &[Category]) -> Result<()>;

    fn delete_category(&self, category_id: &str) -> Result<bool>;
}

pub trait PersonStorage: Send + Sync {
    fn list_people(&self) -> Result<Vec<Person>>;

    fn get_person(&self, person_id: &str) -> Result<Option<Person>>;

    fn store_person(&self, person: &Person) -> Result<()>;

    fn delete_person(&self, person_id: &str) -> Result<bool>;
}

pub trait TransactionStorage: Send + Sync {
    fn list_transactions(&self) -> Result<Vec<Transaction>>;

    fn list_transactions_for_person(&self, person_id: &str) -> Result<Vec<Transaction>>;

    fn get_transaction(&self, transaction_id: &str) -> Result<Option<Transaction>>;

    fn store_transaction(&self, transaction: &Transaction) -> Result<()>;

    /// Returns the ids of the removed transactions
    fn delete_transactions_where(&self, predicate: &dyn Fn(&Transaction) -> bool) -> Result<Vec<String>>;
}

/// Completion records for occurrences of recurring tasks.
pub trait CompletionStorage: Send + Sync {
    fn list_completions(&self) -> Result<Vec<TaskCompletion>>;

    fn completions_on(&self, date: NaiveDate) -> Result<Vec<TaskCompletion>>;

    fn get_completion(&self, task_id: &str, date: NaiveDate) -> Result<Option<TaskCompletion>>;

    /// Insert or replace by `(task_id, date)`
    fn store_completion(&self, completion: &TaskCompletion) -> Result<()>;

    /// Returns how many records were removed
    fn delete_completions_where(&self, predicate: &dyn Fn(&TaskCompletion) -> bool) -> Result<usize>;
}

pub trait SettingsStorage: Send + Sync {
    fn get_settings(&self) -> Result<Option<Settings>>;

    fn store_settings(&self, settings: &Settings) -> Result<()>;
}
