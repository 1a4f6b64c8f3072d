//! Domain-level command and query types.
//!
//! These structs are used by services inside the domain layer and are **not**
//! exposed over the public API. The REST layer maps the DTOs defined in the
//! `shared` crate to these types, so by the time a command reaches a service
//! every date, time and recurrence rule has already been parsed.
//!
//! Partial updates use `Option<Option<T>>`: `None` leaves the field alone,
//! `Some(None)` clears it and `Some(Some(v))` sets it.

pub mod tasks {
    use chrono::{NaiveDate, NaiveTime};

    use crate::domain::models::task::{Priority, Recurrence, Task};

    /// Input for creating a new task.
    #[derive(Debug, Clone)]
    pub struct CreateTaskCommand {
        pub title: String,
        pub description: Option<String>,
        pub category_id: String,
        pub parent_id: Option<String>,
        pub scheduled_date: Option<NaiveDate>,
        pub scheduled_time: Option<NaiveTime>,
        pub priority: Priority,
        pub recurrence: Option<Recurrence>,
    }

    /// Shallow merge of the supplied fields into an existing task.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateTaskCommand {
        pub title: Option<String>,
        pub description: Option<Option<String>>,
        pub completed: Option<bool>,
        pub category_id: Option<String>,
        pub parent_id: Option<Option<String>>,
        pub scheduled_date: Option<Option<NaiveDate>>,
        pub scheduled_time: Option<Option<NaiveTime>>,
        pub priority: Option<Priority>,
        pub recurrence: Option<Option<Recurrence>>,
    }

    /// Query parameters for listing tasks.
    #[derive(Debug, Clone, Default)]
    pub struct TaskListQuery {
        pub category_id: Option<String>,
    }

    /// A task together with the progress of its direct subtasks.
    #[derive(Debug, Clone)]
    pub struct TaskDetails {
        pub task: Task,
        pub subtasks_completed: usize,
        pub subtasks_total: usize,
    }

    /// Result of deleting a task and its subtree.
    #[derive(Debug, Clone)]
    pub struct DeleteTaskResult {
        pub deleted_ids: Vec<String>,
    }
}

pub mod categories {
    /// Input for creating a new category.
    #[derive(Debug, Clone)]
    pub struct CreateCategoryCommand {
        pub name: String,
        pub color: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateCategoryCommand {
        pub name: Option<String>,
        pub color: Option<Option<String>>,
        pub order: Option<Option<i64>>,
    }

    /// Result of deleting a category; lists every task removed with it.
    #[derive(Debug, Clone)]
    pub struct DeleteCategoryResult {
        pub category_id: String,
        pub deleted_task_ids: Vec<String>,
    }
}

pub mod people {
    #[derive(Debug, Clone)]
    pub struct CreatePersonCommand {
        pub name: String,
        pub phone: Option<String>,
        pub email: Option<String>,
        pub notes: Option<String>,
        /// Falls back to the configured default currency
        pub currency: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdatePersonCommand {
        pub name: Option<String>,
        pub phone: Option<Option<String>>,
        pub email: Option<Option<String>>,
        pub notes: Option<Option<String>>,
        pub currency: Option<String>,
    }

    /// Result of deleting a person together with their transactions.
    #[derive(Debug, Clone)]
    pub struct DeletePersonResult {
        pub person_id: String,
        pub deleted_transaction_ids: Vec<String>,
    }
}

pub mod transactions {
    use chrono::{NaiveDate, NaiveTime};

    use crate::domain::models::transaction::TransactionKind;

    /// Input for recording a new transaction.
    #[derive(Debug, Clone)]
    pub struct CreateTransactionCommand {
        pub person_id: String,
        pub kind: TransactionKind,
        pub amount: f64,
        /// Defaults to the person's preferred currency
        pub currency: Option<String>,
        /// Defaults to today
        pub date: Option<NaiveDate>,
        pub time: Option<NaiveTime>,
        pub description: Option<String>,
        pub category: Option<String>,
    }

    #[derive(Debug, Clone, Default)]
    pub struct UpdateTransactionCommand {
        pub kind: Option<TransactionKind>,
        pub amount: Option<f64>,
        pub currency: Option<String>,
        pub date: Option<NaiveDate>,
        pub time: Option<Option<NaiveTime>>,
        pub description: Option<Option<String>>,
        pub category: Option<Option<String>>,
    }
}

pub mod settings {
    use crate::domain::models::settings::PrayerLocation;

    #[derive(Debug, Clone, Default)]
    pub struct UpdateSettingsCommand {
        pub dark_mode: Option<bool>,
        pub default_currency: Option<String>,
        pub prayer_location: Option<Option<PrayerLocation>>,
        pub prayer_tasks_enabled: Option<bool>,
    }
}

pub mod export {
    /// Rendered CSV for one person's ledger.
    #[derive(Debug, Clone)]
    pub struct LedgerExport {
        pub filename: String,
        pub csv_content: String,
        pub transaction_count: usize,
    }
}

pub mod prayers {
    use chrono::NaiveDate;

    use crate::domain::models::task::Task;

    /// Prayer tasks generated for a single day, in prayer order.
    #[derive(Debug, Clone)]
    pub struct PrayerSchedule {
        pub date: NaiveDate,
        pub tasks: Vec<Task>,
    }
}
