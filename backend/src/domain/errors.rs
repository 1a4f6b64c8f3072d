//! Typed domain failures.
//!
//! Services return `anyhow::Result`; the failures a caller is expected to act
//! on are raised as [`DomainError`] so the REST layer can downcast them and
//! pick a status code.

use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// The validation failure inside `error`, whether it was raised bare with
/// `?` or wrapped in [`DomainError::Validation`].
pub fn as_validation(error: &anyhow::Error) -> Option<&ValidationError> {
    match error.downcast_ref::<DomainError>() {
        Some(DomainError::Validation(validation)) => Some(validation),
        Some(DomainError::NotFound { .. }) => None,
        None => error.downcast_ref::<ValidationError>(),
    }
}

/// Whether `error` is a [`DomainError::NotFound`]
pub fn is_not_found(error: &anyhow::Error) -> bool {
    matches!(error.downcast_ref::<DomainError>(), Some(DomainError::NotFound { .. }))
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
    #[error("{field} is too long (max {max} characters)")]
    TooLong { field: &'static str, max: usize },
    #[error("{field} must be a date in YYYY-MM-DD format, got '{value}'")]
    InvalidDate { field: &'static str, value: String },
    #[error("{field} must be a time in HH:MM format, got '{value}'")]
    InvalidTime { field: &'static str, value: String },
    #[error("{field} must be an RFC 3339 timestamp, got '{value}'")]
    InvalidTimestamp { field: &'static str, value: String },
    #[error("Unknown repeat type '{0}' (expected daily, weekly, monthly or yearly)")]
    UnknownRepeatType(String),
    #[error("Repeat interval must be a positive integer, got {0}")]
    InvalidInterval(i64),
    #[error("Amount must be a positive number")]
    NonPositiveAmount,
    #[error("Amount cannot exceed {max}")]
    AmountTooLarge { max: f64 },
    #[error("Currency must be a three-letter code, got '{0}'")]
    InvalidCurrency(String),
    #[error("Parent task {parent_id} belongs to a different category")]
    ParentCategoryMismatch { parent_id: String },
    #[error("Task {task_id} cannot be placed under its own subtree")]
    ParentCycle { task_id: String },
    #[error("Occurrence {task_id} on {date} is not part of the task's schedule")]
    NotAnOccurrence { task_id: String, date: NaiveDate },
    #[error("Virtual occurrence {0} is read-only; edit the recurring task instead")]
    VirtualInstanceReadOnly(String),
}
