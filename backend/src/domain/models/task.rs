//! Domain model for a task and its recurrence rule.
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

const INSTANCE_MARKER: &str = "::instance::";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecurrenceKind {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl RecurrenceKind {
    /// Parse a stored repeat type. Unknown values yield `None`, which
    /// disables recurrence for the task.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(RecurrenceKind::Daily),
            "weekly" => Some(RecurrenceKind::Weekly),
            "monthly" => Some(RecurrenceKind::Monthly),
            "yearly" => Some(RecurrenceKind::Yearly),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecurrenceKind::Daily => "daily",
            RecurrenceKind::Weekly => "weekly",
            RecurrenceKind::Monthly => "monthly",
            RecurrenceKind::Yearly => "yearly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recurrence {
    pub kind: RecurrenceKind,
    interval: u32,
    pub end_date: Option<NaiveDate>,
}

impl Recurrence {
    /// Build a rule; a missing or non-positive interval falls back to 1.
    pub fn new(kind: RecurrenceKind, interval: Option<i64>, end_date: Option<NaiveDate>) -> Self {
        let interval = interval
            .filter(|value| *value > 0)
            .and_then(|value| u32::try_from(value).ok())
            .unwrap_or(1);
        Self {
            kind,
            interval,
            end_date,
        }
    }

    pub fn interval(&self) -> u32 {
        self.interval.max(1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
    pub category_id: String,
    pub parent_id: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub scheduled_time: Option<NaiveTime>,
    pub priority: Priority,
    pub recurrence: Option<Recurrence>,
    pub is_repeated_instance: bool,
    pub original_task_id: Option<String>,
    /// Missing on records written before creation times were tracked
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn new(id: impl Into<String>, title: impl Into<String>, category_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            completed: false,
            completed_at: None,
            category_id: category_id.into(),
            parent_id: None,
            scheduled_date: None,
            scheduled_time: None,
            priority: Priority::default(),
            recurrence: None,
            is_repeated_instance: false,
            original_task_id: None,
            created_at: None,
        }
    }

    pub fn generate_id() -> String {
        format!("task::{}", Uuid::new_v4())
    }

    /// Deterministic id of the virtual occurrence of `master_id` on `date`.
    pub fn instance_id(master_id: &str, date: NaiveDate) -> String {
        format!("{}{}{}", master_id, INSTANCE_MARKER, date.format("%Y-%m-%d"))
    }

    /// Split a virtual occurrence id back into its master id and date.
    pub fn parse_instance_id(id: &str) -> Option<(&str, NaiveDate)> {
        let (master_id, date) = id.rsplit_once(INSTANCE_MARKER)?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        if master_id.is_empty() {
            return None;
        }
        Some((master_id, date))
    }

    pub fn is_recurring(&self) -> bool {
        self.recurrence.is_some()
    }
}

/// Completion of one occurrence of a recurring task, keyed by
/// `(task_id, date)`.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskCompletion {
    pub task_id: String,
    pub date: NaiveDate,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_id_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 31).unwrap();
        let id = Task::instance_id("task::abc", date);

        assert_eq!(id, "task::abc::instance::2024-03-31");
        assert_eq!(Task::parse_instance_id(&id), Some(("task::abc", date)));
    }

    #[test]
    fn test_parse_instance_id_rejects_plain_ids() {
        assert_eq!(Task::parse_instance_id("task::abc"), None);
        assert_eq!(Task::parse_instance_id("task::abc::instance::soon"), None);
        assert_eq!(Task::parse_instance_id("::instance::2024-01-01"), None);
    }

    #[test]
    fn test_recurrence_interval_defaults() {
        assert_eq!(Recurrence::new(RecurrenceKind::Daily, None, None).interval(), 1);
        assert_eq!(Recurrence::new(RecurrenceKind::Daily, Some(0), None).interval(), 1);
        assert_eq!(Recurrence::new(RecurrenceKind::Daily, Some(-4), None).interval(), 1);
        assert_eq!(Recurrence::new(RecurrenceKind::Weekly, Some(3), None).interval(), 3);
    }

    #[test]
    fn test_recurrence_kind_parse() {
        assert_eq!(RecurrenceKind::parse("Weekly"), Some(RecurrenceKind::Weekly));
        assert_eq!(RecurrenceKind::parse(" yearly "), Some(RecurrenceKind::Yearly));
        assert_eq!(RecurrenceKind::parse("fortnightly"), None);
        assert_eq!(RecurrenceKind::parse(""), None);
    }
}
