use chrono::NaiveDate;
use shared::{
    CreateTaskRequest, DayTasksResponse, Priority as SharedPriority, RepeatRule,
    Task as SharedTask, TaskCompletion as SharedTaskCompletion, TaskListResponse, TaskResponse,
    UpcomingDatesResponse, UpdateTaskRequest,
};

use super::{
    format_date, format_time, format_timestamp, parse_date, parse_optional_date,
    parse_optional_time, parse_optional_timestamp, parse_timestamp,
};
use crate::domain::commands::tasks::{CreateTaskCommand, TaskDetails, UpdateTaskCommand};
use crate::domain::errors::ValidationError;
use crate::domain::models::task::{
    Priority, Recurrence, RecurrenceKind, Task as DomainTask, TaskCompletion as DomainTaskCompletion,
};

/// Mapper to convert between shared Task DTOs and domain Task models.
pub struct TaskMapper;

impl TaskMapper {
    /// Converts a stored/shared Task DTO to a domain Task.
    ///
    /// Recurrence is lenient: an unknown repeat type means "not recurring"
    /// and a missing or non-positive interval means 1. Everything else must
    /// parse.
    pub fn to_domain(dto: SharedTask) -> Result<DomainTask, ValidationError> {
        if dto.id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "id" });
        }
        if dto.title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        if dto.category_id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "categoryId" });
        }

        let repeat_end_date = parse_optional_date("repeatEndDate", dto.repeat_end_date.as_deref())?;
        let recurrence = dto
            .repeat_type
            .as_deref()
            .and_then(RecurrenceKind::parse)
            .map(|kind| Recurrence::new(kind, dto.repeat_interval, repeat_end_date));

        Ok(DomainTask {
            id: dto.id,
            title: dto.title,
            description: dto.description,
            completed: dto.completed,
            completed_at: parse_optional_timestamp("completedAt", dto.completed_at.as_deref())?,
            category_id: dto.category_id,
            parent_id: dto.parent_id.filter(|parent_id| !parent_id.is_empty()),
            scheduled_date: parse_optional_date("scheduledDate", dto.scheduled_date.as_deref())?,
            scheduled_time: parse_optional_time("scheduledTime", dto.scheduled_time.as_deref())?,
            priority: Self::priority_to_domain(dto.priority),
            recurrence,
            is_repeated_instance: dto.is_repeated_instance,
            original_task_id: dto.original_task_id,
            created_at: parse_optional_timestamp("createdAt", dto.created_at.as_deref())?,
        })
    }

    /// Converts a domain Task to a shared Task DTO.
    pub fn to_dto(domain: &DomainTask) -> SharedTask {
        let recurrence = domain.recurrence.as_ref();
        SharedTask {
            id: domain.id.clone(),
            title: domain.title.clone(),
            description: domain.description.clone(),
            completed: domain.completed,
            completed_at: domain.completed_at.map(format_timestamp),
            category_id: domain.category_id.clone(),
            parent_id: domain.parent_id.clone(),
            scheduled_date: domain.scheduled_date.map(format_date),
            scheduled_time: domain.scheduled_time.map(format_time),
            priority: Self::priority_to_dto(domain.priority),
            repeat_type: recurrence.map(|rule| rule.kind.as_str().to_string()),
            repeat_interval: recurrence.map(|rule| i64::from(rule.interval())),
            repeat_end_date: recurrence.and_then(|rule| rule.end_date).map(format_date),
            is_repeated_instance: domain.is_repeated_instance,
            original_task_id: domain.original_task_id.clone(),
            created_at: domain.created_at.map(format_timestamp),
        }
    }

    pub fn priority_to_domain(priority: SharedPriority) -> Priority {
        match priority {
            SharedPriority::Low => Priority::Low,
            SharedPriority::Medium => Priority::Medium,
            SharedPriority::High => Priority::High,
        }
    }

    pub fn priority_to_dto(priority: Priority) -> SharedPriority {
        match priority {
            Priority::Low => SharedPriority::Low,
            Priority::Medium => SharedPriority::Medium,
            Priority::High => SharedPriority::High,
        }
    }

    /// Parses a recurrence rule from a request. Unlike stored records,
    /// requests with an unknown type or a bad interval are rejected.
    pub fn recurrence_from_rule(rule: &RepeatRule) -> Result<Recurrence, ValidationError> {
        let kind = RecurrenceKind::parse(&rule.kind)
            .ok_or_else(|| ValidationError::UnknownRepeatType(rule.kind.clone()))?;
        if let Some(interval) = rule.interval {
            if interval <= 0 || interval > i64::from(u32::MAX) {
                return Err(ValidationError::InvalidInterval(interval));
            }
        }
        let end_date = parse_optional_date("repeat.endDate", rule.end_date.as_deref())?;
        Ok(Recurrence::new(kind, rule.interval, end_date))
    }

    pub fn to_create_command(request: CreateTaskRequest) -> Result<CreateTaskCommand, ValidationError> {
        Ok(CreateTaskCommand {
            scheduled_date: parse_optional_date("scheduledDate", request.scheduled_date.as_deref())?,
            scheduled_time: parse_optional_time("scheduledTime", request.scheduled_time.as_deref())?,
            recurrence: request.repeat.as_ref().map(Self::recurrence_from_rule).transpose()?,
            priority: request.priority.map(Self::priority_to_domain).unwrap_or_default(),
            title: request.title,
            description: request.description,
            category_id: request.category_id,
            parent_id: request.parent_id,
        })
    }

    pub fn to_update_command(request: UpdateTaskRequest) -> Result<UpdateTaskCommand, ValidationError> {
        let scheduled_date = match request.scheduled_date {
            Some(value) => Some(parse_optional_date("scheduledDate", value.as_deref())?),
            None => None,
        };
        let scheduled_time = match request.scheduled_time {
            Some(value) => Some(parse_optional_time("scheduledTime", value.as_deref())?),
            None => None,
        };
        let recurrence = match request.repeat {
            Some(rule) => Some(rule.as_ref().map(Self::recurrence_from_rule).transpose()?),
            None => None,
        };

        Ok(UpdateTaskCommand {
            title: request.title,
            description: request.description,
            completed: request.completed,
            category_id: request.category_id,
            parent_id: request.parent_id,
            scheduled_date,
            scheduled_time,
            priority: request.priority.map(Self::priority_to_domain),
            recurrence,
        })
    }

    pub fn to_task_response_dto(details: TaskDetails) -> TaskResponse {
        TaskResponse {
            task: Self::to_dto(&details.task),
            subtasks_completed: details.subtasks_completed,
            subtasks_total: details.subtasks_total,
        }
    }

    pub fn to_task_list_dto(tasks: &[DomainTask]) -> TaskListResponse {
        TaskListResponse {
            tasks: tasks.iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_day_tasks_dto(date: NaiveDate, tasks: &[DomainTask]) -> DayTasksResponse {
        DayTasksResponse {
            date: format_date(date),
            tasks: tasks.iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_upcoming_dates_dto(task_id: &str, dates: &[NaiveDate]) -> UpcomingDatesResponse {
        UpcomingDatesResponse {
            task_id: task_id.to_string(),
            dates: dates.iter().copied().map(format_date).collect(),
        }
    }
}

/// Mapper for per-occurrence completion records.
pub struct CompletionMapper;

impl CompletionMapper {
    pub fn to_domain(dto: SharedTaskCompletion) -> Result<DomainTaskCompletion, ValidationError> {
        if dto.task_id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "taskId" });
        }
        Ok(DomainTaskCompletion {
            date: parse_date("date", &dto.date)?,
            completed_at: parse_timestamp("completedAt", &dto.completed_at)?,
            task_id: dto.task_id,
        })
    }

    pub fn to_dto(domain: &DomainTaskCompletion) -> SharedTaskCompletion {
        SharedTaskCompletion {
            task_id: domain.task_id.clone(),
            date: format_date(domain.date),
            completed_at: format_timestamp(domain.completed_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored_task() -> SharedTask {
        SharedTask {
            id: "task::1".to_string(),
            title: "Water plants".to_string(),
            description: None,
            completed: false,
            completed_at: None,
            category_id: "category::home".to_string(),
            parent_id: None,
            scheduled_date: Some("2024-01-01".to_string()),
            scheduled_time: Some("08:30".to_string()),
            priority: SharedPriority::High,
            repeat_type: Some("weekly".to_string()),
            repeat_interval: Some(2),
            repeat_end_date: Some("2024-02-01".to_string()),
            is_repeated_instance: false,
            original_task_id: None,
            created_at: Some("2024-01-01T07:00:00+00:00".to_string()),
        }
    }

    #[test]
    fn test_stored_task_to_domain() {
        let task = TaskMapper::to_domain(stored_task()).unwrap();

        let rule = task.recurrence.unwrap();
        assert_eq!(rule.kind, RecurrenceKind::Weekly);
        assert_eq!(rule.interval(), 2);
        assert_eq!(rule.end_date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(task.priority, Priority::High);
        assert_eq!(TaskMapper::to_dto(&task), stored_task());
    }

    #[test]
    fn test_unknown_stored_repeat_type_disables_recurrence() {
        let mut dto = stored_task();
        dto.repeat_type = Some("fortnightly".to_string());
        dto.repeat_interval = Some(0);

        let task = TaskMapper::to_domain(dto).unwrap();

        assert!(task.recurrence.is_none());
    }

    #[test]
    fn test_missing_stored_interval_defaults_to_one() {
        let mut dto = stored_task();
        dto.repeat_interval = None;

        let task = TaskMapper::to_domain(dto).unwrap();

        assert_eq!(task.recurrence.unwrap().interval(), 1);
    }

    #[test]
    fn test_stored_task_with_bad_fields_is_rejected() {
        let mut untitled = stored_task();
        untitled.title = "  ".to_string();
        assert_eq!(
            TaskMapper::to_domain(untitled),
            Err(ValidationError::Empty { field: "title" })
        );

        let mut bad_date = stored_task();
        bad_date.scheduled_date = Some("01/02/2024".to_string());
        assert!(matches!(
            TaskMapper::to_domain(bad_date),
            Err(ValidationError::InvalidDate { field: "scheduledDate", .. })
        ));
    }

    #[test]
    fn test_request_recurrence_is_strict() {
        let unknown = RepeatRule {
            kind: "hourly".to_string(),
            interval: None,
            end_date: None,
        };
        assert_eq!(
            TaskMapper::recurrence_from_rule(&unknown),
            Err(ValidationError::UnknownRepeatType("hourly".to_string()))
        );

        let zero = RepeatRule {
            kind: "daily".to_string(),
            interval: Some(0),
            end_date: None,
        };
        assert_eq!(
            TaskMapper::recurrence_from_rule(&zero),
            Err(ValidationError::InvalidInterval(0))
        );
    }

    #[test]
    fn test_update_request_keeps_clear_and_unchanged_apart() {
        let request: UpdateTaskRequest =
            serde_json::from_str(r#"{"repeat": null, "scheduledDate": "2024-06-01"}"#).unwrap();

        let command = TaskMapper::to_update_command(request).unwrap();

        assert!(matches!(command.recurrence, Some(None)));
        assert_eq!(command.scheduled_date, Some(NaiveDate::from_ymd_opt(2024, 6, 1)));
        assert!(command.scheduled_time.is_none());
        assert!(command.parent_id.is_none());
    }
}
