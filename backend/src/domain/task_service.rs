//! Task management: CRUD over stored tasks plus the derived day and
//! upcoming-date views of recurring tasks.
//!
//! Only masters and one-off tasks are stored. Occurrences of a recurring
//! task on later dates are virtual; their ids have the form
//! `{master_id}::instance::{YYYY-MM-DD}` and they can only be toggled, which
//! records a per-date completion instead of touching the master.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::clock::Clock;
use crate::domain::commands::tasks::{
    CreateTaskCommand, DeleteTaskResult, TaskDetails, TaskListQuery, UpdateTaskCommand,
};
use crate::domain::errors::{DomainError, ValidationError};
use crate::domain::models::task::{Task, TaskCompletion};
use crate::domain::recurrence;
use crate::domain::task_tree::TaskTree;
use crate::domain::validation::{optional_text, required_text};
use crate::storage::{
    CategoryRepository, CategoryStorage, CompletionRepository, CompletionStorage, KeyValueStore,
    TaskRepository, TaskStorage,
};

const MAX_TITLE_LENGTH: usize = 200;
const MAX_DESCRIPTION_LENGTH: usize = 2000;
const DEFAULT_UPCOMING_LIMIT: usize = 10;
const MAX_UPCOMING_LIMIT: usize = 366;

/// Service for managing tasks and subtasks
#[derive(Clone)]
pub struct TaskService {
    tasks: TaskRepository,
    categories: CategoryRepository,
    completions: CompletionRepository,
    clock: Arc<dyn Clock>,
}

impl TaskService {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        Self {
            tasks: TaskRepository::new(store.clone()),
            categories: CategoryRepository::new(store.clone()),
            completions: CompletionRepository::new(store),
            clock,
        }
    }

    /// List stored tasks, optionally restricted to one category
    pub fn list_tasks(&self, query: TaskListQuery) -> Result<Vec<Task>> {
        info!("Listing tasks: {:?}", query);

        let tasks = self.tasks.list_tasks()?;
        let tasks: Vec<Task> = match query.category_id {
            Some(category_id) => tasks
                .into_iter()
                .filter(|task| task.category_id == category_id)
                .collect(),
            None => tasks,
        };

        info!("Found {} tasks", tasks.len());
        Ok(tasks)
    }

    /// Get a task, or a virtual occurrence of one, with its subtask progress
    pub fn get_task(&self, task_id: &str) -> Result<TaskDetails> {
        info!("Getting task: {}", task_id);

        let tasks = self.tasks.list_tasks()?;
        let tree = TaskTree::new(&tasks);

        let (task, master_id) = match tree.get(task_id) {
            Some(task) => (task.clone(), task.id.clone()),
            None => {
                let (master_id, date) = Task::parse_instance_id(task_id)
                    .ok_or_else(|| DomainError::not_found("Task", task_id))?;
                let master = tree
                    .get(master_id)
                    .ok_or_else(|| DomainError::not_found("Task", task_id))?;
                (self.occurrence(master, date)?, master.id.clone())
            }
        };

        let (subtasks_completed, subtasks_total) = tree.subtask_progress(&master_id);
        Ok(TaskDetails {
            task,
            subtasks_completed,
            subtasks_total,
        })
    }

    /// (completed, total) over the direct subtasks of `task_id`
    pub fn subtask_progress(&self, task_id: &str) -> Result<(usize, usize)> {
        let details = self.get_task(task_id)?;
        Ok((details.subtasks_completed, details.subtasks_total))
    }

    /// Create a new task
    pub fn create_task(&self, command: CreateTaskCommand) -> Result<Task> {
        info!(
            "Creating task: title={}, category={}",
            command.title, command.category_id
        );

        let title = required_text("title", &command.title, MAX_TITLE_LENGTH)?;
        let description = optional_text("description", command.description, MAX_DESCRIPTION_LENGTH)?;
        self.require_category(&command.category_id)?;

        let parent_id = command.parent_id.filter(|parent_id| !parent_id.trim().is_empty());
        if let Some(parent_id) = &parent_id {
            let parent = self
                .tasks
                .get_task(parent_id)?
                .ok_or_else(|| DomainError::not_found("Parent task", parent_id.clone()))?;
            if parent.category_id != command.category_id {
                return Err(ValidationError::ParentCategoryMismatch {
                    parent_id: parent_id.clone(),
                }
                .into());
            }
        }

        // A recurrence needs an anchor date
        let scheduled_date = match (command.scheduled_date, &command.recurrence) {
            (None, Some(_)) => Some(self.clock.today()),
            (scheduled_date, _) => scheduled_date,
        };

        let task = Task {
            id: Task::generate_id(),
            title,
            description,
            completed: false,
            completed_at: None,
            category_id: command.category_id,
            parent_id,
            scheduled_date,
            scheduled_time: command.scheduled_time,
            priority: command.priority,
            recurrence: command.recurrence,
            is_repeated_instance: false,
            original_task_id: None,
            created_at: Some(self.clock.now()),
        };

        self.tasks.store_task(&task)?;

        info!("Created task: {} with ID: {}", task.title, task.id);
        Ok(task)
    }

    /// Shallow merge of the supplied fields into a stored task.
    ///
    /// Moving a task to another category detaches it from its parent and
    /// takes its whole subtree along.
    pub fn update_task(&self, task_id: &str, command: UpdateTaskCommand) -> Result<Task> {
        info!("Updating task: {} - {:?}", task_id, command);

        let tasks = self.tasks.list_tasks()?;
        let tree = TaskTree::new(&tasks);
        let mut task = Self::find_stored(&tree, task_id)?.clone();
        let previous_schedule = (task.scheduled_date, task.recurrence);

        if let Some(title) = command.title {
            task.title = required_text("title", &title, MAX_TITLE_LENGTH)?;
        }
        if let Some(description) = command.description {
            task.description = optional_text("description", description, MAX_DESCRIPTION_LENGTH)?;
        }
        if let Some(completed) = command.completed {
            self.set_completed(&mut task, completed);
        }
        if let Some(priority) = command.priority {
            task.priority = priority;
        }
        if let Some(scheduled_date) = command.scheduled_date {
            task.scheduled_date = scheduled_date;
        }
        if let Some(scheduled_time) = command.scheduled_time {
            task.scheduled_time = scheduled_time;
        }

        if let Some(recurrence) = command.recurrence {
            task.recurrence = recurrence;
        }
        if task.recurrence.is_some() && task.scheduled_date.is_none() {
            task.scheduled_date = Some(self.clock.today());
        }

        let category_changed = match command.category_id {
            Some(category_id) if category_id != task.category_id => {
                self.require_category(&category_id)?;
                task.category_id = category_id;
                true
            }
            _ => false,
        };

        match command.parent_id {
            Some(Some(parent_id)) if !parent_id.trim().is_empty() => {
                if tree.would_create_cycle(&task.id, &parent_id) {
                    return Err(ValidationError::ParentCycle {
                        task_id: task.id.clone(),
                    }
                    .into());
                }
                let parent = tree
                    .get(&parent_id)
                    .ok_or_else(|| DomainError::not_found("Parent task", parent_id.clone()))?;
                if parent.category_id != task.category_id {
                    return Err(ValidationError::ParentCategoryMismatch { parent_id }.into());
                }
                task.parent_id = Some(parent_id);
            }
            Some(_) => task.parent_id = None,
            None if category_changed => task.parent_id = None,
            None => {}
        }

        let mut updated = vec![task.clone()];
        if category_changed {
            updated.extend(tree.descendants(&task.id).into_iter().map(|descendant| {
                let mut moved = descendant.clone();
                moved.category_id = task.category_id.clone();
                moved
            }));
        }
        self.tasks.store_tasks(&updated)?;

        if previous_schedule != (task.scheduled_date, task.recurrence) {
            let removed = self.completions.delete_completions_where(&|completion| {
                completion.task_id == task.id
                    && !recurrence::is_virtual_occurrence(&task, completion.date)
            })?;
            if removed > 0 {
                info!("Schedule of {} changed; dropped {} completion records", task.id, removed);
            }
        }

        info!("Updated task: {} with ID: {}", task.title, task.id);
        Ok(task)
    }

    /// Delete a task together with all of its subtasks
    pub fn delete_task(&self, task_id: &str) -> Result<DeleteTaskResult> {
        info!("Deleting task: {}", task_id);

        let tasks = self.tasks.list_tasks()?;
        let tree = TaskTree::new(&tasks);
        Self::find_stored(&tree, task_id)?;

        let deleted_ids = self.delete_subtrees(&tree, &[task_id.to_string()])?;

        info!("Deleted task {} and {} subtasks", task_id, deleted_ids.len().saturating_sub(1));
        Ok(DeleteTaskResult { deleted_ids })
    }

    /// Delete every task filed under `category_id`, subtasks included
    pub fn delete_tasks_in_category(&self, category_id: &str) -> Result<Vec<String>> {
        let tasks = self.tasks.list_tasks()?;
        let tree = TaskTree::new(&tasks);
        let roots: Vec<String> = tasks
            .iter()
            .filter(|task| task.category_id == category_id)
            .map(|task| task.id.clone())
            .collect();

        self.delete_subtrees(&tree, &roots)
    }

    /// Flip the completion state of a stored task or of one occurrence of a
    /// recurring task
    pub fn toggle_completion(&self, task_id: &str) -> Result<Task> {
        info!("Toggling completion: {}", task_id);

        if let Some(mut task) = self.tasks.get_task(task_id)? {
            let completed = !task.completed;
            self.set_completed(&mut task, completed);
            self.tasks.store_task(&task)?;
            info!("Task {} completed={}", task.id, task.completed);
            return Ok(task);
        }

        let (master_id, date) = Task::parse_instance_id(task_id)
            .ok_or_else(|| DomainError::not_found("Task", task_id))?;
        let master = self
            .tasks
            .get_task(master_id)?
            .ok_or_else(|| DomainError::not_found("Task", task_id))?;
        if !recurrence::should_appear_on_date(&master, date) {
            return Err(ValidationError::NotAnOccurrence {
                task_id: master.id.clone(),
                date,
            }
            .into());
        }
        // The occurrence on the original date is the master itself
        if master.scheduled_date == Some(date) {
            return self.toggle_completion(&master.id);
        }

        let mut instance = recurrence::materialize_instance(&master, date);
        match self.completions.get_completion(&master.id, date)? {
            Some(_) => {
                self.completions.delete_completions_where(&|completion| {
                    completion.task_id == master.id && completion.date == date
                })?;
            }
            None => {
                let completed_at = self.clock.now();
                self.completions.store_completion(&TaskCompletion {
                    task_id: master.id.clone(),
                    date,
                    completed_at,
                })?;
                instance.completed = true;
                instance.completed_at = Some(completed_at);
            }
        }

        info!("Occurrence {} completed={}", instance.id, instance.completed);
        Ok(instance)
    }

    /// Everything scheduled on `date`, with per-occurrence completions applied
    pub fn tasks_for_date(&self, date: NaiveDate) -> Result<Vec<Task>> {
        info!("Getting tasks for {}", date);

        let tasks = self.tasks.list_tasks()?;
        let completions: HashMap<String, DateTime<Utc>> = self
            .completions
            .completions_on(date)?
            .into_iter()
            .map(|completion| (completion.task_id, completion.completed_at))
            .collect();

        let mut day = recurrence::tasks_for_date(&tasks, date);
        for instance in day.iter_mut().filter(|task| task.is_repeated_instance) {
            let completed_at = instance
                .original_task_id
                .as_ref()
                .and_then(|master_id| completions.get(master_id));
            if let Some(completed_at) = completed_at {
                instance.completed = true;
                instance.completed_at = Some(*completed_at);
            }
        }

        info!("Found {} tasks for {}", day.len(), date);
        Ok(day)
    }

    /// Next dates on which a task occurs, starting today unless `from` is given
    pub fn upcoming_dates(
        &self,
        task_id: &str,
        from: Option<NaiveDate>,
        limit: Option<usize>,
    ) -> Result<Vec<NaiveDate>> {
        let task = match self.tasks.get_task(task_id)? {
            Some(task) => task,
            None => {
                let (master_id, _) = Task::parse_instance_id(task_id)
                    .ok_or_else(|| DomainError::not_found("Task", task_id))?;
                self.tasks
                    .get_task(master_id)?
                    .ok_or_else(|| DomainError::not_found("Task", task_id))?
            }
        };

        let from = from.unwrap_or_else(|| self.clock.today());
        let limit = limit.unwrap_or(DEFAULT_UPCOMING_LIMIT).min(MAX_UPCOMING_LIMIT);
        if !task.is_recurring() {
            warn!("Upcoming dates requested for non-recurring task {}", task.id);
        }

        Ok(recurrence::upcoming_dates(&task, from, limit).collect())
    }

    fn find_stored<'a>(tree: &TaskTree<'a>, task_id: &str) -> Result<&'a Task> {
        if let Some(task) = tree.get(task_id) {
            return Ok(task);
        }
        if Task::parse_instance_id(task_id).is_some() {
            return Err(ValidationError::VirtualInstanceReadOnly(task_id.to_string()).into());
        }
        Err(DomainError::not_found("Task", task_id).into())
    }

    fn require_category(&self, category_id: &str) -> Result<()> {
        if self.categories.get_category(category_id)?.is_none() {
            return Err(DomainError::not_found("Category", category_id).into());
        }
        Ok(())
    }

    fn set_completed(&self, task: &mut Task, completed: bool) {
        if completed && !task.completed {
            task.completed_at = Some(self.clock.now());
        }
        if !completed {
            task.completed_at = None;
        }
        task.completed = completed;
    }

    /// A stored task's appearance on `date`: the master itself on its
    /// original date, otherwise a virtual instance with its completion record
    fn occurrence(&self, master: &Task, date: NaiveDate) -> Result<Task> {
        if !recurrence::should_appear_on_date(master, date) {
            return Err(ValidationError::NotAnOccurrence {
                task_id: master.id.clone(),
                date,
            }
            .into());
        }
        if master.scheduled_date == Some(date) {
            return Ok(master.clone());
        }

        let mut instance = recurrence::materialize_instance(master, date);
        if let Some(completion) = self.completions.get_completion(&master.id, date)? {
            instance.completed = true;
            instance.completed_at = Some(completion.completed_at);
        }
        Ok(instance)
    }

    /// Remove each root with its descendants, plus their completion records
    fn delete_subtrees(&self, tree: &TaskTree<'_>, root_ids: &[String]) -> Result<Vec<String>> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut ids: Vec<String> = Vec::new();
        for root_id in root_ids {
            for id in tree.subtree_ids(root_id) {
                if seen.insert(id.clone()) {
                    ids.push(id);
                }
            }
        }

        let deleted = self.tasks.delete_tasks(&ids)?;
        let deleted_set: HashSet<&str> = deleted.iter().map(String::as_str).collect();
        let removed = self
            .completions
            .delete_completions_where(&|completion| deleted_set.contains(completion.task_id.as_str()))?;
        if removed > 0 {
            info!("Dropped {} completion records of deleted tasks", removed);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{as_validation, is_not_found};
    use crate::domain::models::task::{Priority, Recurrence, RecurrenceKind};
    use crate::domain::test_support::{date, fixed_clock, memory_store, seed_category};

    fn setup() -> (TaskService, Arc<dyn KeyValueStore>) {
        let store = memory_store();
        seed_category(&store, "home");
        seed_category(&store, "work");
        (TaskService::new(store.clone(), fixed_clock()), store)
    }

    fn create(service: &TaskService, title: &str, category_id: &str, parent_id: Option<&str>) -> Task {
        service
            .create_task(CreateTaskCommand {
                title: title.to_string(),
                description: None,
                category_id: category_id.to_string(),
                parent_id: parent_id.map(str::to_string),
                scheduled_date: None,
                scheduled_time: None,
                priority: Priority::Medium,
                recurrence: None,
            })
            .unwrap()
    }

    fn create_recurring(service: &TaskService, start: &str, kind: RecurrenceKind, interval: i64, end: Option<&str>) -> Task {
        service
            .create_task(CreateTaskCommand {
                title: "Recurring".to_string(),
                description: None,
                category_id: "home".to_string(),
                parent_id: None,
                scheduled_date: Some(date(start)),
                scheduled_time: None,
                priority: Priority::Low,
                recurrence: Some(Recurrence::new(kind, Some(interval), end.map(date))),
            })
            .unwrap()
    }

    #[test]
    fn test_create_validates_input() {
        let (service, _) = setup();
        let parent = create(&service, "Parent", "home", None);

        let blank = service.create_task(CreateTaskCommand {
            title: "   ".to_string(),
            description: None,
            category_id: "home".to_string(),
            parent_id: None,
            scheduled_date: None,
            scheduled_time: None,
            priority: Priority::Medium,
            recurrence: None,
        });
        assert_eq!(
            as_validation(&blank.unwrap_err()),
            Some(&ValidationError::Empty { field: "title" })
        );

        let missing_category = service.create_task(CreateTaskCommand {
            title: "Task".to_string(),
            description: None,
            category_id: "nowhere".to_string(),
            parent_id: None,
            scheduled_date: None,
            scheduled_time: None,
            priority: Priority::Medium,
            recurrence: None,
        });
        assert!(is_not_found(&missing_category.unwrap_err()));

        let cross_category = service.create_task(CreateTaskCommand {
            title: "Child".to_string(),
            description: None,
            category_id: "work".to_string(),
            parent_id: Some(parent.id.clone()),
            scheduled_date: None,
            scheduled_time: None,
            priority: Priority::Medium,
            recurrence: None,
        });
        assert!(matches!(
            as_validation(&cross_category.unwrap_err()),
            Some(ValidationError::ParentCategoryMismatch { .. })
        ));
    }

    #[test]
    fn test_create_recurring_without_date_starts_today() {
        let (service, _) = setup();

        let task = service
            .create_task(CreateTaskCommand {
                title: "Stretch".to_string(),
                description: Some("  ".to_string()),
                category_id: "home".to_string(),
                parent_id: None,
                scheduled_date: None,
                scheduled_time: None,
                priority: Priority::High,
                recurrence: Some(Recurrence::new(RecurrenceKind::Daily, None, None)),
            })
            .unwrap();

        assert_eq!(task.scheduled_date, Some(date("2024-01-15")));
        assert!(task.description.is_none());
        assert!(task.id.starts_with("task::"));
        assert!(task.created_at.is_some());
    }

    #[test]
    fn test_partial_update_only_touches_given_fields() -> Result<()> {
        let (service, _) = setup();
        let mut task = create(&service, "Original", "home", None);
        task = service.update_task(
            &task.id,
            UpdateTaskCommand {
                description: Some(Some("Details".to_string())),
                scheduled_date: Some(Some(date("2024-02-01"))),
                ..Default::default()
            },
        )?;

        let updated = service.update_task(
            &task.id,
            UpdateTaskCommand {
                title: Some("Renamed".to_string()),
                ..Default::default()
            },
        )?;

        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description.as_deref(), Some("Details"));
        assert_eq!(updated.scheduled_date, Some(date("2024-02-01")));

        let cleared = service.update_task(
            &task.id,
            UpdateTaskCommand {
                description: Some(None),
                ..Default::default()
            },
        )?;
        assert!(cleared.description.is_none());
        Ok(())
    }

    #[test]
    fn test_update_rejects_parent_cycle() {
        let (service, _) = setup();
        let root = create(&service, "Root", "home", None);
        let child = create(&service, "Child", "home", Some(&root.id));
        let grandchild = create(&service, "Grandchild", "home", Some(&child.id));

        let error = service
            .update_task(
                &root.id,
                UpdateTaskCommand {
                    parent_id: Some(Some(grandchild.id.clone())),
                    ..Default::default()
                },
            )
            .unwrap_err();

        assert!(matches!(as_validation(&error), Some(ValidationError::ParentCycle { .. })));
    }

    #[test]
    fn test_category_change_moves_subtree_and_detaches() -> Result<()> {
        let (service, _) = setup();
        let root = create(&service, "Root", "home", None);
        let child = create(&service, "Child", "home", Some(&root.id));
        let grandchild = create(&service, "Grandchild", "home", Some(&child.id));

        let moved = service.update_task(
            &child.id,
            UpdateTaskCommand {
                category_id: Some("work".to_string()),
                ..Default::default()
            },
        )?;

        assert_eq!(moved.category_id, "work");
        assert!(moved.parent_id.is_none());
        let grandchild = service.get_task(&grandchild.id)?.task;
        assert_eq!(grandchild.category_id, "work");
        assert_eq!(grandchild.parent_id.as_deref(), Some(child.id.as_str()));
        assert_eq!(service.get_task(&root.id)?.subtasks_total, 0);
        Ok(())
    }

    #[test]
    fn test_virtual_instances_are_read_only() {
        let (service, _) = setup();
        let master = create_recurring(&service, "2024-01-01", RecurrenceKind::Daily, 1, None);
        let instance_id = Task::instance_id(&master.id, date("2024-01-03"));

        let update = service.update_task(&instance_id, UpdateTaskCommand::default());
        assert!(matches!(
            as_validation(&update.unwrap_err()),
            Some(ValidationError::VirtualInstanceReadOnly(_))
        ));

        let delete = service.delete_task(&instance_id);
        assert!(delete.is_err());
    }

    #[test]
    fn test_delete_is_recursive() -> Result<()> {
        let (service, _) = setup();
        let root = create(&service, "Root", "home", None);
        let child = create(&service, "Child", "home", Some(&root.id));
        create(&service, "Grandchild", "home", Some(&child.id));
        let other = create(&service, "Other", "home", None);

        let result = service.delete_task(&root.id)?;

        assert_eq!(result.deleted_ids.len(), 3);
        let remaining = service.list_tasks(TaskListQuery::default())?;
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, other.id);
        assert!(is_not_found(&service.delete_task(&root.id).unwrap_err()));
        Ok(())
    }

    #[test]
    fn test_toggle_stored_task() -> Result<()> {
        let (service, _) = setup();
        let task = create(&service, "Laundry", "home", None);

        let done = service.toggle_completion(&task.id)?;
        assert!(done.completed);
        assert!(done.completed_at.is_some());

        let undone = service.toggle_completion(&task.id)?;
        assert!(!undone.completed);
        assert!(undone.completed_at.is_none());
        Ok(())
    }

    #[test]
    fn test_toggle_virtual_instance_records_completion_for_that_day() -> Result<()> {
        let (service, _) = setup();
        let master = create_recurring(&service, "2024-01-01", RecurrenceKind::Daily, 1, None);
        let instance_id = Task::instance_id(&master.id, date("2024-01-03"));

        let toggled = service.toggle_completion(&instance_id)?;
        assert!(toggled.completed);
        assert!(toggled.is_repeated_instance);
        assert_eq!(toggled.id, instance_id);

        let on_day = service.tasks_for_date(date("2024-01-03"))?;
        assert_eq!(on_day.len(), 1);
        assert!(on_day[0].completed);

        let next_day = service.tasks_for_date(date("2024-01-04"))?;
        assert!(!next_day[0].completed);

        let stored_master = service.get_task(&master.id)?.task;
        assert!(!stored_master.completed);

        let untoggled = service.toggle_completion(&instance_id)?;
        assert!(!untoggled.completed);
        assert!(!service.tasks_for_date(date("2024-01-03"))?[0].completed);
        Ok(())
    }

    #[test]
    fn test_toggle_instance_off_schedule_is_rejected() {
        let (service, _) = setup();
        let master = create_recurring(&service, "2024-01-01", RecurrenceKind::Weekly, 1, None);

        let error = service
            .toggle_completion(&Task::instance_id(&master.id, date("2024-01-03")))
            .unwrap_err();

        assert!(matches!(
            as_validation(&error),
            Some(ValidationError::NotAnOccurrence { .. })
        ));
    }

    #[test]
    fn test_clearing_recurrence_drops_completions() -> Result<()> {
        let (service, store) = setup();
        let master = create_recurring(&service, "2024-01-01", RecurrenceKind::Daily, 1, None);
        service.toggle_completion(&Task::instance_id(&master.id, date("2024-01-02")))?;

        service.update_task(
            &master.id,
            UpdateTaskCommand {
                recurrence: Some(None),
                ..Default::default()
            },
        )?;

        assert!(CompletionRepository::new(store).list_completions()?.is_empty());
        assert!(service.tasks_for_date(date("2024-01-02"))?.is_empty());
        Ok(())
    }

    #[test]
    fn test_schedule_change_drops_completions_that_no_longer_apply() -> Result<()> {
        let (service, store) = setup();
        let master = create_recurring(&service, "2024-01-01", RecurrenceKind::Daily, 1, None);
        service.toggle_completion(&Task::instance_id(&master.id, date("2024-01-03")))?;
        service.toggle_completion(&Task::instance_id(&master.id, date("2024-01-05")))?;

        // Every other day from the 1st still covers the 3rd and the 5th
        service.update_task(
            &master.id,
            UpdateTaskCommand {
                recurrence: Some(Some(Recurrence::new(RecurrenceKind::Daily, Some(2), None))),
                ..Default::default()
            },
        )?;
        assert_eq!(CompletionRepository::new(store.clone()).list_completions()?.len(), 2);

        service.update_task(
            &master.id,
            UpdateTaskCommand {
                recurrence: Some(Some(Recurrence::new(RecurrenceKind::Weekly, Some(1), None))),
                ..Default::default()
            },
        )?;
        service.update_task(
            &master.id,
            UpdateTaskCommand {
                scheduled_date: Some(Some(date("2024-01-03"))),
                ..Default::default()
            },
        )?;
        service.update_task(
            &master.id,
            UpdateTaskCommand {
                scheduled_date: Some(Some(date("2024-01-01"))),
                recurrence: Some(Some(Recurrence::new(RecurrenceKind::Daily, Some(1), None))),
                ..Default::default()
            },
        )?;

        assert!(CompletionRepository::new(store).list_completions()?.is_empty());
        let on_day = service.tasks_for_date(date("2024-01-03"))?;
        assert_eq!(on_day.len(), 1);
        assert!(!on_day[0].completed);
        Ok(())
    }

    #[test]
    fn test_edit_without_schedule_change_keeps_completions() -> Result<()> {
        let (service, store) = setup();
        let master = create_recurring(&service, "2024-01-01", RecurrenceKind::Daily, 1, None);
        service.toggle_completion(&Task::instance_id(&master.id, date("2024-01-02")))?;

        service.update_task(
            &master.id,
            UpdateTaskCommand {
                title: Some("Water the plants".to_string()),
                ..Default::default()
            },
        )?;

        assert_eq!(CompletionRepository::new(store).list_completions()?.len(), 1);
        assert!(service.tasks_for_date(date("2024-01-02"))?[0].completed);
        Ok(())
    }

    #[test]
    fn test_biweekly_day_views() -> Result<()> {
        let (service, _) = setup();
        let master = create_recurring(&service, "2024-01-01", RecurrenceKind::Weekly, 2, Some("2024-02-01"));

        for (day, expected) in [
            ("2024-01-01", true),
            ("2024-01-08", false),
            ("2024-01-15", true),
            ("2024-01-29", true),
            ("2024-02-12", false),
        ] {
            let tasks = service.tasks_for_date(date(day))?;
            assert_eq!(!tasks.is_empty(), expected, "{}", day);
        }

        let original = service.tasks_for_date(date("2024-01-01"))?;
        assert_eq!(original[0].id, master.id);
        let later = service.tasks_for_date(date("2024-01-15"))?;
        assert_eq!(later[0].original_task_id.as_deref(), Some(master.id.as_str()));
        Ok(())
    }

    #[test]
    fn test_upcoming_dates_defaults_to_today() -> Result<()> {
        let (service, _) = setup();
        let master = create_recurring(&service, "2024-01-01", RecurrenceKind::Weekly, 1, None);

        let dates = service.upcoming_dates(&master.id, None, Some(3))?;
        assert_eq!(dates, vec![date("2024-01-15"), date("2024-01-22"), date("2024-01-29")]);

        let via_instance = service.upcoming_dates(
            &Task::instance_id(&master.id, date("2024-01-08")),
            Some(date("2024-02-01")),
            Some(1),
        )?;
        assert_eq!(via_instance, vec![date("2024-02-05")]);

        let one_off = create(&service, "Once", "home", None);
        assert!(service.upcoming_dates(&one_off.id, None, None)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_get_virtual_instance_with_progress() -> Result<()> {
        let (service, _) = setup();
        let master = create_recurring(&service, "2024-01-01", RecurrenceKind::Daily, 1, None);
        let step = create(&service, "Step", "home", Some(&master.id));
        service.toggle_completion(&step.id)?;
        create(&service, "Another step", "home", Some(&master.id));

        let details = service.get_task(&Task::instance_id(&master.id, date("2024-01-05")))?;

        assert!(details.task.is_repeated_instance);
        assert_eq!(details.task.scheduled_date, Some(date("2024-01-05")));
        assert_eq!((details.subtasks_completed, details.subtasks_total), (1, 2));
        assert_eq!(service.subtask_progress(&master.id)?, (1, 2));
        Ok(())
    }

    #[test]
    fn test_list_filters_by_category() -> Result<()> {
        let (service, _) = setup();
        create(&service, "Home 1", "home", None);
        create(&service, "Work 1", "work", None);
        create(&service, "Home 2", "home", None);

        let home = service.list_tasks(TaskListQuery {
            category_id: Some("home".to_string()),
        })?;
        assert_eq!(home.len(), 2);
        assert_eq!(service.list_tasks(TaskListQuery::default())?.len(), 3);
        Ok(())
    }
}
