//! Task and completion-record persistence.

use anyhow::Result;
use chrono::NaiveDate;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::errors::{DomainError, ValidationError};
use crate::domain::models::task::{Task, TaskCompletion};
use crate::mappers::{CompletionMapper, TaskMapper};
use crate::storage::records::{Record, RecordError, RecordSet};
use crate::storage::traits::{CompletionStorage, KeyValueStore, TaskStorage};

impl Record for Task {
    const KEY: &'static str = "tasks";

    fn decode(value: Value) -> Result<Self, RecordError> {
        let dto: shared::Task = serde_json::from_value(value)?;
        Ok(TaskMapper::to_domain(dto)?)
    }

    fn encode(&self) -> Result<Value> {
        Ok(serde_json::to_value(TaskMapper::to_dto(self))?)
    }
}

impl Record for TaskCompletion {
    const KEY: &'static str = "task_completions";

    fn decode(value: Value) -> Result<Self, RecordError> {
        let dto: shared::TaskCompletion = serde_json::from_value(value)?;
        Ok(CompletionMapper::to_domain(dto)?)
    }

    fn encode(&self) -> Result<Value> {
        Ok(serde_json::to_value(CompletionMapper::to_dto(self))?)
    }
}

fn reject_virtual(task: &Task) -> Result<()> {
    if task.is_repeated_instance {
        return Err(DomainError::from(ValidationError::VirtualInstanceReadOnly(task.id.clone())).into());
    }
    Ok(())
}

/// Task repository over the `tasks` key
#[derive(Clone)]
pub struct TaskRepository {
    records: RecordSet<Task>,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            records: RecordSet::new(store),
        }
    }
}

impl TaskStorage for TaskRepository {
    fn list_tasks(&self) -> Result<Vec<Task>> {
        self.records.load_all()
    }

    fn get_task(&self, task_id: &str) -> Result<Option<Task>> {
        Ok(self.records.load_all()?.into_iter().find(|task| task.id == task_id))
    }

    fn store_task(&self, task: &Task) -> Result<()> {
        self.store_tasks(std::slice::from_ref(task))
    }

    fn store_tasks(&self, tasks: &[Task]) -> Result<()> {
        for task in tasks {
            reject_virtual(task)?;
        }
        self.records.modify(|records| {
            for task in tasks {
                match records.iter_mut().find(|existing| existing.id == task.id) {
                    Some(existing) => *existing = task.clone(),
                    None => records.push(task.clone()),
                }
            }
            Ok(())
        })
    }

    fn delete_tasks(&self, task_ids: &[String]) -> Result<Vec<String>> {
        self.records.modify(|records| {
            let mut deleted = Vec::new();
            records.retain(|task| {
                if task_ids.contains(&task.id) {
                    deleted.push(task.id.clone());
                    false
                } else {
                    true
                }
            });
            Ok(deleted)
        })
    }
}

/// Completion records for occurrences of recurring tasks, under the
/// `task_completions` key
#[derive(Clone)]
pub struct CompletionRepository {
    records: RecordSet<TaskCompletion>,
}

impl CompletionRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            records: RecordSet::new(store),
        }
    }
}

impl CompletionStorage for CompletionRepository {
    fn list_completions(&self) -> Result<Vec<TaskCompletion>> {
        self.records.load_all()
    }

    fn completions_on(&self, date: NaiveDate) -> Result<Vec<TaskCompletion>> {
        Ok(self
            .records
            .load_all()?
            .into_iter()
            .filter(|completion| completion.date == date)
            .collect())
    }

    fn get_completion(&self, task_id: &str, date: NaiveDate) -> Result<Option<TaskCompletion>> {
        Ok(self
            .records
            .load_all()?
            .into_iter()
            .find(|completion| completion.task_id == task_id && completion.date == date))
    }

    fn store_completion(&self, completion: &TaskCompletion) -> Result<()> {
        self.records.modify(|records| {
            match records
                .iter_mut()
                .find(|existing| existing.task_id == completion.task_id && existing.date == completion.date)
            {
                Some(existing) => *existing = completion.clone(),
                None => records.push(completion.clone()),
            }
            Ok(())
        })
    }

    fn delete_completions_where(&self, predicate: &dyn Fn(&TaskCompletion) -> bool) -> Result<usize> {
        self.records.modify(|records| {
            let before = records.len();
            records.retain(|completion| !predicate(completion));
            Ok(before - records.len())
        })
    }
}
