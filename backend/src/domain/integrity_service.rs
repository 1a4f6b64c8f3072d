//! Startup and on-demand data maintenance.
//!
//! Removes records that point at something that no longer exists:
//! tasks whose category or parent is gone (and everything below them),
//! completion records for dates that are no longer a virtual occurrence of
//! their task, and transactions of deleted people. Runs after the quarantine pass in
//! storage, so everything seen here is well-formed.

use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::models::task::Task;
use crate::domain::recurrence;
use crate::domain::task_tree::TaskTree;
use crate::storage::{
    CategoryRepository, CategoryStorage, CompletionRepository, CompletionStorage, KeyValueStore,
    PersonRepository, PersonStorage, TaskRepository, TaskStorage, TransactionRepository,
    TransactionStorage,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct IntegrityReport {
    pub removed_task_ids: Vec<String>,
    pub removed_completion_count: usize,
    pub removed_transaction_ids: Vec<String>,
}

impl IntegrityReport {
    pub fn is_clean(&self) -> bool {
        self.removed_task_ids.is_empty()
            && self.removed_completion_count == 0
            && self.removed_transaction_ids.is_empty()
    }
}

#[derive(Clone)]
pub struct IntegrityService {
    tasks: TaskRepository,
    categories: CategoryRepository,
    completions: CompletionRepository,
    people: PersonRepository,
    transactions: TransactionRepository,
}

impl IntegrityService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            tasks: TaskRepository::new(store.clone()),
            categories: CategoryRepository::new(store.clone()),
            completions: CompletionRepository::new(store.clone()),
            people: PersonRepository::new(store.clone()),
            transactions: TransactionRepository::new(store),
        }
    }

    pub fn run_maintenance(&self) -> Result<IntegrityReport> {
        info!("Running data integrity maintenance");

        let removed_task_ids = self.remove_unreachable_tasks()?;
        let removed_completion_count = self.remove_stale_completions()?;
        let removed_transaction_ids = self.remove_orphan_transactions()?;

        let report = IntegrityReport {
            removed_task_ids,
            removed_completion_count,
            removed_transaction_ids,
        };
        if report.is_clean() {
            info!("Integrity check found nothing to repair");
        } else {
            warn!(
                "Integrity repair removed {} tasks, {} completion records, {} transactions",
                report.removed_task_ids.len(),
                report.removed_completion_count,
                report.removed_transaction_ids.len()
            );
        }
        Ok(report)
    }

    /// Keep only tasks reachable from a top-level task in an existing
    /// category. Anything else is an orphan, a member of a parent cycle, or
    /// below one of those.
    fn remove_unreachable_tasks(&self) -> Result<Vec<String>> {
        let tasks = self.tasks.list_tasks()?;
        let category_ids: HashSet<String> = self
            .categories
            .list_categories()?
            .into_iter()
            .map(|category| category.id)
            .collect();
        let tree = TaskTree::new(&tasks);

        for orphan in tree.orphans() {
            warn!(
                "Task {} points at missing parent {:?}",
                orphan.id, orphan.parent_id
            );
        }

        let keeps = |task: &Task| category_ids.contains(&task.category_id) && !task.is_repeated_instance;
        let mut reachable: HashSet<&str> = HashSet::new();
        let mut stack: Vec<&Task> = tree.roots().into_iter().filter(|task| keeps(task)).collect();
        while let Some(task) = stack.pop() {
            if !reachable.insert(task.id.as_str()) {
                continue;
            }
            stack.extend(tree.children(&task.id).iter().copied().filter(|child| keeps(child)));
        }

        let doomed: Vec<String> = tasks
            .iter()
            .filter(|task| !reachable.contains(task.id.as_str()))
            .map(|task| task.id.clone())
            .collect();
        if doomed.is_empty() {
            return Ok(doomed);
        }
        self.tasks.delete_tasks(&doomed)
    }

    fn remove_stale_completions(&self) -> Result<usize> {
        let recurring: HashMap<String, Task> = self
            .tasks
            .list_tasks()?
            .into_iter()
            .filter(Task::is_recurring)
            .map(|task| (task.id.clone(), task))
            .collect();

        self.completions.delete_completions_where(&|completion| {
            !recurring
                .get(&completion.task_id)
                .is_some_and(|task| recurrence::is_virtual_occurrence(task, completion.date))
        })
    }

    fn remove_orphan_transactions(&self) -> Result<Vec<String>> {
        let person_ids: HashSet<String> = self
            .people
            .list_people()?
            .into_iter()
            .map(|person| person.id)
            .collect();

        self.transactions
            .delete_transactions_where(&|transaction| !person_ids.contains(&transaction.person_id))
    }
}
