//! Parent/child index over a snapshot of tasks.
//!
//! Built once per derived view so subtree walks don't rescan the whole task
//! list for every node.

use std::collections::{HashMap, HashSet};

use crate::domain::models::task::Task;

pub struct TaskTree<'a> {
    tasks: &'a [Task],
    by_id: HashMap<&'a str, &'a Task>,
    children: HashMap<&'a str, Vec<&'a Task>>,
}

impl<'a> TaskTree<'a> {
    pub fn new(tasks: &'a [Task]) -> Self {
        let mut by_id = HashMap::with_capacity(tasks.len());
        let mut children: HashMap<&'a str, Vec<&'a Task>> = HashMap::new();

        for task in tasks {
            by_id.insert(task.id.as_str(), task);
            if let Some(parent_id) = task.parent_id.as_deref() {
                children.entry(parent_id).or_default().push(task);
            }
        }

        Self {
            tasks,
            by_id,
            children,
        }
    }

    pub fn get(&self, task_id: &str) -> Option<&'a Task> {
        self.by_id.get(task_id).copied()
    }

    /// Tasks without a parent, in input order
    pub fn roots(&self) -> Vec<&'a Task> {
        self.tasks.iter().filter(|task| task.parent_id.is_none()).collect()
    }

    /// Direct subtasks, in input order
    pub fn children(&self, task_id: &str) -> &[&'a Task] {
        self.children.get(task_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every task below `task_id`, depth first. Cycles in corrupt data are
    /// walked once.
    pub fn descendants(&self, task_id: &str) -> Vec<&'a Task> {
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(task_id);

        let mut result = Vec::new();
        let mut stack: Vec<&'a Task> = self.children(task_id).iter().rev().copied().collect();

        while let Some(task) = stack.pop() {
            if !visited.insert(task.id.as_str()) {
                continue;
            }
            result.push(task);
            stack.extend(self.children(&task.id).iter().rev().copied());
        }

        result
    }

    /// `task_id` followed by all of its descendants' ids
    pub fn subtree_ids(&self, task_id: &str) -> Vec<String> {
        std::iter::once(task_id.to_string())
            .chain(self.descendants(task_id).into_iter().map(|task| task.id.clone()))
            .collect()
    }

    /// (completed, total) over direct subtasks
    pub fn subtask_progress(&self, task_id: &str) -> (usize, usize) {
        let children = self.children(task_id);
        let completed = children.iter().filter(|task| task.completed).count();
        (completed, children.len())
    }

    /// Tasks whose parent id points at a task that doesn't exist
    pub fn orphans(&self) -> Vec<&'a Task> {
        self.tasks
            .iter()
            .filter(|task| {
                task.parent_id
                    .as_deref()
                    .is_some_and(|parent_id| !self.by_id.contains_key(parent_id))
            })
            .collect()
    }

    /// Whether re-parenting `task_id` under `new_parent_id` would close a loop
    pub fn would_create_cycle(&self, task_id: &str, new_parent_id: &str) -> bool {
        task_id == new_parent_id
            || self
                .descendants(task_id)
                .iter()
                .any(|task| task.id == new_parent_id)
    }
}
