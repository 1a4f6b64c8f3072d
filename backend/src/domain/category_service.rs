use anyhow::Result;
use std::sync::Arc;
use tracing::info;

use crate::domain::clock::Clock;
use crate::domain::commands::categories::{
    CreateCategoryCommand, DeleteCategoryResult, UpdateCategoryCommand,
};
use crate::domain::errors::DomainError;
use crate::domain::models::category::Category;
use crate::domain::task_service::TaskService;
use crate::domain::validation::{optional_text, required_text};
use crate::storage::{CategoryRepository, CategoryStorage, KeyValueStore};

const MAX_NAME_LENGTH: usize = 100;
const MAX_COLOR_LENGTH: usize = 32;

/// Service for managing task categories
#[derive(Clone)]
pub struct CategoryService {
    categories: CategoryRepository,
    task_service: TaskService,
    clock: Arc<dyn Clock>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn KeyValueStore>, task_service: TaskService, clock: Arc<dyn Clock>) -> Self {
        Self {
            categories: CategoryRepository::new(store),
            task_service,
            clock,
        }
    }

    /// List categories in display order
    pub fn list_categories(&self) -> Result<Vec<Category>> {
        info!("Listing categories");

        let mut categories = self.categories.list_categories()?;
        categories.sort_by(Category::display_cmp);

        info!("Found {} categories", categories.len());
        Ok(categories)
    }

    pub fn get_category(&self, category_id: &str) -> Result<Category> {
        self.categories
            .get_category(category_id)?
            .ok_or_else(|| DomainError::not_found("Category", category_id).into())
    }

    /// Create a new category
    pub fn create_category(&self, command: CreateCategoryCommand) -> Result<Category> {
        info!("Creating category: {}", command.name);

        let category = Category {
            id: Category::generate_id(),
            name: required_text("name", &command.name, MAX_NAME_LENGTH)?,
            color: optional_text("color", command.color, MAX_COLOR_LENGTH)?,
            created_at: self.clock.now(),
            order: None,
        };

        self.categories.store_category(&category)?;

        info!("Created category: {} with ID: {}", category.name, category.id);
        Ok(category)
    }

    pub fn update_category(&self, category_id: &str, command: UpdateCategoryCommand) -> Result<Category> {
        info!("Updating category: {} - {:?}", category_id, command);

        let mut category = self.get_category(category_id)?;
        if let Some(name) = command.name {
            category.name = required_text("name", &name, MAX_NAME_LENGTH)?;
        }
        if let Some(color) = command.color {
            category.color = optional_text("color", color, MAX_COLOR_LENGTH)?;
        }
        if let Some(order) = command.order {
            category.order = order;
        }

        self.categories.store_category(&category)?;
        Ok(category)
    }

    /// Delete a category and every task filed under it
    pub fn delete_category(&self, category_id: &str) -> Result<DeleteCategoryResult> {
        info!("Deleting category: {}", category_id);

        self.get_category(category_id)?;
        let deleted_task_ids = self.task_service.delete_tasks_in_category(category_id)?;
        self.categories.delete_category(category_id)?;

        info!(
            "Deleted category {} and {} tasks",
            category_id,
            deleted_task_ids.len()
        );
        Ok(DeleteCategoryResult {
            category_id: category_id.to_string(),
            deleted_task_ids,
        })
    }

    /// Give each listed category its position as explicit order.
    ///
    /// Categories left out of `category_ids` keep their previous order.
    pub fn reorder_categories(&self, category_ids: &[String]) -> Result<Vec<Category>> {
        info!("Reordering {} categories", category_ids.len());

        let existing = self.categories.list_categories()?;
        let mut reordered = Vec::with_capacity(category_ids.len());
        for (position, category_id) in category_ids.iter().enumerate() {
            let mut category = existing
                .iter()
                .find(|category| &category.id == category_id)
                .cloned()
                .ok_or_else(|| DomainError::not_found("Category", category_id.clone()))?;
            category.order = Some(position as i64);
            reordered.push(category);
        }

        self.categories.store_categories(&reordered)?;
        self.list_categories()
    }
}
