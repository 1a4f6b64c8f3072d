//! Domain model for a task category.
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use uuid::Uuid;

/// Fixed id of the category that holds generated prayer tasks
pub const PRAYERS_CATEGORY_ID: &str = "prayers";

#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub order: Option<i64>,
}

impl Category {
    pub fn generate_id() -> String {
        format!("category::{}", Uuid::new_v4())
    }

    /// Display ordering: explicit `order` first (ascending), then categories
    /// without one by creation time.
    pub fn display_cmp(a: &Category, b: &Category) -> Ordering {
        match (a.order, b.order) {
            (Some(left), Some(right)) => left
                .cmp(&right)
                .then_with(|| a.created_at.cmp(&b.created_at)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.created_at.cmp(&b.created_at),
        }
    }
}
