use anyhow::Result;
use serde_json::Value;
use std::sync::Arc;

use crate::domain::models::category::Category;
use crate::mappers::CategoryMapper;
use crate::storage::records::{Record, RecordError, RecordSet};
use crate::storage::traits::{CategoryStorage, KeyValueStore};

impl Record for Category {
    const KEY: &'static str = "categories";

    fn decode(value: Value) -> Result<Self, RecordError> {
        let dto: shared::Category = serde_json::from_value(value)?;
        Ok(CategoryMapper::to_domain(dto)?)
    }

    fn encode(&self) -> Result<Value> {
        Ok(serde_json::to_value(CategoryMapper::to_dto(self))?)
    }
}

#[derive(Clone)]
pub struct CategoryRepository {
    records: RecordSet<Category>,
}

impl CategoryRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            records: RecordSet::new(store),
        }
    }
}

impl CategoryStorage for CategoryRepository {
    fn list_categories(&self) -> Result<Vec<Category>> {
        self.records.load_all()
    }

    fn get_category(&self, category_id: &str) -> Result<Option<Category>> {
        Ok(self
            .records
            .load_all()?
            .into_iter()
            .find(|category| category.id == category_id))
    }

    fn store_category(&self, category: &Category) -> Result<()> {
        self.store_categories(std::slice::from_ref(category))
    }

    fn store_categories(&self, categories: &[Category]) -> Result<()> {
        self.records.modify(|records| {
            for category in categories {
                match records.iter_mut().find(|existing| existing.id == category.id) {
                    Some(existing) => *existing = category.clone(),
                    None => records.push(category.clone()),
                }
            }
            Ok(())
        })
    }

    fn delete_category(&self, category_id: &str) -> Result<bool> {
        self.records.modify(|records| {
            let before = records.len();
            records.retain(|category| category.id != category_id);
            Ok(records.len() != before)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_utils::TestEnvironment;
    use chrono::Utc;

    #[test]
    fn test_category_crud() -> Result<()> {
        let env = TestEnvironment::new()?;
        let repo = CategoryRepository::new(env.store());
        let category = Category {
            id: "category::1".to_string(),
            name: "Home".to_string(),
            color: Some("#3b82f6".to_string()),
            created_at: Utc::now(),
            order: None,
        };

        repo.store_category(&category)?;
        assert_eq!(repo.get_category("category::1")?.map(|c| c.name), Some("Home".to_string()));

        assert!(repo.delete_category("category::1")?);
        assert!(!repo.delete_category("category::1")?);
        assert!(repo.list_categories()?.is_empty());
        Ok(())
    }
}
