use shared::{
    Category as SharedCategory, CategoryListResponse, CreateCategoryRequest, UpdateCategoryRequest,
};

use super::{format_timestamp, parse_timestamp};
use crate::domain::commands::categories::{CreateCategoryCommand, UpdateCategoryCommand};
use crate::domain::errors::ValidationError;
use crate::domain::models::category::Category as DomainCategory;

/// Mapper to convert between shared Category DTOs and domain Category models.
pub struct CategoryMapper;

impl CategoryMapper {
    pub fn to_domain(dto: SharedCategory) -> Result<DomainCategory, ValidationError> {
        if dto.id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "id" });
        }
        if dto.name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        Ok(DomainCategory {
            created_at: parse_timestamp("createdAt", &dto.created_at)?,
            id: dto.id,
            name: dto.name,
            color: dto.color,
            order: dto.order,
        })
    }

    pub fn to_dto(domain: &DomainCategory) -> SharedCategory {
        SharedCategory {
            id: domain.id.clone(),
            name: domain.name.clone(),
            color: domain.color.clone(),
            created_at: format_timestamp(domain.created_at),
            order: domain.order,
        }
    }

    pub fn to_category_list_dto(categories: &[DomainCategory]) -> CategoryListResponse {
        CategoryListResponse {
            categories: categories.iter().map(Self::to_dto).collect(),
        }
    }

    pub fn to_create_command(request: CreateCategoryRequest) -> CreateCategoryCommand {
        CreateCategoryCommand {
            name: request.name,
            color: request.color,
        }
    }

    pub fn to_update_command(request: UpdateCategoryRequest) -> UpdateCategoryCommand {
        UpdateCategoryCommand {
            name: request.name,
            color: request.color,
            order: request.order,
        }
    }
}
