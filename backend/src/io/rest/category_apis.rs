//! # REST API for Category Management
//!
//! Endpoints for listing, creating, reordering, updating and deleting
//! task categories.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use shared::{
    Category, CategoryListResponse, CreateCategoryRequest, DeleteResponse, ReorderCategoriesRequest,
    UpdateCategoryRequest,
};
use tracing::info;

use crate::io::rest::error::ApiResult;
use crate::mappers::CategoryMapper;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route("/categories/reorder", post(reorder_categories))
        .route("/categories/:id", patch(update_category).delete(delete_category))
}

/// List all categories in display order
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Json<CategoryListResponse>> {
    info!("GET /api/categories");

    let categories = state.category_service.list_categories()?;
    Ok(Json(CategoryMapper::to_category_list_dto(&categories)))
}

/// Create a new category
pub async fn create_category(
    State(state): State<AppState>,
    Json(request): Json<CreateCategoryRequest>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    info!("POST /api/categories - request: {:?}", request);

    let command = CategoryMapper::to_create_command(request);
    let category = state.category_service.create_category(command)?;
    Ok((StatusCode::CREATED, Json(CategoryMapper::to_dto(&category))))
}

pub async fn reorder_categories(
    State(state): State<AppState>,
    Json(request): Json<ReorderCategoriesRequest>,
) -> ApiResult<Json<CategoryListResponse>> {
    info!("POST /api/categories/reorder - request: {:?}", request);

    let categories = state.category_service.reorder_categories(&request.category_ids)?;
    Ok(Json(CategoryMapper::to_category_list_dto(&categories)))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Json(request): Json<UpdateCategoryRequest>,
) -> ApiResult<Json<Category>> {
    info!("PATCH /api/categories/{} - request: {:?}", category_id, request);

    let command = CategoryMapper::to_update_command(request);
    let category = state.category_service.update_category(&category_id, command)?;
    Ok(Json(CategoryMapper::to_dto(&category)))
}

/// Delete a category along with its tasks
pub async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    info!("DELETE /api/categories/{}", category_id);

    let result = state.category_service.delete_category(&category_id)?;
    let success_message = format!(
        "Category deleted with {} tasks",
        result.deleted_task_ids.len()
    );
    Ok(Json(DeleteResponse {
        deleted_ids: result.deleted_task_ids,
        success_message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rest::test_support::{send, test_state};
    use axum::http::Method;
    use serde_json::json;

    fn app() -> Router {
        router().with_state(test_state())
    }

    #[tokio::test]
    async fn test_create_list_and_reorder() {
        let app = app();

        let (status, first) = send(&app, Method::POST, "/categories", Some(json!({"name": "Home"}))).await;
        assert_eq!(status, StatusCode::CREATED);
        let (_, second) = send(&app, Method::POST, "/categories", Some(json!({"name": "Work", "color": "#f00"}))).await;

        let (status, reordered) = send(
            &app,
            Method::POST,
            "/categories/reorder",
            Some(json!({"categoryIds": [second["id"], first["id"]]})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reordered["categories"][0]["name"], "Work");
        assert_eq!(reordered["categories"][1]["name"], "Home");

        let (_, listed) = send(&app, Method::GET, "/categories", None).await;
        assert_eq!(listed["categories"].as_array().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_blank_name_is_bad_request() {
        let app = app();

        let (status, body) = send(&app, Method::POST, "/categories", Some(json!({"name": "  "}))).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "name cannot be empty");
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown() {
        let app = app();
        let (_, created) = send(&app, Method::POST, "/categories", Some(json!({"name": "Gym"}))).await;
        let uri = format!("/categories/{}", created["id"].as_str().unwrap());

        let (status, updated) = send(&app, Method::PATCH, &uri, Some(json!({"name": "Fitness"}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Fitness");

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("Category not found"));
    }
}
