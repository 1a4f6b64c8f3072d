//! # REST API for Task Management
//!
//! Endpoints for task CRUD, the per-day view, completion toggling and the
//! upcoming dates of recurring tasks. Ids of virtual occurrences
//! (`{master_id}::instance::{date}`) are accepted wherever a task is read
//! or toggled.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use shared::{
    CreateTaskRequest, DayTasksResponse, DeleteResponse, Task, TaskListResponse, TaskResponse,
    UpcomingDatesResponse, UpdateTaskRequest,
};
use tracing::info;

use crate::domain::commands::tasks::TaskListQuery;
use crate::io::rest::error::ApiResult;
use crate::mappers::{parse_date, parse_optional_date, TaskMapper};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/day/:date", get(tasks_for_date))
        .route("/tasks/:id", get(get_task).patch(update_task).delete(delete_task))
        .route("/tasks/:id/toggle", post(toggle_completion))
        .route("/tasks/:id/upcoming", get(upcoming_dates))
}

/// Query parameters for the task list endpoint
#[derive(Deserialize, Debug, Default)]
pub struct TaskListParams {
    pub category_id: Option<String>,
}

/// Query parameters for the upcoming dates endpoint
#[derive(Deserialize, Debug, Default)]
pub struct UpcomingParams {
    pub from: Option<String>,
    pub limit: Option<usize>,
}

/// List stored tasks, optionally for one category
pub async fn list_tasks(
    State(state): State<AppState>,
    Query(params): Query<TaskListParams>,
) -> ApiResult<Json<TaskListResponse>> {
    info!("GET /api/tasks - query: {:?}", params);

    let tasks = state.task_service.list_tasks(TaskListQuery {
        category_id: params.category_id,
    })?;
    Ok(Json(TaskMapper::to_task_list_dto(&tasks)))
}

/// Create a new task
pub async fn create_task(
    State(state): State<AppState>,
    Json(request): Json<CreateTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    info!("POST /api/tasks - request: {:?}", request);

    let command = TaskMapper::to_create_command(request)?;
    let task = state.task_service.create_task(command)?;
    Ok((StatusCode::CREATED, Json(TaskMapper::to_dto(&task))))
}

/// Everything scheduled on one day, recurring occurrences included
pub async fn tasks_for_date(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<DayTasksResponse>> {
    info!("GET /api/tasks/day/{}", date);

    let date = parse_date("date", &date)?;
    let tasks = state.task_service.tasks_for_date(date)?;
    Ok(Json(TaskMapper::to_day_tasks_dto(date, &tasks)))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<TaskResponse>> {
    info!("GET /api/tasks/{}", task_id);

    let details = state.task_service.get_task(&task_id)?;
    Ok(Json(TaskMapper::to_task_response_dto(details)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Json(request): Json<UpdateTaskRequest>,
) -> ApiResult<Json<Task>> {
    info!("PATCH /api/tasks/{} - request: {:?}", task_id, request);

    let command = TaskMapper::to_update_command(request)?;
    let task = state.task_service.update_task(&task_id, command)?;
    Ok(Json(TaskMapper::to_dto(&task)))
}

/// Delete a task and all of its subtasks
pub async fn delete_task(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    info!("DELETE /api/tasks/{}", task_id);

    let result = state.task_service.delete_task(&task_id)?;
    let success_message = format!("Deleted {} tasks", result.deleted_ids.len());
    Ok(Json(DeleteResponse {
        deleted_ids: result.deleted_ids,
        success_message,
    }))
}

pub async fn toggle_completion(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> ApiResult<Json<Task>> {
    info!("POST /api/tasks/{}/toggle", task_id);

    let task = state.task_service.toggle_completion(&task_id)?;
    Ok(Json(TaskMapper::to_dto(&task)))
}

pub async fn upcoming_dates(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
    Query(params): Query<UpcomingParams>,
) -> ApiResult<Json<UpcomingDatesResponse>> {
    info!("GET /api/tasks/{}/upcoming - query: {:?}", task_id, params);

    let from = parse_optional_date("from", params.from.as_deref())?;
    let dates = state.task_service.upcoming_dates(&task_id, from, params.limit)?;
    Ok(Json(TaskMapper::to_upcoming_dates_dto(&task_id, &dates)))
}
