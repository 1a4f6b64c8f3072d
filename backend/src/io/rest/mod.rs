//! # REST API Interface Layer
//!
//! Provides the HTTP endpoints for Daybook. Handlers parse the `shared`
//! request DTOs into domain commands through the mappers, call one service
//! and map the result back; failures go through [`error::ApiError`].
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: one router per area, merged under `/api`
//! - **Error Handling**: domain failures become 400 / 404 / 500 with a JSON body
//! - **Request Logging**: every handler logs its method and path

pub mod category_apis;
pub mod error;
pub mod maintenance_apis;
pub mod person_apis;
pub mod prayer_apis;
pub mod settings_apis;
pub mod task_apis;
pub mod transaction_apis;

pub use error::{ApiError, ApiResult};

use axum::Router;

use crate::AppState;

/// Every API route, relative to the `/api` prefix
pub fn api_router() -> Router<AppState> {
    Router::new()
        .merge(category_apis::router())
        .merge(task_apis::router())
        .merge(person_apis::router())
        .merge(transaction_apis::router())
        .merge(settings_apis::router())
        .merge(maintenance_apis::router())
        .merge(prayer_apis::router())
}
