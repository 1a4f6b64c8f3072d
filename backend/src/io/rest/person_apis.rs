//! # REST API for People
//!
//! Endpoints for the ledger's counterparties, their balance summary and
//! the CSV export of their history.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use shared::{
    CreatePersonRequest, DeleteResponse, ExportLedgerResponse, LedgerSummary, Person,
    PersonListResponse, UpdatePersonRequest,
};
use tracing::info;

use crate::io::rest::error::ApiResult;
use crate::mappers::{PersonMapper, TransactionMapper};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/people", get(list_people).post(create_person))
        .route(
            "/people/:id",
            get(get_person).patch(update_person).delete(delete_person),
        )
        .route("/people/:id/ledger", get(get_ledger))
        .route("/people/:id/export", get(export_ledger))
}

pub async fn list_people(State(state): State<AppState>) -> ApiResult<Json<PersonListResponse>> {
    info!("GET /api/people");

    let people = state.person_service.list_people()?;
    Ok(Json(PersonMapper::to_person_list_dto(&people)))
}

pub async fn create_person(
    State(state): State<AppState>,
    Json(request): Json<CreatePersonRequest>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    info!("POST /api/people - request: {:?}", request);

    let person = state
        .person_service
        .create_person(PersonMapper::to_create_command(request))?;
    Ok((StatusCode::CREATED, Json(PersonMapper::to_dto(&person))))
}

pub async fn get_person(
    State(state): State<AppState>,
    Path(person_id): Path<String>,
) -> ApiResult<Json<Person>> {
    info!("GET /api/people/{}", person_id);

    let person = state.person_service.get_person(&person_id)?;
    Ok(Json(PersonMapper::to_dto(&person)))
}

pub async fn update_person(
    State(state): State<AppState>,
    Path(person_id): Path<String>,
    Json(request): Json<UpdatePersonRequest>,
) -> ApiResult<Json<Person>> {
    info!("PATCH /api/people/{} - request: {:?}", person_id, request);

    let person = state
        .person_service
        .update_person(&person_id, PersonMapper::to_update_command(request))?;
    Ok(Json(PersonMapper::to_dto(&person)))
}

/// Delete a person and every transaction recorded with them
pub async fn delete_person(
    State(state): State<AppState>,
    Path(person_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    info!("DELETE /api/people/{}", person_id);

    let result = state.person_service.delete_person(&person_id)?;
    let success_message = format!(
        "Person deleted with {} transactions",
        result.deleted_transaction_ids.len()
    );
    let mut deleted_ids = vec![result.person_id];
    deleted_ids.extend(result.deleted_transaction_ids);
    Ok(Json(DeleteResponse {
        deleted_ids,
        success_message,
    }))
}

pub async fn get_ledger(
    State(state): State<AppState>,
    Path(person_id): Path<String>,
) -> ApiResult<Json<LedgerSummary>> {
    info!("GET /api/people/{}/ledger", person_id);

    let summary = state.transaction_service.ledger_for_person(&person_id)?;
    Ok(Json(TransactionMapper::to_ledger_summary_dto(summary)))
}

pub async fn export_ledger(
    State(state): State<AppState>,
    Path(person_id): Path<String>,
) -> ApiResult<Json<ExportLedgerResponse>> {
    info!("GET /api/people/{}/export", person_id);

    let export = state.export_service.export_ledger_csv(&person_id)?;
    Ok(Json(TransactionMapper::to_export_dto(export)))
}
