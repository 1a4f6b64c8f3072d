//! # REST API for Ledger Transactions
//!
//! Endpoints for recording, editing and removing transactions, plus the
//! overview of every person's balance.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{get, patch, post},
    Router,
};
use shared::{
    CreateTransactionRequest, DeleteResponse, LedgerOverview, Transaction, UpdateTransactionRequest,
};
use tracing::info;

use crate::io::rest::error::ApiResult;
use crate::mappers::TransactionMapper;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/transactions", post(create_transaction))
        .route(
            "/transactions/:id",
            patch(update_transaction).delete(delete_transaction),
        )
        .route("/ledger/overview", get(get_overview))
}

/// Record a new transaction
pub async fn create_transaction(
    State(state): State<AppState>,
    Json(request): Json<CreateTransactionRequest>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    info!("POST /api/transactions - request: {:?}", request);

    let command = TransactionMapper::to_create_command(request)?;
    let transaction = state.transaction_service.create_transaction(command)?;
    Ok((StatusCode::CREATED, Json(TransactionMapper::to_dto(&transaction))))
}

pub async fn update_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
    Json(request): Json<UpdateTransactionRequest>,
) -> ApiResult<Json<Transaction>> {
    info!("PATCH /api/transactions/{} - request: {:?}", transaction_id, request);

    let command = TransactionMapper::to_update_command(request)?;
    let transaction = state
        .transaction_service
        .update_transaction(&transaction_id, command)?;
    Ok(Json(TransactionMapper::to_dto(&transaction)))
}

pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(transaction_id): Path<String>,
) -> ApiResult<Json<DeleteResponse>> {
    info!("DELETE /api/transactions/{}", transaction_id);

    state.transaction_service.delete_transaction(&transaction_id)?;
    Ok(Json(DeleteResponse {
        deleted_ids: vec![transaction_id],
        success_message: "Transaction deleted".to_string(),
    }))
}

/// Balances for everyone, most recently active first
pub async fn get_overview(State(state): State<AppState>) -> ApiResult<Json<LedgerOverview>> {
    info!("GET /api/ledger/overview");

    let overview = state.transaction_service.overview()?;
    Ok(Json(TransactionMapper::to_ledger_overview_dto(overview)))
}
