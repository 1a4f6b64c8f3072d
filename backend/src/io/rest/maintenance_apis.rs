use axum::{extract::State, response::Json, routing::post, Router};
use shared::IntegrityReport;
use tracing::info;

use crate::io::rest::error::ApiResult;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/maintenance/integrity", post(run_integrity_check))
}

/// Remove dangling tasks, completion records and transactions
pub async fn run_integrity_check(State(state): State<AppState>) -> ApiResult<Json<IntegrityReport>> {
    info!("POST /api/maintenance/integrity");

    let report = state.integrity_service.run_maintenance()?;
    Ok(Json(IntegrityReport {
        removed_task_ids: report.removed_task_ids,
        removed_completion_count: report.removed_completion_count,
        removed_transaction_ids: report.removed_transaction_ids,
    }))
}
