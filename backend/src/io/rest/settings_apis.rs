use axum::{extract::State, response::Json, routing::get, Router};
use shared::{Settings, UpdateSettingsRequest};
use tracing::info;

use crate::io::rest::error::ApiResult;
use crate::mappers::SettingsMapper;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).patch(update_settings))
}

pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<Settings>> {
    info!("GET /api/settings");

    let settings = state.settings_service.get_settings()?;
    Ok(Json(SettingsMapper::to_dto(&settings)))
}

/// Partial update of the user's preferences
pub async fn update_settings(
    State(state): State<AppState>,
    Json(request): Json<UpdateSettingsRequest>,
) -> ApiResult<Json<Settings>> {
    info!("PATCH /api/settings - request: {:?}", request);

    let settings = state
        .settings_service
        .update_settings(SettingsMapper::to_update_command(request))?;
    Ok(Json(SettingsMapper::to_dto(&settings)))
}
