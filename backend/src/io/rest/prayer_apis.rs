use axum::{
    extract::{Path, State},
    response::Json,
    routing::post,
    Router,
};
use shared::PrayerScheduleResponse;
use tracing::info;

use crate::io::rest::error::ApiResult;
use crate::mappers::{format_date, parse_date, TaskMapper};
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/prayers/:date", post(schedule_prayers))
}

/// Create or refresh the prayer tasks of one day
pub async fn schedule_prayers(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> ApiResult<Json<PrayerScheduleResponse>> {
    info!("POST /api/prayers/{}", date);

    let date = parse_date("date", &date)?;
    let schedule = state.prayer_service.schedule_prayers(date)?;
    Ok(Json(PrayerScheduleResponse {
        date: format_date(schedule.date),
        tasks: schedule.tasks.iter().map(TaskMapper::to_dto).collect(),
    }))
}
