use axum::extract::State;
use axum::Json;

use crate::commands::{run_blocking, AppState, CommandResult};
use crate::models::tracking::{DailyTrackingRecord, TrackingUpdate};

pub async fn tracking_today(
    State(state): State<AppState>,
) -> CommandResult<Json<DailyTrackingRecord>> {
    let tracking = state.tracking();
    run_blocking(move || tracking.get_or_create_today())
        .await
        .map(Json)
}

pub async fn update_tracking_today(
    State(state): State<AppState>,
    Json(update): Json<TrackingUpdate>,
) -> CommandResult<Json<DailyTrackingRecord>> {
    let tracking = state.tracking();
    run_blocking(move || tracking.update_today(update))
        .await
        .map(Json)
}
