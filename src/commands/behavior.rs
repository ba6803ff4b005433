use axum::extract::{Path, State};
use axum::Json;

use crate::commands::{AppState, CommandError, CommandResult};
use crate::error::AppError;
use crate::models::behavior::BehaviorSnapshot;

pub async fn simulate_behavior(
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> CommandResult<Json<BehaviorSnapshot>> {
    let employee_id = employee_id.trim();
    if employee_id.is_empty() {
        return Err(CommandError::from(AppError::validation(
            "employee_id must not be empty",
        )));
    }

    Ok(Json(state.behavior().snapshot(employee_id)))
}
