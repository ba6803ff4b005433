use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::commands::AppState;
use crate::services::emotion_analyzer::SentimentStatus;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub version: &'static str,
    pub sentiment: SentimentStatus,
    pub persist_assessments: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthReport> {
    Json(HealthReport {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        sentiment: state.emotion().status().clone(),
        persist_assessments: state.config().assessment.persist_assessments,
    })
}
