use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::commands::{run_blocking, AppState, CommandError, CommandResult};
use crate::models::assessment::{
    AssessmentHistoryPoint, AssessmentRecord, AssessmentReport, FeatureInput,
};
use crate::services::feature_assembler::FeatureAssembler;

/// Feature input; `text` stands in for `sentiment_score` when the latter is absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssessmentRequest {
    #[serde(flatten)]
    pub features: FeatureInput,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<usize>,
}

pub async fn create_assessment(
    State(state): State<AppState>,
    Json(request): Json<AssessmentRequest>,
) -> CommandResult<Json<AssessmentReport>> {
    let service = state.assessments();

    match (request.features.sentiment_score, request.text) {
        (None, Some(text)) => {
            let mut features = request.features;
            features.sentiment_score = Some(0.0);
            let (behavioral, productivity, _) =
                FeatureAssembler::parse_input(&features).map_err(CommandError::from)?;

            service
                .assess_text(behavioral, productivity, text)
                .await
                .map(Json)
                .map_err(CommandError::from)
        }
        _ => {
            let features = request.features;
            run_blocking(move || service.assess_input(&features))
                .await
                .map(Json)
        }
    }
}

pub async fn assessment_history(
    State(state): State<AppState>,
    Query(query): Query<HistoryQuery>,
) -> CommandResult<Json<Vec<AssessmentHistoryPoint>>> {
    let tracking = state.tracking();
    run_blocking(move || tracking.assessment_history(query.limit))
        .await
        .map(Json)
}

pub async fn latest_assessment(
    State(state): State<AppState>,
) -> CommandResult<Json<Option<AssessmentRecord>>> {
    let tracking = state.tracking();
    run_blocking(move || tracking.latest_assessment())
        .await
        .map(Json)
}
