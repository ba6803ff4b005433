pub mod assessment;
pub mod behavior;
pub mod health;
pub mod report;
pub mod tracking;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value as JsonValue};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::services::assessment_service::AssessmentService;
use crate::services::behavioral_tracker::BehavioralTracker;
use crate::services::emotion_analyzer::EmotionAnalyzer;
use crate::services::prediction_engine::PredictionEngine;
use crate::services::tracking_service::TrackingService;

#[derive(Clone)]
pub struct AppState {
    config: Arc<AppConfig>,
    db_pool: DbPool,
    assessment_service: Arc<AssessmentService>,
    tracking_service: Arc<TrackingService>,
    emotion_analyzer: Arc<EmotionAnalyzer>,
    behavioral_tracker: Arc<BehavioralTracker>,
}

impl AppState {
    /// Builds every long-lived resource. Model artifacts that fail to load
    /// abort startup; a missing sentiment backend only degrades.
    pub fn new(config: AppConfig) -> AppResult<Self> {
        let engine = Arc::new(PredictionEngine::load(
            &config.models.scaler_path,
            &config.models.classifier_path,
        )?);
        let emotion_analyzer = Arc::new(EmotionAnalyzer::from_config(&config.sentiment));
        let db_pool = DbPool::new(&config.database.path)?;

        Ok(Self::from_parts(
            config,
            db_pool,
            engine,
            emotion_analyzer,
            BehavioralTracker::new(),
        ))
    }

    pub fn from_parts(
        config: AppConfig,
        db_pool: DbPool,
        engine: Arc<PredictionEngine>,
        emotion_analyzer: Arc<EmotionAnalyzer>,
        behavioral_tracker: BehavioralTracker,
    ) -> Self {
        let assessment_service = Arc::new(AssessmentService::new(
            db_pool.clone(),
            engine,
            Arc::clone(&emotion_analyzer),
            config.assessment.persist_assessments,
        ));
        let tracking_service = Arc::new(TrackingService::new(
            db_pool.clone(),
            config.assessment.history_limit,
        ));

        info!(
            target: "app::command",
            db_path = %db_pool.path().display(),
            persist = config.assessment.persist_assessments,
            "application state ready"
        );

        Self {
            config: Arc::new(config),
            db_pool,
            assessment_service,
            tracking_service,
            emotion_analyzer,
            behavioral_tracker: Arc::new(behavioral_tracker),
        }
    }

    pub fn config(&self) -> Arc<AppConfig> {
        Arc::clone(&self.config)
    }

    pub fn db(&self) -> DbPool {
        self.db_pool.clone()
    }

    pub fn assessments(&self) -> Arc<AssessmentService> {
        Arc::clone(&self.assessment_service)
    }

    pub fn tracking(&self) -> Arc<TrackingService> {
        Arc::clone(&self.tracking_service)
    }

    pub fn emotion(&self) -> Arc<EmotionAnalyzer> {
        Arc::clone(&self.emotion_analyzer)
    }

    pub fn behavior(&self) -> Arc<BehavioralTracker> {
        Arc::clone(&self.behavioral_tracker)
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(report::index_page))
        .route("/report", post(report::submit_report))
        .route("/api/assessments", post(assessment::create_assessment))
        .route("/api/assessments/history", get(assessment::assessment_history))
        .route("/api/assessments/latest", get(assessment::latest_assessment))
        .route(
            "/api/tracking/today",
            get(tracking::tracking_today).put(tracking::update_tracking_today),
        )
        .route("/api/behavior/:employee_id", get(behavior::simulate_behavior))
        .route("/health", get(health::health_check))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub type CommandResult<T> = Result<T, CommandError>;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandError {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl CommandError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Option<JsonValue>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.code.as_str() {
            "MISSING_FIELD" | "EMPTY_INPUT" | "VALIDATION_ERROR" => StatusCode::UNPROCESSABLE_ENTITY,
            "NOT_FOUND" => StatusCode::NOT_FOUND,
            "CONFLICT" => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AppError> for CommandError {
    fn from(error: AppError) -> Self {
        match error {
            AppError::MissingField { field } => CommandError::new(
                "MISSING_FIELD",
                format!("missing required field: {field}"),
                Some(json!({ "field": field })),
            ),
            AppError::EmptyInput => {
                CommandError::new("EMPTY_INPUT", "text must not be empty", None)
            }
            AppError::Validation {
                message, details, ..
            } => CommandError::new("VALIDATION_ERROR", message, details),
            AppError::NotFound => CommandError::new("NOT_FOUND", "requested resource not found", None),
            AppError::Conflict { message } => CommandError::new("CONFLICT", message, None),
            AppError::ModelLoad { message } | AppError::Prediction { message } => {
                error!(target: "app::command", %message, "model error in command");
                CommandError::new("MODEL_ERROR", message, None)
            }
            AppError::SentimentUnavailable(message) => {
                warn!(target: "app::command", %message, "sentiment unavailable in command");
                CommandError::new("UNKNOWN", format!("sentiment analysis unavailable: {message}"), None)
            }
            AppError::Database { message } => {
                error!(target: "app::command", %message, "database error in command");
                CommandError::new("UNKNOWN", message, None)
            }
            AppError::Config { message } => {
                error!(target: "app::command", %message, "configuration error in command");
                CommandError::new("UNKNOWN", message, None)
            }
            AppError::Serialization(error) => {
                error!(target: "app::command", error = %error, "serialization error in command");
                CommandError::new("UNKNOWN", "serialization failed", None)
            }
            AppError::Io(error) => {
                error!(target: "app::command", error = %error, "io error in command");
                CommandError::new("UNKNOWN", "file system access failed", None)
            }
            AppError::Other(message) => {
                error!(target: "app::command", %message, "unexpected error in command");
                CommandError::new("UNKNOWN", message, None)
            }
        }
    }
}

impl IntoResponse for CommandError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

pub(crate) async fn run_blocking<T: Send + 'static>(
    task: impl FnOnce() -> Result<T, AppError> + Send + 'static,
) -> CommandResult<T> {
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|err| CommandError::new("UNKNOWN", format!("background task failed: {err}"), None))?
        .map_err(CommandError::from)
}
