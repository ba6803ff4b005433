// Error handling and edge case tests

use std::path::{Path, PathBuf};
use std::sync::Arc;

use burnout_guard_lib::commands::{AppState, CommandError};
use burnout_guard_lib::config::{AppConfig, SentimentProvider};
use burnout_guard_lib::db::repositories::assessment_repository::AssessmentRepository;
use burnout_guard_lib::db::DbPool;
use burnout_guard_lib::error::AppError;
use burnout_guard_lib::models::assessment::FeatureInput;
use burnout_guard_lib::models::behavior::{BehavioralData, ProductivityData};
use burnout_guard_lib::services::assessment_service::AssessmentService;
use burnout_guard_lib::services::emotion_analyzer::EmotionAnalyzer;
use burnout_guard_lib::services::feature_assembler::FeatureAssembler;
use burnout_guard_lib::services::prediction_engine::PredictionEngine;
use futures::future::join_all;
use serde_json::json;
use tempfile::{tempdir, TempDir};

const FEATURE_NAMES: [&str; 5] = [
    "avg_work_hours_per_day",
    "avg_break_time_minutes",
    "meeting_hours_per_week",
    "sentiment_score",
    "task_completion_rate",
];

fn scaler_json(feature_names: &[&str]) -> String {
    json!({
        "kind": "standard_scaler",
        "feature_names": feature_names,
        "mean": [8.0, 30.0, 10.0, 0.0, 0.75],
        "scale": [1.5, 10.0, 4.0, 0.5, 0.1]
    })
    .to_string()
}

fn classifier_json() -> String {
    json!({
        "kind": "logistic_regression",
        "feature_names": FEATURE_NAMES,
        "coefficients": [1.2, -0.4, 0.3, -0.9, -0.6],
        "intercept": -0.2
    })
    .to_string()
}

fn write_artifacts(dir: &Path, scaler: &str, classifier: &str) -> (PathBuf, PathBuf) {
    let scaler_path = dir.join("scaler.json");
    let classifier_path = dir.join("burnout_model.json");
    std::fs::write(&scaler_path, scaler).expect("write scaler");
    std::fs::write(&classifier_path, classifier).expect("write classifier");
    (scaler_path, classifier_path)
}

fn config_for(dir: &Path, scaler_path: PathBuf, classifier_path: PathBuf) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.path = dir.join("wellness_data.db");
    config.models.scaler_path = scaler_path;
    config.models.classifier_path = classifier_path;
    config.sentiment.provider = SentimentProvider::Disabled;
    config
}

fn setup_service() -> (DbPool, Arc<AssessmentService>, TempDir) {
    let dir = tempdir().expect("temp dir");
    let db = DbPool::new(dir.path().join("test.sqlite")).expect("db pool");
    let engine = Arc::new(
        PredictionEngine::from_json(&scaler_json(&FEATURE_NAMES), &classifier_json())
            .expect("engine"),
    );
    let service = Arc::new(AssessmentService::new(
        db.clone(),
        engine,
        Arc::new(EmotionAnalyzer::degraded("no sentiment model", 8)),
        true,
    ));
    (db, service, dir)
}

fn complete_input() -> FeatureInput {
    FeatureInput {
        avg_work_hours_per_day: Some(9.0),
        avg_break_time_minutes: Some(25.0),
        meeting_hours_per_week: Some(12.0),
        task_completion_rate: Some(0.7),
        sentiment_score: Some(-0.3),
    }
}

#[test]
fn missing_field_is_named() {
    let (_db, service, _dir) = setup_service();

    let mut input = complete_input();
    input.meeting_hours_per_week = None;

    let error = service.assess_input(&input).expect_err("missing field");
    assert!(matches!(
        error,
        AppError::MissingField {
            field: "meeting_hours_per_week"
        }
    ));
}

#[test]
fn first_missing_field_in_column_order_is_reported() {
    let input = FeatureInput {
        avg_work_hours_per_day: Some(8.0),
        ..FeatureInput::default()
    };

    let error = FeatureAssembler::parse_input(&input).expect_err("missing fields");
    assert!(matches!(
        error,
        AppError::MissingField {
            field: "avg_break_time_minutes"
        }
    ));

    let command_error = CommandError::from(error);
    assert_eq!(command_error.code, "MISSING_FIELD");
    assert_eq!(command_error.status().as_u16(), 422);
}

#[test]
fn rejected_request_leaves_no_history_row() {
    let (db, service, _dir) = setup_service();

    let mut input = complete_input();
    input.task_completion_rate = Some(1.5);

    let error = service.assess_input(&input).expect_err("out of range");
    assert!(matches!(error, AppError::Validation { .. }));

    let count = db.with_connection(AssessmentRepository::count).expect("count");
    assert_eq!(count, 0);
}

#[test]
fn sentiment_outside_unit_interval_is_rejected() {
    let mut input = complete_input();
    input.sentiment_score = Some(-1.5);

    let error = FeatureAssembler::parse_input(&input).expect_err("bad sentiment");
    assert!(matches!(error, AppError::Validation { .. }));
}

#[tokio::test]
async fn blank_statement_is_rejected_before_scoring() {
    let (db, service, _dir) = setup_service();

    let behavioral = BehavioralData {
        avg_work_hours_per_day: 9.0,
        avg_break_time_minutes: 20.0,
        meeting_hours_per_week: 10.0,
    };
    let productivity = ProductivityData {
        task_completion_rate: 0.7,
    };

    let error = Arc::clone(&service)
        .assess_text(behavioral, productivity, "   ".to_string())
        .await
        .expect_err("empty input");
    assert!(matches!(error, AppError::EmptyInput));

    let count = db.with_connection(AssessmentRepository::count).expect("count");
    assert_eq!(count, 0);
}

#[tokio::test]
async fn degraded_analyzer_scores_neutral() {
    let (_db, service, _dir) = setup_service();

    let behavioral = BehavioralData {
        avg_work_hours_per_day: 9.0,
        avg_break_time_minutes: 20.0,
        meeting_hours_per_week: 10.0,
    };
    let productivity = ProductivityData {
        task_completion_rate: 0.7,
    };

    let report = service
        .assess_text(behavioral, productivity, "I am exhausted".to_string())
        .await
        .expect("assessment");
    assert_eq!(report.sentiment_score, 0.0);
}

#[test]
fn missing_artifact_aborts_startup() {
    let dir = tempdir().expect("temp dir");
    let config = config_for(
        dir.path(),
        dir.path().join("missing_scaler.json"),
        dir.path().join("missing_model.json"),
    );

    let error = AppState::new(config).err().expect("startup fails");
    assert!(matches!(error, AppError::ModelLoad { .. }));
    assert!(error.is_fatal());
}

#[test]
fn reordered_feature_names_abort_startup() {
    let dir = tempdir().expect("temp dir");
    let mut reordered = FEATURE_NAMES;
    reordered.swap(0, 4);
    let (scaler_path, classifier_path) =
        write_artifacts(dir.path(), &scaler_json(&reordered), &classifier_json());

    let error = AppState::new(config_for(dir.path(), scaler_path, classifier_path))
        .err()
        .expect("startup fails");
    assert!(matches!(error, AppError::ModelLoad { .. }));
}

#[test]
fn malformed_forest_aborts_startup() {
    let dir = tempdir().expect("temp dir");
    let forest = json!({
        "kind": "random_forest",
        "feature_names": FEATURE_NAMES,
        "trees": [{
            "nodes": [
                { "feature": 0, "threshold": 0.0, "left": 1, "right": 7 },
                { "value": [3.0, 1.0] }
            ]
        }]
    })
    .to_string();
    let (scaler_path, classifier_path) =
        write_artifacts(dir.path(), &scaler_json(&FEATURE_NAMES), &forest);

    let error = AppState::new(config_for(dir.path(), scaler_path, classifier_path))
        .err()
        .expect("startup fails");
    assert!(matches!(error, AppError::ModelLoad { .. }));
}

#[test]
fn valid_artifacts_start_with_disabled_sentiment() {
    let dir = tempdir().expect("temp dir");
    let (scaler_path, classifier_path) =
        write_artifacts(dir.path(), &scaler_json(&FEATURE_NAMES), &classifier_json());

    let state = AppState::new(config_for(dir.path(), scaler_path, classifier_path))
        .expect("startup succeeds");
    assert!(state.emotion().is_degraded());
}

#[tokio::test]
async fn concurrent_assessments_all_append() {
    let (db, service, _dir) = setup_service();

    let tasks = (0..8).map(|index| {
        let service = Arc::clone(&service);
        tokio::task::spawn_blocking(move || {
            let mut input = complete_input();
            input.avg_work_hours_per_day = Some(8.0 + index as f64 * 0.5);
            service.assess_input(&input)
        })
    });

    let results = join_all(tasks).await;
    for result in results {
        result.expect("task joined").expect("assessment succeeded");
    }

    let count = db.with_connection(AssessmentRepository::count).expect("count");
    assert_eq!(count, 8);

    let distinct: i64 = db
        .with_connection(|conn| {
            Ok(conn.query_row("SELECT COUNT(DISTINCT id) FROM assessments", [], |row| {
                row.get(0)
            })?)
        })
        .expect("distinct ids");
    assert_eq!(distinct, 8);
}
