//! End-to-end assessment pipeline tests.
//!
//! The artifacts used here make the classifier output easy to reason about:
//! a unit-scale standard scaler centered at 8 work hours and a logistic
//! model that only looks at work hours, so P(at risk) = sigmoid(hours - 8).

use std::path::{Path, PathBuf};
use std::sync::Arc;

use burnout_guard_lib::commands::AppState;
use burnout_guard_lib::config::AppConfig;
use burnout_guard_lib::db::repositories::assessment_repository::AssessmentRepository;
use burnout_guard_lib::db::DbPool;
use burnout_guard_lib::models::assessment::{FeatureInput, RiskLabel};
use burnout_guard_lib::models::behavior::{BehavioralData, ProductivityData};
use burnout_guard_lib::models::recommendation::RiskLevel;
use burnout_guard_lib::services::behavioral_tracker::BehavioralTracker;
use burnout_guard_lib::services::emotion_analyzer::{EmotionAnalyzer, LexiconSentimentBackend};
use burnout_guard_lib::services::prediction_engine::PredictionEngine;
use chrono::Local;
use serde_json::json;
use tempfile::{tempdir, TempDir};

const FEATURE_NAMES: [&str; 5] = [
    "avg_work_hours_per_day",
    "avg_break_time_minutes",
    "meeting_hours_per_week",
    "sentiment_score",
    "task_completion_rate",
];

fn write_artifacts(dir: &Path, coefficients: [f64; 5], intercept: f64) -> (PathBuf, PathBuf) {
    let scaler_path = dir.join("scaler.json");
    let classifier_path = dir.join("burnout_model.json");

    let scaler = json!({
        "kind": "standard_scaler",
        "feature_names": FEATURE_NAMES,
        "mean": [8.0, 0.0, 0.0, 0.0, 0.0],
        "scale": [1.0, 1.0, 1.0, 1.0, 1.0]
    });
    let classifier = json!({
        "kind": "logistic_regression",
        "feature_names": FEATURE_NAMES,
        "coefficients": coefficients,
        "intercept": intercept
    });

    std::fs::write(&scaler_path, scaler.to_string()).expect("write scaler");
    std::fs::write(&classifier_path, classifier.to_string()).expect("write classifier");
    (scaler_path, classifier_path)
}

fn setup_state(coefficients: [f64; 5], persist: bool) -> (AppState, TempDir) {
    let temp_dir = tempdir().expect("temp dir");
    let (scaler_path, classifier_path) = write_artifacts(temp_dir.path(), coefficients, 0.0);

    let mut config = AppConfig::default();
    config.database.path = temp_dir.path().join("wellness_data.db");
    config.assessment.persist_assessments = persist;

    let engine = Arc::new(PredictionEngine::load(&scaler_path, &classifier_path).expect("engine"));
    let analyzer = Arc::new(EmotionAnalyzer::with_backend(
        Arc::new(LexiconSentimentBackend::builtin().expect("lexicon")),
        32,
    ));
    let db = DbPool::new(&config.database.path).expect("db pool");

    let state = AppState::from_parts(config, db, engine, analyzer, BehavioralTracker::with_seed(11));
    (state, temp_dir)
}

fn input(hours: f64) -> FeatureInput {
    FeatureInput {
        avg_work_hours_per_day: Some(hours),
        avg_break_time_minutes: Some(30.0),
        meeting_hours_per_week: Some(10.0),
        task_completion_rate: Some(0.8),
        sentiment_score: Some(-0.2),
    }
}

const HOURS_ONLY: [f64; 5] = [1.0, 0.0, 0.0, 0.0, 0.0];

#[test]
fn critical_assessment_is_reported_and_persisted() {
    let (state, _temp_dir) = setup_state(HOURS_ONLY, true);

    let report = state
        .assessments()
        .assess_input(&input(10.5))
        .expect("assessment");

    // sigmoid(2.5) = 0.924141...
    assert_eq!(report.risk_label, RiskLabel::AtRisk);
    assert_eq!(report.risk_score, 0.9241);
    assert_eq!(report.risk_level, RiskLevel::Critical);
    assert_eq!(report.message, "Immediate attention is strongly recommended.");
    assert!(report
        .suggestion
        .ends_with(" Your average of 10.5 work hours/day is a major contributing factor."));
    assert_eq!(report.sentiment_score, -0.2);

    let latest = state
        .tracking()
        .latest_assessment()
        .expect("latest")
        .expect("row persisted");
    assert_eq!(latest.risk_label, RiskLabel::AtRisk);
    assert_eq!(latest.risk_score, 0.9241);
    assert_eq!(latest.sentiment_score, -0.2);
    assert_eq!(
        latest.assessment_date,
        Local::now().date_naive().format("%Y-%m-%d").to_string()
    );
}

#[test]
fn score_bands_map_to_levels() {
    let (state, _temp_dir) = setup_state(HOURS_ONLY, false);
    let service = state.assessments();

    // sigmoid(1.0) = 0.731058...
    let high = service.assess_input(&input(9.0)).expect("high");
    assert_eq!(high.risk_score, 0.7311);
    assert_eq!(high.risk_level, RiskLevel::High);
    assert_eq!(high.message, "A high risk of burnout has been detected.");

    // sigmoid(0.5) = 0.622459...
    let medium = service.assess_input(&input(8.5)).expect("medium");
    assert_eq!(medium.risk_score, 0.6225);
    assert_eq!(medium.risk_level, RiskLevel::Medium);
    assert_eq!(
        medium.suggestion,
        "Review your daily schedule. Small changes like a 10-minute walk or a short mindfulness exercise can make a big difference."
    );

    // sigmoid(-1.0) = 0.268941...
    let low = service.assess_input(&input(7.0)).expect("low");
    assert_eq!(low.risk_label, RiskLabel::NotAtRisk);
    assert_eq!(low.risk_level, RiskLevel::Low);
    assert_eq!(
        low.suggestion,
        "Keep up the great work! Your current risk score is low (0.2689). Continue prioritizing a healthy work-life balance."
    );
}

#[test]
fn even_odds_resolve_to_not_at_risk() {
    let (state, _temp_dir) = setup_state(HOURS_ONLY, false);

    let report = state
        .assessments()
        .assess_input(&input(8.0))
        .expect("assessment");

    assert_eq!(report.risk_label, RiskLabel::NotAtRisk);
    assert_eq!(report.risk_score, 0.5);
    assert_eq!(report.risk_level, RiskLevel::Low);
    assert!(report.suggestion.contains("(0.5)"));
}

#[test]
fn long_hours_clause_is_skipped_for_low_risk() {
    // Negative weight on hours: long days alone read as low risk.
    let (state, _temp_dir) = setup_state([-1.0, 0.0, 0.0, 0.0, 0.0], false);

    let report = state
        .assessments()
        .assess_input(&input(11.0))
        .expect("assessment");

    assert_eq!(report.risk_level, RiskLevel::Low);
    assert!(!report.suggestion.contains("work hours/day"));
}

#[test]
fn persistence_can_be_disabled() {
    let (state, _temp_dir) = setup_state(HOURS_ONLY, false);

    state
        .assessments()
        .assess_input(&input(10.0))
        .expect("assessment");

    let count = state
        .db()
        .with_connection(AssessmentRepository::count)
        .expect("count");
    assert_eq!(count, 0);
    assert!(state.tracking().latest_assessment().expect("latest").is_none());
}

#[tokio::test]
async fn text_statement_drives_the_sentiment_feature() {
    // Only sentiment matters: P(at risk) = sigmoid(-sentiment).
    let (state, _temp_dir) = setup_state([0.0, 0.0, 0.0, -1.0, 0.0], true);

    let behavioral = BehavioralData {
        avg_work_hours_per_day: 9.5,
        avg_break_time_minutes: 30.0,
        meeting_hours_per_week: 10.0,
    };
    let productivity = ProductivityData {
        task_completion_rate: 0.75,
    };

    let report = state
        .assessments()
        .assess_text(
            behavioral,
            productivity,
            "The workload has been overwhelming lately, and I'm struggling to keep up with the constant deadlines.".to_string(),
        )
        .await
        .expect("assessment");

    assert!(report.sentiment_score < -0.9);
    assert_eq!(report.risk_label, RiskLabel::AtRisk);
    assert_eq!(report.risk_level, RiskLevel::High);

    let positive = state
        .assessments()
        .assess_text(
            behavioral,
            productivity,
            "I feel rested, motivated and happy with my team.".to_string(),
        )
        .await
        .expect("assessment");
    assert!(positive.sentiment_score > 0.9);
    assert_eq!(positive.risk_level, RiskLevel::Low);

    let latest = state
        .tracking()
        .latest_assessment()
        .expect("latest")
        .expect("row");
    assert_eq!(latest.sentiment_score, positive.sentiment_score);
}

#[test]
fn shipped_artifacts_load_and_score() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let engine = PredictionEngine::load(
        &root.join("models/scaler.json"),
        &root.join("models/burnout_model.json"),
    )
    .expect("bundled artifacts");

    let overworked = BehavioralData {
        avg_work_hours_per_day: 12.0,
        avg_break_time_minutes: 10.0,
        meeting_hours_per_week: 20.0,
    };
    let rested = BehavioralData {
        avg_work_hours_per_day: 7.0,
        avg_break_time_minutes: 60.0,
        meeting_hours_per_week: 4.0,
    };
    let productivity = ProductivityData {
        task_completion_rate: 0.6,
    };

    let high = engine
        .get_burnout_risk_score(
            &overworked,
            &productivity,
            burnout_guard_lib::models::behavior::SentimentScore::new(-0.8).expect("score"),
        )
        .expect("score");
    let low = engine
        .get_burnout_risk_score(
            &rested,
            &ProductivityData {
                task_completion_rate: 0.95,
            },
            burnout_guard_lib::models::behavior::SentimentScore::new(0.7).expect("score"),
        )
        .expect("score");

    assert_eq!(high.label, RiskLabel::AtRisk);
    assert_eq!(low.label, RiskLabel::NotAtRisk);
    assert!((0.0..=1.0).contains(&high.score));
    assert!(high.score > low.score);
}
