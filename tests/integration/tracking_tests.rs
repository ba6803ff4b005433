//! Daily tracking and assessment history tests.

use burnout_guard_lib::db::repositories::assessment_repository::AssessmentRepository;
use burnout_guard_lib::db::DbPool;
use burnout_guard_lib::error::AppError;
use burnout_guard_lib::models::assessment::{AssessmentInsert, RiskLabel};
use burnout_guard_lib::models::tracking::TrackingUpdate;
use burnout_guard_lib::services::tracking_service::TrackingService;
use chrono::NaiveDate;
use tempfile::{tempdir, TempDir};

fn setup_test_env() -> (DbPool, TrackingService, TempDir) {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");
    let db = DbPool::new(&db_path).expect("Failed to create test database");
    let service = TrackingService::new(db.clone(), 30);
    (db, service, temp_dir)
}

fn date(value: &str) -> NaiveDate {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").expect("valid date")
}

fn insert_assessment(db: &DbPool, assessment_date: &str, risk_score: f64) -> i64 {
    let insert = AssessmentInsert {
        assessment_date: assessment_date.to_string(),
        risk_label: if risk_score > 0.5 {
            RiskLabel::AtRisk
        } else {
            RiskLabel::NotAtRisk
        },
        risk_score,
        sentiment_score: 0.0,
    };
    db.with_write_transaction(|tx| AssessmentRepository::insert(tx, &insert))
        .expect("insert assessment")
}

fn tracking_rows(db: &DbPool) -> i64 {
    db.with_connection(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM daily_tracking", [], |row| row.get(0))?)
    })
    .expect("count tracking rows")
}

#[test]
fn get_or_create_today_is_idempotent() {
    let (db, service, _temp_dir) = setup_test_env();

    let first = service.get_or_create_today().expect("first access");
    let second = service.get_or_create_today().expect("second access");

    assert_eq!(first, second);
    assert_eq!(first.work_seconds, 0);
    assert_eq!(first.breaks, 0);
    assert_eq!(tracking_rows(&db), 1);
}

#[test]
fn update_sets_totals_for_the_day() {
    let (db, service, _temp_dir) = setup_test_env();
    let day = date("2025-03-14");

    let created = service.get_or_create_on(day).expect("create");
    let updated = service
        .update_on(
            day,
            TrackingUpdate {
                work_seconds: 27_000,
                breaks: 4,
            },
        )
        .expect("update");

    assert_eq!(updated.id, created.id);
    assert_eq!(updated.date, "2025-03-14");
    assert_eq!(updated.work_seconds, 27_000);
    assert_eq!(updated.breaks, 4);

    let reread = service.get_or_create_on(day).expect("reread");
    assert_eq!(reread, updated);
    assert_eq!(tracking_rows(&db), 1);
}

#[test]
fn update_creates_missing_row() {
    let (db, service, _temp_dir) = setup_test_env();

    let record = service
        .update_on(
            date("2025-03-15"),
            TrackingUpdate {
                work_seconds: 3_600,
                breaks: 1,
            },
        )
        .expect("update");

    assert_eq!(record.work_seconds, 3_600);
    assert_eq!(tracking_rows(&db), 1);
}

#[test]
fn negative_totals_are_rejected() {
    let (db, service, _temp_dir) = setup_test_env();

    let error = service
        .update_today(TrackingUpdate {
            work_seconds: -1,
            breaks: 0,
        })
        .expect_err("negative work seconds");

    assert!(matches!(error, AppError::Validation { .. }));
    assert_eq!(tracking_rows(&db), 0);
}

#[test]
fn each_date_gets_its_own_row() {
    let (db, service, _temp_dir) = setup_test_env();

    for day in ["2025-03-10", "2025-03-11", "2025-03-12"] {
        service.get_or_create_on(date(day)).expect("create");
    }

    assert_eq!(tracking_rows(&db), 3);
    let recent = service.recent_tracking(2).expect("recent");
    let dates: Vec<&str> = recent.iter().map(|record| record.date.as_str()).collect();
    assert_eq!(dates, vec!["2025-03-12", "2025-03-11"]);
}

#[test]
fn history_is_newest_first_and_limited() {
    let (db, service, _temp_dir) = setup_test_env();

    insert_assessment(&db, "2025-01-03", 0.31);
    insert_assessment(&db, "2025-01-05", 0.52);
    insert_assessment(&db, "2025-01-01", 0.12);
    insert_assessment(&db, "2025-01-04", 0.44);
    insert_assessment(&db, "2025-01-02", 0.27);

    let history = service.assessment_history(Some(3)).expect("history");
    let dates: Vec<&str> = history
        .iter()
        .map(|point| point.assessment_date.as_str())
        .collect();
    assert_eq!(dates, vec!["2025-01-05", "2025-01-04", "2025-01-03"]);
    assert_eq!(history[0].risk_score, 0.52);
}

#[test]
fn history_defaults_to_configured_limit() {
    let (db, service, _temp_dir) = setup_test_env();

    let start = date("2025-01-01");
    for offset in 0..35 {
        let day = start + chrono::Duration::days(offset);
        insert_assessment(&db, &day.format("%Y-%m-%d").to_string(), 0.4);
    }

    let history = service.assessment_history(None).expect("history");
    assert_eq!(history.len(), 30);
    assert_eq!(history[0].assessment_date, "2025-02-04");
}

#[test]
fn zero_history_limit_is_rejected() {
    let (_db, service, _temp_dir) = setup_test_env();

    let error = service.assessment_history(Some(0)).expect_err("zero limit");
    assert!(matches!(error, AppError::Validation { .. }));
}

#[test]
fn latest_assessment_follows_insertion_order() {
    let (db, service, _temp_dir) = setup_test_env();

    assert!(service.latest_assessment().expect("latest").is_none());

    insert_assessment(&db, "2025-02-10", 0.8);
    let last_id = insert_assessment(&db, "2025-02-01", 0.2);

    let latest = service
        .latest_assessment()
        .expect("latest")
        .expect("row exists");
    assert_eq!(latest.id, last_id);
    assert_eq!(latest.assessment_date, "2025-02-01");
    assert_eq!(latest.risk_label, RiskLabel::NotAtRisk);
}

#[test]
fn oversized_limits_are_rejected() {
    let (db, service, _temp_dir) = setup_test_env();

    insert_assessment(&db, "2025-02-10", 0.8);
    service
        .get_or_create_on(date("2025-02-10"))
        .expect("create");

    let history = service
        .assessment_history(Some(usize::MAX))
        .expect_err("limit exceeds i64");
    assert!(matches!(history, AppError::Validation { .. }));

    let recent = service
        .recent_tracking(usize::MAX)
        .expect_err("limit exceeds i64");
    assert!(matches!(recent, AppError::Validation { .. }));

    let largest = service
        .assessment_history(Some(i64::MAX as usize))
        .expect("largest representable limit");
    assert_eq!(largest.len(), 1);
}
