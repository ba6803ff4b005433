use chrono::{Local, NaiveDate};
use tracing::info;

use crate::db::repositories::assessment_repository::AssessmentRepository;
use crate::db::repositories::tracking_repository::TrackingRepository;
use crate::db::DbPool;
use crate::error::{AppError, AppResult};
use crate::models::assessment::{AssessmentHistoryPoint, AssessmentRecord};
use crate::models::tracking::{DailyTrackingRecord, TrackingUpdate};
use crate::services::assessment_service::DATE_FORMAT;

/// Daily work/break totals and read access to assessment history.
pub struct TrackingService {
    db: DbPool,
    history_limit: usize,
}

impl TrackingService {
    pub fn new(db: DbPool, history_limit: usize) -> Self {
        Self { db, history_limit }
    }

    pub fn get_or_create_today(&self) -> AppResult<DailyTrackingRecord> {
        self.get_or_create_on(Local::now().date_naive())
    }

    pub fn get_or_create_on(&self, date: NaiveDate) -> AppResult<DailyTrackingRecord> {
        let track_date = date.format(DATE_FORMAT).to_string();

        if let Some(existing) = self
            .db
            .with_connection(|conn| TrackingRepository::find_by_date(conn, &track_date))?
        {
            return Ok(existing);
        }

        let record = self
            .db
            .with_write_transaction(|tx| TrackingRepository::ensure_date(tx, &track_date))?;
        info!(target: "app::tracking", %track_date, "daily tracking row created");
        Ok(record)
    }

    pub fn update_today(&self, update: TrackingUpdate) -> AppResult<DailyTrackingRecord> {
        self.update_on(Local::now().date_naive(), update)
    }

    pub fn update_on(&self, date: NaiveDate, update: TrackingUpdate) -> AppResult<DailyTrackingRecord> {
        if update.work_seconds < 0 || update.breaks < 0 {
            return Err(AppError::validation(
                "work_seconds and breaks must be non-negative",
            ));
        }

        let track_date = date.format(DATE_FORMAT).to_string();
        self.db.with_write_transaction(|tx| {
            TrackingRepository::ensure_date(tx, &track_date)?;
            TrackingRepository::update_totals(tx, &track_date, &update)?;
            TrackingRepository::find_by_date(tx, &track_date)?.ok_or_else(AppError::not_found)
        })
    }

    pub fn recent_tracking(&self, limit: usize) -> AppResult<Vec<DailyTrackingRecord>> {
        self.db
            .with_connection(|conn| TrackingRepository::list_recent(conn, limit))
    }

    /// Most recent `(assessment_date, risk_score)` pairs, newest first.
    pub fn assessment_history(&self, limit: Option<usize>) -> AppResult<Vec<AssessmentHistoryPoint>> {
        let limit = limit.unwrap_or(self.history_limit);
        if limit == 0 {
            return Err(AppError::validation("history limit must be positive"));
        }
        self.db
            .with_connection(|conn| AssessmentRepository::list_history(conn, limit))
    }

    pub fn latest_assessment(&self) -> AppResult<Option<AssessmentRecord>> {
        self.db.with_connection(AssessmentRepository::find_latest)
    }
}
