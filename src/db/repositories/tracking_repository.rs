use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use super::sql_limit;
use crate::error::{AppError, AppResult};
use crate::models::tracking::{DailyTrackingRecord, TrackingUpdate};

#[derive(Debug, Clone)]
pub struct DailyTrackingRow {
    pub id: i64,
    pub track_date: String,
    pub total_work_seconds: i64,
    pub total_breaks: i64,
}

impl DailyTrackingRow {
    pub fn into_record(self) -> DailyTrackingRecord {
        DailyTrackingRecord {
            id: self.id,
            date: self.track_date,
            work_seconds: self.total_work_seconds,
            breaks: self.total_breaks,
        }
    }
}

impl TryFrom<&Row<'_>> for DailyTrackingRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            track_date: row.get("track_date")?,
            total_work_seconds: row.get("total_work_seconds")?,
            total_breaks: row.get("total_breaks")?,
        })
    }
}

/// One row per calendar date in `daily_tracking`.
pub struct TrackingRepository;

impl TrackingRepository {
    pub fn find_by_date(conn: &Connection, track_date: &str) -> AppResult<Option<DailyTrackingRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    id,
                    track_date,
                    total_work_seconds,
                    total_breaks
                FROM daily_tracking
                WHERE track_date = :track_date
            "#,
        )?;

        let row = stmt
            .query_row(named_params! {":track_date": track_date}, |row| {
                DailyTrackingRow::try_from(row)
            })
            .optional()?;

        Ok(row.map(DailyTrackingRow::into_record))
    }

    /// Inserts an empty row for `track_date` unless one already exists.
    pub fn ensure_date(conn: &Connection, track_date: &str) -> AppResult<DailyTrackingRecord> {
        conn.execute(
            r#"
                INSERT INTO daily_tracking (track_date)
                VALUES (:track_date)
                ON CONFLICT(track_date) DO NOTHING
            "#,
            named_params! {":track_date": track_date},
        )?;

        Self::find_by_date(conn, track_date)?.ok_or_else(AppError::not_found)
    }

    pub fn update_totals(
        conn: &Connection,
        track_date: &str,
        update: &TrackingUpdate,
    ) -> AppResult<()> {
        let affected = conn.execute(
            r#"
                UPDATE daily_tracking SET
                    total_work_seconds = :work_seconds,
                    total_breaks = :breaks
                WHERE track_date = :track_date
            "#,
            named_params! {
                ":track_date": track_date,
                ":work_seconds": update.work_seconds,
                ":breaks": update.breaks,
            },
        )?;

        if affected == 0 {
            return Err(AppError::not_found());
        }

        Ok(())
    }

    pub fn list_recent(conn: &Connection, limit: usize) -> AppResult<Vec<DailyTrackingRecord>> {
        let limit = sql_limit(limit)?;
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    id,
                    track_date,
                    total_work_seconds,
                    total_breaks
                FROM daily_tracking
                ORDER BY track_date DESC
                LIMIT :limit
            "#,
        )?;

        let records = stmt
            .query_map(named_params! {":limit": limit}, |row| {
                DailyTrackingRow::try_from(row)
            })?
            .map(|row| row.map(DailyTrackingRow::into_record).map_err(AppError::from))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(records)
    }
}
