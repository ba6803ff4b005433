use std::convert::TryFrom;

use rusqlite::{named_params, Connection, OptionalExtension, Row};

use super::sql_limit;
use crate::error::{AppError, AppResult};
use crate::models::assessment::{
    AssessmentHistoryPoint, AssessmentInsert, AssessmentRecord, RiskLabel,
};

#[derive(Debug, Clone)]
pub struct AssessmentRow {
    pub id: i64,
    pub assessment_date: String,
    pub risk_label: i64,
    pub risk_score: f64,
    pub sentiment_score: f64,
}

impl AssessmentRow {
    pub fn into_record(self) -> AppResult<AssessmentRecord> {
        let risk_label = RiskLabel::try_from(self.risk_label).map_err(AppError::validation)?;

        Ok(AssessmentRecord {
            id: self.id,
            assessment_date: self.assessment_date,
            risk_label,
            risk_score: self.risk_score,
            sentiment_score: self.sentiment_score,
        })
    }
}

impl TryFrom<&Row<'_>> for AssessmentRow {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'_>) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.get("id")?,
            assessment_date: row.get("assessment_date")?,
            risk_label: row.get("risk_label")?,
            risk_score: row.get("risk_score")?,
            sentiment_score: row.get("sentiment_score")?,
        })
    }
}

/// Append-only access to the `assessments` table.
pub struct AssessmentRepository;

impl AssessmentRepository {
    pub fn insert(conn: &Connection, insert: &AssessmentInsert) -> AppResult<i64> {
        conn.execute(
            r#"
                INSERT INTO assessments (
                    assessment_date,
                    risk_label,
                    risk_score,
                    sentiment_score
                ) VALUES (
                    :assessment_date,
                    :risk_label,
                    :risk_score,
                    :sentiment_score
                )
            "#,
            named_params! {
                ":assessment_date": &insert.assessment_date,
                ":risk_label": insert.risk_label.as_i64(),
                ":risk_score": insert.risk_score,
                ":sentiment_score": insert.sentiment_score,
            },
        )?;

        Ok(conn.last_insert_rowid())
    }

    pub fn find_latest(conn: &Connection) -> AppResult<Option<AssessmentRecord>> {
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    id,
                    assessment_date,
                    risk_label,
                    risk_score,
                    sentiment_score
                FROM assessments
                ORDER BY id DESC
                LIMIT 1
            "#,
        )?;

        let row = stmt
            .query_row([], |row| AssessmentRow::try_from(row))
            .optional()?;

        row.map(AssessmentRow::into_record).transpose()
    }

    pub fn list_history(conn: &Connection, limit: usize) -> AppResult<Vec<AssessmentHistoryPoint>> {
        let limit = sql_limit(limit)?;
        let mut stmt = conn.prepare(
            r#"
                SELECT
                    assessment_date,
                    risk_score
                FROM assessments
                ORDER BY assessment_date DESC, id DESC
                LIMIT :limit
            "#,
        )?;

        let points = stmt
            .query_map(named_params! {":limit": limit}, |row| {
                Ok(AssessmentHistoryPoint {
                    assessment_date: row.get("assessment_date")?,
                    risk_score: row.get("risk_score")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(points)
    }

    pub fn count(conn: &Connection) -> AppResult<i64> {
        let total = conn.query_row("SELECT COUNT(*) FROM assessments", [], |row| row.get(0))?;
        Ok(total)
    }
}
