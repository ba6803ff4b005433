pub mod assessment_repository;
pub mod tracking_repository;

use crate::error::{AppError, AppResult};

/// SQLite treats a negative LIMIT as unbounded, so values past `i64::MAX` are rejected.
pub(crate) fn sql_limit(limit: usize) -> AppResult<i64> {
    i64::try_from(limit).map_err(|_| AppError::validation(format!("limit {limit} is too large")))
}
