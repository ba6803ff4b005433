use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::models::assessment::{FeatureInput, FeatureVector, FEATURE_NAMES};
use crate::models::behavior::{BehavioralData, ProductivityData, SentimentScore};

/// Builds the model input vector.
///
/// The column order is fixed by [`FEATURE_NAMES`]; the scaler and classifier
/// artifacts are keyed to it and any reordering corrupts predictions.
pub struct FeatureAssembler;

impl FeatureAssembler {
    pub fn assemble(
        behavioral: &BehavioralData,
        productivity: &ProductivityData,
        sentiment: SentimentScore,
    ) -> FeatureVector {
        FeatureVector::from_ordered([
            behavioral.avg_work_hours_per_day,
            behavioral.avg_break_time_minutes,
            behavioral.meeting_hours_per_week,
            sentiment.value(),
            productivity.task_completion_rate,
        ])
    }

    /// Converts wire input into typed records, rejecting the first absent
    /// field (in column order) and any out-of-range value.
    pub fn parse_input(
        input: &FeatureInput,
    ) -> AppResult<(BehavioralData, ProductivityData, SentimentScore)> {
        let avg_work_hours_per_day = require(input.avg_work_hours_per_day, FEATURE_NAMES[0])?;
        let avg_break_time_minutes = require(input.avg_break_time_minutes, FEATURE_NAMES[1])?;
        let meeting_hours_per_week = require(input.meeting_hours_per_week, FEATURE_NAMES[2])?;
        let sentiment_score = require(input.sentiment_score, FEATURE_NAMES[3])?;
        let task_completion_rate = require(input.task_completion_rate, FEATURE_NAMES[4])?;

        let behavioral = BehavioralData {
            avg_work_hours_per_day,
            avg_break_time_minutes,
            meeting_hours_per_week,
        };
        let productivity = ProductivityData {
            task_completion_rate,
        };

        Self::validate(&behavioral, &productivity)?;
        let sentiment = SentimentScore::new(sentiment_score).ok_or_else(|| {
            AppError::validation_with_details(
                "sentiment_score must be within [-1, 1]",
                json!({ "field": FEATURE_NAMES[3], "value": sentiment_score }),
            )
        })?;

        Ok((behavioral, productivity, sentiment))
    }

    pub fn assemble_input(input: &FeatureInput) -> AppResult<FeatureVector> {
        let (behavioral, productivity, sentiment) = Self::parse_input(input)?;
        Ok(Self::assemble(&behavioral, &productivity, sentiment))
    }

    pub fn validate(behavioral: &BehavioralData, productivity: &ProductivityData) -> AppResult<()> {
        ensure_non_negative(FEATURE_NAMES[0], behavioral.avg_work_hours_per_day)?;
        ensure_non_negative(FEATURE_NAMES[1], behavioral.avg_break_time_minutes)?;
        ensure_non_negative(FEATURE_NAMES[2], behavioral.meeting_hours_per_week)?;

        let rate = productivity.task_completion_rate;
        if !rate.is_finite() || !(0.0..=1.0).contains(&rate) {
            return Err(AppError::validation_with_details(
                "task_completion_rate must be within [0, 1]",
                json!({ "field": FEATURE_NAMES[4], "value": rate }),
            ));
        }

        Ok(())
    }
}

fn require(value: Option<f64>, field: &'static str) -> AppResult<f64> {
    value.ok_or_else(|| AppError::missing_field(field))
}

fn ensure_non_negative(field: &'static str, value: f64) -> AppResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(AppError::validation_with_details(
            format!("{field} must be a non-negative number"),
            json!({ "field": field, "value": value }),
        ))
    }
}
