use std::convert::TryFrom;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::recommendation::RiskLevel;

/// Column order the scaler and classifier were fit on.
pub const FEATURE_NAMES: [&str; FEATURE_COUNT] = [
    "avg_work_hours_per_day",
    "avg_break_time_minutes",
    "meeting_hours_per_week",
    "sentiment_score",
    "task_completion_rate",
];

pub const FEATURE_COUNT: usize = 5;

/// Loosely-typed feature input as it arrives over the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureInput {
    #[serde(default)]
    pub avg_work_hours_per_day: Option<f64>,
    #[serde(default)]
    pub avg_break_time_minutes: Option<f64>,
    #[serde(default)]
    pub meeting_hours_per_week: Option<f64>,
    #[serde(default)]
    pub task_completion_rate: Option<f64>,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    pub(crate) fn from_ordered(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    pub fn as_array(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|candidate| *candidate == name)
            .map(|index| self.0[index])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum RiskLabel {
    NotAtRisk,
    AtRisk,
}

impl RiskLabel {
    pub fn as_i64(self) -> i64 {
        u8::from(self) as i64
    }
}

impl From<RiskLabel> for u8 {
    fn from(label: RiskLabel) -> Self {
        match label {
            RiskLabel::NotAtRisk => 0,
            RiskLabel::AtRisk => 1,
        }
    }
}

impl TryFrom<u8> for RiskLabel {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(RiskLabel::NotAtRisk),
            1 => Ok(RiskLabel::AtRisk),
            other => Err(format!("unsupported risk label: {other}")),
        }
    }
}

impl TryFrom<i64> for RiskLabel {
    type Error = String;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| format!("unsupported risk label: {value}"))
            .and_then(RiskLabel::try_from)
    }
}

impl fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub label: RiskLabel,
    /// P(label = 1), rounded to 4 decimals.
    pub score: f64,
}

/// Output of the full assessment pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentReport {
    pub risk_label: RiskLabel,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub message: String,
    pub suggestion: String,
    pub sentiment_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: i64,
    pub assessment_date: String,
    pub risk_label: RiskLabel,
    pub risk_score: f64,
    pub sentiment_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentInsert {
    pub assessment_date: String,
    pub risk_label: RiskLabel,
    pub risk_score: f64,
    pub sentiment_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentHistoryPoint {
    pub assessment_date: String,
    pub risk_score: f64,
}
