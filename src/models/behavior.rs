use serde::{Deserialize, Serialize};

/// Work-pattern snapshot taken for a single assessment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehavioralData {
    pub avg_work_hours_per_day: f64,
    pub avg_break_time_minutes: f64,
    pub meeting_hours_per_week: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProductivityData {
    pub task_completion_rate: f64,
}

/// Polarity-signed confidence in [-1, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentScore(f64);

impl SentimentScore {
    pub const NEUTRAL: SentimentScore = SentimentScore(0.0);

    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (-1.0..=1.0).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<SentimentScore> for f64 {
    fn from(score: SentimentScore) -> Self {
        score.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehaviorSnapshot {
    pub employee_id: String,
    pub behavioral: BehavioralData,
    pub productivity: ProductivityData,
}
