use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyTrackingRecord {
    pub id: i64,
    pub date: String,
    pub work_seconds: i64,
    pub breaks: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingUpdate {
    pub work_seconds: i64,
    pub breaks: i64,
}
