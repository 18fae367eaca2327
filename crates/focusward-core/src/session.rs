//! Completed focus session records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One finished focus session. Immutable once built.
///
/// Field names serialize in camelCase (`targetDurationSec`, `startedAt`, ...)
/// so stored collections stay readable by other clients of the same data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    pub category: String,
    pub target_duration_sec: u64,
    pub actual_duration_sec: u64,
    #[serde(default)]
    pub distraction_count: u32,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl SessionRecord {
    /// Build a record, deriving the id and the actual duration.
    ///
    /// `ended_at` earlier than `started_at` is pulled up to `started_at`.
    pub fn new(
        category: impl Into<String>,
        target_duration_sec: u64,
        distraction_count: u32,
        started_at: DateTime<Utc>,
        ended_at: DateTime<Utc>,
    ) -> Self {
        let ended_at = ended_at.max(started_at);
        Self {
            id: ended_at.timestamp_millis().to_string(),
            category: category.into(),
            target_duration_sec,
            actual_duration_sec: rounded_secs_between(started_at, ended_at),
            distraction_count,
            started_at,
            ended_at,
        }
    }

    pub fn actual_minutes(&self) -> f64 {
        self.actual_duration_sec as f64 / 60.0
    }
}

/// Whole seconds from `from` to `to`, rounded half up, never negative.
pub(crate) fn rounded_secs_between(from: DateTime<Utc>, to: DateTime<Utc>) -> u64 {
    let ms = (to - from).num_milliseconds();
    if ms <= 0 {
        return 0;
    }
    ((ms as u64) + 500) / 1000
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, h, m, s).unwrap()
    }

    #[test]
    fn actual_duration_is_wall_clock_elapsed() {
        let record = SessionRecord::new("Coding", 1500, 2, at(9, 0, 0), at(9, 26, 40));
        assert_eq!(record.actual_duration_sec, 1600);
        assert_eq!(record.distraction_count, 2);
        assert_eq!(record.id, at(9, 26, 40).timestamp_millis().to_string());
    }

    #[test]
    fn rounding_is_half_up() {
        let start = at(9, 0, 0);
        assert_eq!(rounded_secs_between(start, start + Duration::milliseconds(1499)), 1);
        assert_eq!(rounded_secs_between(start, start + Duration::milliseconds(1500)), 2);
        assert_eq!(rounded_secs_between(start, start + Duration::milliseconds(499)), 0);
    }

    #[test]
    fn end_before_start_clamps_to_zero() {
        let record = SessionRecord::new("Reading", 60, 0, at(10, 0, 0), at(9, 0, 0));
        assert_eq!(record.actual_duration_sec, 0);
        assert_eq!(record.ended_at, record.started_at);
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let record = SessionRecord::new("Project", 300, 1, at(8, 0, 0), at(8, 5, 0));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["targetDurationSec"], 300);
        assert_eq!(json["actualDurationSec"], 300);
        assert_eq!(json["distractionCount"], 1);
        assert!(json["startedAt"].as_str().unwrap().starts_with("2024-05-06T08:00:00"));
    }

    #[test]
    fn missing_distraction_count_reads_as_zero() {
        let json = r#"{
            "id": "1",
            "category": "Coding",
            "targetDurationSec": 60,
            "actualDurationSec": 58,
            "startedAt": "2024-05-06T08:00:00Z",
            "endedAt": "2024-05-06T08:00:58Z"
        }"#;
        let record: SessionRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.distraction_count, 0);
    }
}
