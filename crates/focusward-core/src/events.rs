use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lifecycle::AppLifecycle;
use crate::session::SessionRecord;
use crate::timer::TimerPhase;

/// Every state change of a timer produces an Event.
/// Drivers broadcast them; the CLI prints them as JSON lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    TargetConfigured {
        input: String,
        minutes: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    CategoryChanged {
        category: String,
        at: DateTime<Utc>,
    },
    TimerStarted {
        remaining_secs: u64,
        target_end_at: DateTime<Utc>,
        session_started_at: DateTime<Utc>,
        /// False for the first entry into Running of a session.
        resumed: bool,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        caused_by_background: bool,
        distraction_count: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        record: SessionRecord,
    },
    SummaryAcknowledged {
        at: DateTime<Utc>,
    },
    LifecycleChanged {
        from: AppLifecycle,
        to: AppLifecycle,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        phase: TimerPhase,
        remaining_secs: u64,
        clock: String,
        target_minutes: u64,
        category: String,
        distraction_count: u32,
        session_started_at: Option<DateTime<Utc>>,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// The record carried by a completion event.
    pub fn completed_record(&self) -> Option<&SessionRecord> {
        match self {
            Event::SessionCompleted { record } => Some(record),
            _ => None,
        }
    }
}
