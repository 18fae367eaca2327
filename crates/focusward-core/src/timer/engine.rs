//! Focus timer engine.
//!
//! The engine is a wall-clock-anchored state machine. It does not use
//! internal threads: the caller (see [`FocusTimer`](super::FocusTimer))
//! calls `tick()` on a short fixed interval. Remaining time is always
//! recomputed from `target_end - now`, so late, missed or suspended ticks
//! never cause drift.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> Paused -> Running -> Completed -> Idle
//!           \__________\____ reset ____________/
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut engine = TimerEngine::new(SystemClock);
//! engine.configure_target("25");
//! engine.start()?;
//! // In a loop:
//! if let Some(Event::SessionCompleted { record }) = engine.tick() {
//!     store.append_and_persist(record);
//! }
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::clock::{Clock, SystemClock};
use super::target::TargetMinutes;
use crate::error::TimerError;
use crate::events::Event;
use crate::lifecycle::{is_distraction_edge, AppLifecycle};
use crate::session::{rounded_secs_between, SessionRecord};

pub const DEFAULT_CATEGORY: &str = "Studying";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero; the summary waits to be acknowledged.
    Completed,
}

/// Core timer engine.
#[derive(Debug)]
pub struct TimerEngine<C: Clock = SystemClock> {
    clock: C,
    target: TargetMinutes,
    phase: TimerPhase,
    remaining_secs: u64,
    target_end: Option<DateTime<Utc>>,
    session_start: Option<DateTime<Utc>>,
    distraction_count: u32,
    category: String,
    lifecycle: AppLifecycle,
    last_summary: Option<SessionRecord>,
}

impl TimerEngine<SystemClock> {
    pub fn system() -> Self {
        Self::new(SystemClock)
    }
}

impl<C: Clock> TimerEngine<C> {
    /// Create an idle engine with the default 25 minute target.
    pub fn new(clock: C) -> Self {
        Self::with_target(clock, TargetMinutes::default(), DEFAULT_CATEGORY)
    }

    pub fn with_target(clock: C, target: TargetMinutes, category: impl Into<String>) -> Self {
        Self {
            clock,
            remaining_secs: target.display_secs(),
            target,
            phase: TimerPhase::Idle,
            target_end: None,
            session_start: None,
            distraction_count: 0,
            category: category.into(),
            lifecycle: AppLifecycle::Active,
            last_summary: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    /// Remaining seconds as of the last tick, pause or configuration.
    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// Sanitized target in minutes.
    pub fn target_minutes(&self) -> u64 {
        self.target.minutes()
    }

    pub fn target(&self) -> &TargetMinutes {
        &self.target
    }

    pub fn distraction_count(&self) -> u32 {
        self.distraction_count
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn lifecycle(&self) -> AppLifecycle {
        self.lifecycle
    }

    pub fn session_started_at(&self) -> Option<DateTime<Utc>> {
        self.session_start
    }

    pub fn target_end_at(&self) -> Option<DateTime<Utc>> {
        self.target_end
    }

    /// Record of the most recent completion, until acknowledged.
    pub fn last_summary(&self) -> Option<&SessionRecord> {
        self.last_summary.as_ref()
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            phase: self.phase,
            remaining_secs: self.remaining_secs,
            clock: format_clock(self.remaining_secs),
            target_minutes: self.target.minutes(),
            category: self.category.clone(),
            distraction_count: self.distraction_count,
            session_started_at: self.session_start,
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Replace the target from raw user input.
    ///
    /// Outside Running the displayed countdown follows the new target
    /// immediately; a running countdown keeps its end instant.
    pub fn configure_target(&mut self, minutes_input: &str) -> Event {
        self.target = TargetMinutes::parse(minutes_input);
        if self.phase != TimerPhase::Running {
            self.remaining_secs = self.target.display_secs();
        }
        Event::TargetConfigured {
            input: self.target.input().to_string(),
            minutes: self.target.minutes(),
            remaining_secs: self.remaining_secs,
            at: self.clock.now(),
        }
    }

    /// Change the session label. The record takes whatever label is set
    /// when the session completes.
    pub fn set_category(&mut self, category: impl Into<String>) -> Event {
        self.category = category.into();
        Event::CategoryChanged {
            category: self.category.clone(),
            at: self.clock.now(),
        }
    }

    /// Start a new session or resume a paused one.
    ///
    /// Returns `Ok(None)` when already running. Starting from `Completed`
    /// acknowledges the pending summary first.
    pub fn start(&mut self) -> Result<Option<Event>, TimerError> {
        if !self.target.is_valid() {
            return Err(TimerError::InvalidDuration {
                input: self.target.input().to_string(),
            });
        }

        match self.phase {
            TimerPhase::Running => Ok(None),
            TimerPhase::Idle | TimerPhase::Paused | TimerPhase::Completed => {
                if self.phase == TimerPhase::Completed {
                    self.acknowledge();
                }
                let now = self.clock.now();
                let base_secs = if self.remaining_secs == 0 {
                    self.target.secs()
                } else {
                    self.remaining_secs
                };
                self.remaining_secs = base_secs;

                let target_end = now + Duration::seconds(base_secs as i64);
                self.target_end = Some(target_end);

                let resumed = self.session_start.is_some();
                let session_started_at = *self.session_start.get_or_insert(now);
                self.phase = TimerPhase::Running;

                tracing::debug!(remaining_secs = base_secs, resumed, "timer running");
                Ok(Some(Event::TimerStarted {
                    remaining_secs: base_secs,
                    target_end_at: target_end,
                    session_started_at,
                    resumed,
                    at: now,
                }))
            }
        }
    }

    /// Pause a running countdown. No-op in any other phase.
    ///
    /// A pause caused by the app leaving the foreground counts one
    /// distraction.
    pub fn pause(&mut self, caused_by_background: bool) -> Option<Event> {
        if self.phase != TimerPhase::Running {
            return None;
        }

        let now = self.clock.now();
        if let Some(end) = self.target_end.take() {
            self.remaining_secs = rounded_secs_between(now, end);
        }
        self.phase = TimerPhase::Paused;
        if caused_by_background {
            self.distraction_count += 1;
        }

        tracing::debug!(
            remaining_secs = self.remaining_secs,
            caused_by_background,
            "timer paused"
        );
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            caused_by_background,
            distraction_count: self.distraction_count,
            at: now,
        })
    }

    /// Abandon the current session without producing a record.
    pub fn reset(&mut self) -> Event {
        self.phase = TimerPhase::Idle;
        self.remaining_secs = self.target.secs();
        self.distraction_count = 0;
        self.target_end = None;
        self.session_start = None;
        self.last_summary = None;
        Event::TimerReset {
            remaining_secs: self.remaining_secs,
            at: self.clock.now(),
        }
    }

    /// Call periodically while running.
    ///
    /// Returns `Some(Event::SessionCompleted)` exactly once, when the
    /// countdown reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        let end = self.target_end?;
        self.remaining_secs = rounded_secs_between(self.clock.now(), end);
        if self.remaining_secs == 0 {
            let record = self.complete_session();
            return Some(Event::SessionCompleted { record });
        }
        None
    }

    /// Dismiss the completion summary and return to `Idle`.
    pub fn acknowledge(&mut self) -> Option<SessionRecord> {
        if self.phase != TimerPhase::Completed {
            return None;
        }
        self.phase = TimerPhase::Idle;
        self.last_summary.take()
    }

    /// Feed an application lifecycle transition.
    ///
    /// Leaving the foreground while running pauses the countdown and counts
    /// a distraction. Coming back never resumes on its own.
    pub fn observe_lifecycle(&mut self, next: AppLifecycle) -> Option<Event> {
        let previous = std::mem::replace(&mut self.lifecycle, next);
        if is_distraction_edge(previous, next) && self.phase == TimerPhase::Running {
            return self.pause(true);
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_session(&mut self) -> SessionRecord {
        self.phase = TimerPhase::Completed;

        let ended_at = self.clock.now();
        let started_at = match self.session_start {
            Some(start) => start,
            None => {
                tracing::warn!("session completed without a start instant; recording zero duration");
                ended_at
            }
        };

        let record = SessionRecord::new(
            self.category.clone(),
            self.target.secs(),
            self.distraction_count,
            started_at,
            ended_at,
        );

        self.distraction_count = 0;
        self.session_start = None;
        self.target_end = None;
        self.remaining_secs = self.target.secs();
        self.last_summary = Some(record.clone());

        tracing::info!(
            id = %record.id,
            category = %record.category,
            actual_secs = record.actual_duration_sec,
            distractions = record.distraction_count,
            "focus session completed"
        );
        record
    }
}

/// `MM:SS`; minutes keep counting past 59.
pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
