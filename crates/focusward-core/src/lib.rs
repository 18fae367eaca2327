//! # Focusward Core Library
//!
//! This library provides the core logic for the Focusward focus timer. The
//! `focusward` CLI is a thin layer over the same types.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A wall-clock-anchored countdown. Remaining time is
//!   always recomputed from the target end instant, so late or skipped ticks
//!   never accumulate drift.
//! - **Controller**: An async driver that owns the single tick task, listens
//!   for app lifecycle changes and persists completed sessions.
//! - **Lifecycle**: Active/background/inactive notifications. Leaving the
//!   foreground while running pauses the timer and counts a distraction.
//! - **Storage**: A SQLite key-value table holding the session history, plus
//!   TOML configuration.
//! - **Stats**: Pure reductions from session records to reports.
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`FocusTimer`]: Tick-driving controller around the engine
//! - [`SessionStore`]: Persisted, newest-first session history
//! - [`StatsReport`]: Range statistics over recorded sessions
//! - [`Config`]: Application configuration management

pub mod error;
pub mod events;
pub mod lifecycle;
pub mod session;
pub mod stats;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError, StorageError, TimerError};
pub use events::Event;
pub use lifecycle::{AppLifecycle, LifecycleNotifier, LifecycleSubscription};
pub use session::SessionRecord;
pub use stats::{StatsRange, StatsReport};
pub use storage::{Config, Database, KeyValueStore, MemoryStore, SessionStore};
pub use timer::{Clock, FocusTimer, ManualClock, SystemClock, TargetMinutes, TimerEngine, TimerPhase};
