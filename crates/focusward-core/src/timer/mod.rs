mod clock;
mod controller;
mod engine;
mod target;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{FocusTimer, DEFAULT_TICK_INTERVAL};
pub use engine::{format_clock, TimerEngine, TimerPhase, DEFAULT_CATEGORY};
pub use target::{TargetMinutes, DEFAULT_MINUTES, MAX_MINUTES, MIN_MINUTES};
