use serde::{Deserialize, Serialize};

/// Minutes used when the input carries no digits at all.
pub const DEFAULT_MINUTES: u64 = 25;
pub const MIN_MINUTES: u64 = 1;
pub const MAX_MINUTES: u64 = 180;

/// The user's requested session length, kept as typed (digits only).
///
/// Three views exist on purpose:
/// - [`minutes`](Self::minutes): sanitized target, always within
///   `MIN_MINUTES..=MAX_MINUTES`.
/// - [`display_secs`](Self::display_secs): what an idle countdown shows
///   right after editing; `0` for input without digits.
/// - [`is_valid`](Self::is_valid): whether a session may start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMinutes {
    input: String,
}

impl TargetMinutes {
    /// Strip everything but ASCII digits.
    pub fn parse(raw: &str) -> Self {
        Self {
            input: raw.chars().filter(|c| c.is_ascii_digit()).collect(),
        }
    }

    pub fn from_minutes(minutes: u64) -> Self {
        Self {
            input: minutes.to_string(),
        }
    }

    /// The sanitized digit string.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Parsed value, `None` when there are no digits.
    ///
    /// Digit strings too long for `u64` saturate.
    pub fn raw(&self) -> Option<u64> {
        if self.input.is_empty() {
            return None;
        }
        Some(self.input.parse::<u64>().unwrap_or(u64::MAX))
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.raw(), Some(n) if n > 0)
    }

    pub fn minutes(&self) -> u64 {
        match self.raw() {
            Some(n) => n.clamp(MIN_MINUTES, MAX_MINUTES),
            None => DEFAULT_MINUTES,
        }
    }

    pub fn secs(&self) -> u64 {
        self.minutes() * 60
    }

    pub fn display_secs(&self) -> u64 {
        match self.raw() {
            Some(n) => n.clamp(MIN_MINUTES, MAX_MINUTES) * 60,
            None => 0,
        }
    }
}

impl Default for TargetMinutes {
    fn default() -> Self {
        Self::from_minutes(DEFAULT_MINUTES)
    }
}
