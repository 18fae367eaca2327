use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Time window a report covers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatsRange {
    Today,
    #[default]
    #[serde(rename = "last-7-days")]
    Last7Days,
    #[serde(rename = "last-30-days")]
    Last30Days,
    All,
}

impl StatsRange {
    pub const ALL: [StatsRange; 4] = [
        StatsRange::Today,
        StatsRange::Last7Days,
        StatsRange::Last30Days,
        StatsRange::All,
    ];

    pub fn token(self) -> &'static str {
        match self {
            StatsRange::Today => "today",
            StatsRange::Last7Days => "last-7-days",
            StatsRange::Last30Days => "last-30-days",
            StatsRange::All => "all",
        }
    }

    /// Number of calendar days the filter keeps, ending today.
    /// `None` means unbounded.
    pub fn window_days(self) -> Option<i64> {
        match self {
            StatsRange::Today => Some(1),
            StatsRange::Last7Days => Some(7),
            StatsRange::Last30Days => Some(30),
            StatsRange::All => None,
        }
    }

    /// Length of the per-day series. An unbounded range charts a week.
    pub fn chart_days(self) -> usize {
        match self {
            StatsRange::Today => 1,
            StatsRange::Last30Days => 30,
            StatsRange::Last7Days | StatsRange::All => 7,
        }
    }
}

impl fmt::Display for StatsRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown range '{0}' (expected today, last-7-days, last-30-days or all)")]
pub struct ParseRangeError(pub String);

impl FromStr for StatsRange {
    type Err = ParseRangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(StatsRange::Today),
            "last-7-days" | "7d" => Ok(StatsRange::Last7Days),
            "last-30-days" | "30d" => Ok(StatsRange::Last30Days),
            "all" => Ok(StatsRange::All),
            _ => Err(ParseRangeError(s.to_string())),
        }
    }
}
