//! Statistics over recorded focus sessions.
//!
//! Everything here is a pure reduction: records and a range in, a
//! [`StatsReport`] out. Day boundaries follow the time zone of the `now`
//! instant the caller supplies.

mod range;
mod report;

pub use range::{ParseRangeError, StatsRange};
pub use report::{
    filter_range, format_hours_minutes, format_minutes, CategoryMinutes, DailyMinutes, StatsReport,
};
