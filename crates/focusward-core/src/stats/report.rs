//! Aggregate report over a range of sessions.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::range::StatsRange;
use crate::session::SessionRecord;

/// Focus minutes on one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMinutes {
    pub date: NaiveDate,
    pub minutes: f64,
}

/// Focus minutes spent on one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryMinutes {
    pub category: String,
    pub minutes: f64,
}

/// Totals, averages and breakdowns for a [`StatsRange`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub range: StatsRange,
    /// Sessions inside the range
    pub session_count: u64,
    /// Sum of actual durations inside the range
    pub total_secs: u64,
    /// 0 when the range is empty
    pub average_session_secs: f64,
    pub total_distractions: u64,
    /// 0 when the range is empty
    pub average_distractions: f64,
    /// Today's total regardless of range
    pub today_total_secs: u64,
    /// Every session ever recorded
    pub all_time_total_secs: u64,
    pub all_time_session_count: u64,
    /// Oldest day first, ending today. Counts all sessions, not only the
    /// filtered ones.
    pub daily_minutes: Vec<DailyMinutes>,
    /// First-seen order within the range
    pub category_minutes: Vec<CategoryMinutes>,
}

impl StatsReport {
    /// Build a report as of `now`; day boundaries use `now`'s time zone.
    pub fn compute<Tz: TimeZone>(
        sessions: &[SessionRecord],
        range: StatsRange,
        now: &DateTime<Tz>,
    ) -> Self {
        let tz = now.timezone();
        let today = now.date_naive();

        let filtered = filter_range(sessions, range, now);

        let session_count = filtered.len() as u64;
        let total_secs: u64 = filtered.iter().map(|s| s.actual_duration_sec).sum();
        let total_distractions: u64 = filtered.iter().map(|s| u64::from(s.distraction_count)).sum();
        let (average_session_secs, average_distractions) = if session_count == 0 {
            (0.0, 0.0)
        } else {
            (
                total_secs as f64 / session_count as f64,
                total_distractions as f64 / session_count as f64,
            )
        };

        let mut secs_per_day: HashMap<NaiveDate, u64> = HashMap::new();
        for s in sessions {
            *secs_per_day.entry(local_date(&s.started_at, &tz)).or_default() +=
                s.actual_duration_sec;
        }

        let today_total_secs = secs_per_day.get(&today).copied().unwrap_or(0);
        let all_time_total_secs = sessions.iter().map(|s| s.actual_duration_sec).sum();

        let chart_days = range.chart_days() as i64;
        let daily_minutes = (0..chart_days)
            .map(|index| {
                let date = today - Duration::days(chart_days - 1 - index);
                let secs = secs_per_day.get(&date).copied().unwrap_or(0);
                DailyMinutes {
                    date,
                    minutes: secs as f64 / 60.0,
                }
            })
            .collect();

        let mut per_category: IndexMap<&str, u64> = IndexMap::new();
        for s in &filtered {
            *per_category.entry(s.category.as_str()).or_default() += s.actual_duration_sec;
        }
        let category_minutes = per_category
            .into_iter()
            .map(|(category, secs)| CategoryMinutes {
                category: category.to_string(),
                minutes: secs as f64 / 60.0,
            })
            .collect();

        Self {
            range,
            session_count,
            total_secs,
            average_session_secs,
            total_distractions,
            average_distractions,
            today_total_secs,
            all_time_total_secs,
            all_time_session_count: sessions.len() as u64,
            daily_minutes,
            category_minutes,
        }
    }

    /// Build a report as of the local wall clock.
    pub fn compute_local(sessions: &[SessionRecord], range: StatsRange) -> Self {
        Self::compute(sessions, range, &Local::now())
    }

    /// True when any session was ever recorded, whatever the range.
    pub fn has_sessions(&self) -> bool {
        self.all_time_session_count > 0
    }

    pub fn has_filtered_sessions(&self) -> bool {
        self.session_count > 0
    }

    /// True when any day of the chart series has focus time.
    pub fn has_chart_data(&self) -> bool {
        self.daily_minutes.iter().any(|d| d.minutes > 0.0)
    }
}

/// Sessions whose local start date falls inside `range`.
pub fn filter_range<'a, Tz: TimeZone>(
    sessions: &'a [SessionRecord],
    range: StatsRange,
    now: &DateTime<Tz>,
) -> Vec<&'a SessionRecord> {
    let Some(days) = range.window_days() else {
        return sessions.iter().collect();
    };
    let tz = now.timezone();
    let today = now.date_naive();
    let from = today - Duration::days(days - 1);
    sessions
        .iter()
        .filter(|s| {
            let day = local_date(&s.started_at, &tz);
            day >= from && day <= today
        })
        .collect()
}

fn local_date<Tz: TimeZone>(instant: &DateTime<Utc>, tz: &Tz) -> NaiveDate {
    instant.with_timezone(tz).date_naive()
}

/// `"42 min"`, rounded to the nearest minute.
pub fn format_minutes(secs: f64) -> String {
    format!("{} min", (secs / 60.0).round() as u64)
}

/// `"42 min"` under an hour, `"1 h 5 min"` above.
pub fn format_hours_minutes(secs: f64) -> String {
    let total_min = (secs / 60.0).round() as u64;
    let hours = total_min / 60;
    let minutes = total_min % 60;
    if hours == 0 {
        format!("{total_min} min")
    } else {
        format!("{hours} h {minutes} min")
    }
}
