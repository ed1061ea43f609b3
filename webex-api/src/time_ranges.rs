use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use std::fmt;

/// Longest look-back the recording report accepts, in days.
pub const MAX_PERIOD_DAYS: u32 = 365;
/// Longest range the recording report endpoint accepts in a single query, in days.
pub const MAX_SPAN_DAYS: u32 = 90;

/// A half-open range of instants `[start, end)` queried in one API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }

    /// The `from` query parameter, as ISO 8601 in UTC.
    pub fn from_param(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// The `to` query parameter, as ISO 8601 in UTC.
    pub fn to_param(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} .. {}", self.from_param(), self.to_param())
    }
}

/// Partitions the `period_days` ending at `end` into consecutive windows of `span_days`,
/// oldest first. Every window is exactly `span_days` long except possibly the last one,
/// and each window starts where the previous one ends.
///
/// A span longer than the period is shortened to the period. Zero-length inputs
/// produce no windows.
pub fn split_period(end: DateTime<Utc>, period_days: u32, span_days: u32) -> Vec<TimeWindow> {
    if period_days == 0 || span_days == 0 {
        return vec![];
    }
    let span_days = span_days.min(period_days);
    let start = end - TimeDelta::days(period_days.into());

    (0..period_days)
        .step_by(span_days as usize)
        .map(|offset| {
            let window_start = start + TimeDelta::days(offset.into());
            let window_end = (window_start + TimeDelta::days(span_days.into())).min(end);
            TimeWindow {
                start: window_start,
                end: window_end,
            }
        })
        .collect()
}
