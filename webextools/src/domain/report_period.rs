use chrono::{DateTime, Utc};
use webex_api::time_ranges::{MAX_PERIOD_DAYS, MAX_SPAN_DAYS, TimeWindow, split_period};

/// The look-back period of a recording report and the span of each API query, in days.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportPeriod {
    period_days: u32,
    span_days: u32,
}

impl ReportPeriod {
    /// Validates the requested range. A span longer than the period is shortened to it.
    pub fn parse(period_days: u32, span_days: u32) -> Result<Self, String> {
        if !(1..=MAX_PERIOD_DAYS).contains(&period_days) {
            Err(format!(
                "Period must be between 1 and {} days, got {}.",
                MAX_PERIOD_DAYS, period_days
            ))
        } else if !(1..=MAX_SPAN_DAYS).contains(&span_days) {
            Err(format!(
                "Span must be between 1 and {} days, got {}.",
                MAX_SPAN_DAYS, span_days
            ))
        } else {
            Ok(Self {
                period_days,
                span_days: span_days.min(period_days),
            })
        }
    }

    pub fn period_days(&self) -> u32 {
        self.period_days
    }

    pub fn span_days(&self) -> u32 {
        self.span_days
    }

    /// The query windows covering the period that ends at `now`, oldest first.
    pub fn windows(&self, now: DateTime<Utc>) -> Vec<TimeWindow> {
        split_period(now, self.period_days, self.span_days)
    }
}

impl Default for ReportPeriod {
    fn default() -> Self {
        Self {
            period_days: 90,
            span_days: 7,
        }
    }
}
