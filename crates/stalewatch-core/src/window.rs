//! Report window calculation.
//!
//! Orders qualify when they were created more than 24 hours ago but within
//! the last 30 days. Both bounds derive from an injected instant so callers
//! and tests control the clock.

use chrono::{DateTime, Duration, Utc};

pub const LOOKBACK_DAYS: i64 = 30;
pub const MIN_AGE_HOURS: i64 = 24;

/// Half-open creation-time window `[lower, upper)` for the order query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportWindow {
    pub lower: DateTime<Utc>,
    pub upper: DateTime<Utc>,
}

impl ReportWindow {
    pub fn from_now(now: DateTime<Utc>) -> Self {
        Self {
            lower: now - Duration::days(LOOKBACK_DAYS),
            upper: now - Duration::hours(MIN_AGE_HOURS),
        }
    }

    /// Inclusive lower bound rendered for the Shopify search syntax.
    pub fn lower_bound(&self) -> String {
        format_api_timestamp(self.lower)
    }

    /// Exclusive upper bound rendered for the Shopify search syntax.
    pub fn upper_bound(&self) -> String {
        format_api_timestamp(self.upper)
    }
}

fn format_api_timestamp(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn window_bounds_for_fixed_now() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap();
        let window = ReportWindow::from_now(now);
        assert_eq!(window.lower_bound(), "2024-02-14T12:00:00Z");
        assert_eq!(window.upper_bound(), "2024-03-14T12:00:00Z");
    }

    #[test]
    fn window_bounds_are_zero_padded() {
        let now = Utc.with_ymd_and_hms(2024, 10, 5, 3, 7, 9).unwrap();
        let window = ReportWindow::from_now(now);
        assert_eq!(window.lower_bound(), "2024-09-05T03:07:09Z");
        assert_eq!(window.upper_bound(), "2024-10-04T03:07:09Z");
    }
}
