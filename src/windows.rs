//! Date window planning
//!
//! The Awin transaction and report endpoints only accept date ranges of up
//! to one day, so every incremental stream is synced as a sequence of
//! day-sized windows. The first window starts at the bookmark (or the
//! configured start date) minus the lookback, truncated to midnight UTC; the
//! last window is clamped to the current time.

use chrono::{DateTime, Duration, Utc};

/// Datetime format for transaction endpoints
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Date format for report endpoints
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single [start, end) date window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateWindow {
    /// Window start formatted for transaction endpoints
    pub fn start_datetime(&self) -> String {
        self.start.format(DATETIME_FORMAT).to_string()
    }

    /// Window end formatted for transaction endpoints
    pub fn end_datetime(&self) -> String {
        self.end.format(DATETIME_FORMAT).to_string()
    }

    /// Window start formatted for report endpoints
    pub fn start_date(&self) -> String {
        self.start.format(DATE_FORMAT).to_string()
    }

    /// Window end formatted for report endpoints
    pub fn end_date(&self) -> String {
        self.end.format(DATE_FORMAT).to_string()
    }
}

/// Plans the day windows for one sync run
#[derive(Debug, Clone)]
pub struct WindowPlanner {
    /// Earliest date worth syncing
    start_date: DateTime<Utc>,
    /// Days to re-sync before the bookmark
    lookback_days: i64,
}

impl WindowPlanner {
    /// Create a planner for the given start date and lookback
    pub fn new(start_date: DateTime<Utc>, lookback_days: i64) -> Self {
        Self {
            start_date,
            lookback_days,
        }
    }

    /// Where the first window starts for a given bookmark.
    ///
    /// The bookmark wins over the configured start date when it is later.
    /// The lookback is applied after that, and the result is truncated to
    /// midnight so windows always line up on day boundaries.
    pub fn first_window_start(&self, bookmark: Option<DateTime<Utc>>) -> DateTime<Utc> {
        let base = match bookmark {
            Some(b) if b > self.start_date => b,
            _ => self.start_date,
        };
        let with_lookback = base - Duration::days(self.lookback_days);
        with_lookback
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .expect("midnight is always valid")
            .and_utc()
    }

    /// All day windows from the bookmark up to `now`
    pub fn windows(&self, bookmark: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Vec<DateWindow> {
        self.windows_resuming(bookmark, None, now)
    }

    /// Day windows, resuming from an interrupted pass's checkpoint when it
    /// is further along than the bookmark-derived start
    pub fn windows_resuming(
        &self,
        bookmark: Option<DateTime<Utc>>,
        checkpoint: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Vec<DateWindow> {
        let mut start = self.first_window_start(bookmark);
        if let Some(checkpoint) = checkpoint {
            start = std::cmp::max(start, checkpoint);
        }

        let mut windows = Vec::new();
        while start < now {
            let end = std::cmp::min(start + Duration::days(1), now);
            windows.push(DateWindow { start, end });
            start = end;
        }

        windows
    }
}
