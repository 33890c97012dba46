//! Window types
//!
//! Windows are opaque to timers; a timer only needs the window's encoded
//! bytes and its last contained timestamp.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{WindowError, WindowResult};
use crate::time::Timestamp;

/// A window with a known last timestamp
pub trait BoundedWindow {
    /// The largest timestamp that belongs to this window
    fn max_timestamp(&self) -> Timestamp;
}

/// The single window spanning all of time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GlobalWindow;

impl GlobalWindow {
    /// Last timestamp of the global window
    ///
    /// Sits one day short of [`Timestamp::MAX_VALUE`] so that timers set at
    /// the end of the global window still fire before the end of time.
    pub fn end_of_global_window() -> Timestamp {
        Timestamp::MAX_VALUE.saturating_sub(Duration::days(1))
    }
}

impl BoundedWindow for GlobalWindow {
    fn max_timestamp(&self) -> Timestamp {
        Self::end_of_global_window()
    }
}

impl fmt::Display for GlobalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GlobalWindow")
    }
}

/// A half-open interval window `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct IntervalWindow {
    /// Start time of the window (inclusive)
    start: Timestamp,
    /// End time of the window (exclusive)
    end: Timestamp,
}

impl IntervalWindow {
    /// Create a new interval window
    ///
    /// Empty windows (`start == end`) are allowed; inverted bounds are not.
    pub fn new(start: Timestamp, end: Timestamp) -> WindowResult<Self> {
        if start > end {
            return Err(WindowError::InvalidBounds { start, end });
        }
        Ok(Self { start, end })
    }

    /// Create a window from DateTime bounds
    pub fn from_datetimes(start: DateTime<Utc>, end: DateTime<Utc>) -> WindowResult<Self> {
        Self::new(Timestamp::from_datetime(start), Timestamp::from_datetime(end))
    }

    pub fn start(&self) -> Timestamp {
        self.start
    }

    pub fn end(&self) -> Timestamp {
        self.end
    }

    /// Length of the window in milliseconds
    pub fn span_millis(&self) -> u64 {
        // start <= end, so the difference fits in u64 even across the full i64 range
        (i128::from(self.end.millis()) - i128::from(self.start.millis())) as u64
    }

    /// Check if a timestamp falls within this window
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        timestamp >= self.start && timestamp < self.end
    }
}

impl BoundedWindow for IntervalWindow {
    fn max_timestamp(&self) -> Timestamp {
        self.end.saturating_sub(Duration::milliseconds(1))
    }
}

impl fmt::Display for IntervalWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}..{})", self.start, self.end)
    }
}
