//! Timestamps and time domains
//!
//! Timers are due at a [`Timestamp`], measured on one of the three clocks
//! named by [`TimeDomain`].
//!
//! # Example
//!
//! ```rust
//! use stream_timers::time::{TimeDomain, Timestamp};
//!
//! let due = Timestamp::from_millis(1_000);
//! assert!(due.is_before(Timestamp::from_millis(2_000)));
//! assert_eq!(TimeDomain::try_from(1u8).unwrap(), TimeDomain::ProcessingTime);
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DecodingError;

/// A point in time in milliseconds since the Unix epoch
///
/// Every `i64` value is a valid timestamp. [`Timestamp::MIN_VALUE`] and
/// [`Timestamp::MAX_VALUE`] bound the timestamps that windows may contain,
/// but timers themselves accept anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp {
    millis: i64,
}

impl Timestamp {
    /// Smallest timestamp a window may contain
    pub const MIN_VALUE: Timestamp = Timestamp {
        millis: i64::MIN / 1000,
    };

    /// Largest timestamp a window may contain
    pub const MAX_VALUE: Timestamp = Timestamp {
        millis: i64::MAX / 1000,
    };

    /// Unix epoch
    pub const EPOCH: Timestamp = Timestamp { millis: 0 };

    /// Creates a timestamp from milliseconds since the epoch
    pub const fn from_millis(millis: i64) -> Self {
        Self { millis }
    }

    /// Milliseconds since the epoch
    pub const fn millis(&self) -> i64 {
        self.millis
    }

    /// Creates a timestamp from a DateTime, truncating to milliseconds
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self {
            millis: dt.timestamp_millis(),
        }
    }

    /// Converts to a DateTime, or `None` outside chrono's supported range
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.millis)
    }

    /// Current wall-clock time
    pub fn now() -> Self {
        Self::from_datetime(Utc::now())
    }

    /// Adds a duration, saturating at the ends of the `i64` range
    pub fn saturating_add(&self, duration: Duration) -> Self {
        Self {
            millis: self.millis.saturating_add(duration.num_milliseconds()),
        }
    }

    /// Subtracts a duration, saturating at the ends of the `i64` range
    pub fn saturating_sub(&self, duration: Duration) -> Self {
        Self {
            millis: self.millis.saturating_sub(duration.num_milliseconds()),
        }
    }

    /// Checks if this timestamp is strictly before another
    pub fn is_before(&self, other: Timestamp) -> bool {
        self.millis < other.millis
    }

    /// Checks if this timestamp is strictly after another
    pub fn is_after(&self, other: Timestamp) -> bool {
        self.millis > other.millis
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_datetime() {
            Some(dt) => write!(f, "{}", dt.format("%Y-%m-%dT%H:%M:%S%.3fZ")),
            None => write!(f, "{}ms", self.millis),
        }
    }
}

/// The clock a timer is measured against
///
/// The set is closed and each member has a fixed wire code, so encoded
/// timers stay readable across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeDomain {
    /// Driven by the watermark
    EventTime,
    /// Driven by the wall clock; not consistent across restarts
    ProcessingTime,
    /// Wall clock held back to be no earlier than the watermark
    SynchronizedProcessingTime,
}

impl TimeDomain {
    /// All domains in wire-code order
    pub const ALL: [TimeDomain; 3] = [
        TimeDomain::EventTime,
        TimeDomain::ProcessingTime,
        TimeDomain::SynchronizedProcessingTime,
    ];

    /// Single-byte code used on the wire
    pub const fn wire_code(&self) -> u8 {
        match self {
            TimeDomain::EventTime => 0,
            TimeDomain::ProcessingTime => 1,
            TimeDomain::SynchronizedProcessingTime => 2,
        }
    }

    /// Stable upper-case name
    pub const fn as_str(&self) -> &'static str {
        match self {
            TimeDomain::EventTime => "EVENT_TIME",
            TimeDomain::ProcessingTime => "PROCESSING_TIME",
            TimeDomain::SynchronizedProcessingTime => "SYNCHRONIZED_PROCESSING_TIME",
        }
    }
}

impl TryFrom<u8> for TimeDomain {
    type Error = DecodingError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(TimeDomain::EventTime),
            1 => Ok(TimeDomain::ProcessingTime),
            2 => Ok(TimeDomain::SynchronizedProcessingTime),
            value => Err(DecodingError::InvalidDiscriminator {
                what: "time domain",
                value,
            }),
        }
    }
}

impl fmt::Display for TimeDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
