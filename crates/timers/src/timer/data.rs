//! Timer records and their ordering
//!
//! A [`TimerData`] is compared two different ways, and the two must not be
//! confused:
//!
//! - **Value equality** (`==`, `Hash`) looks at namespace, timestamp and
//!   domain. Use it for deduplication and set membership.
//! - **Due order** ([`TimerData::compare_by_timestamp`], [`by_timestamp`])
//!   looks at the timestamp only. Use it to pick the next timer to fire.
//!
//! `TimerData` deliberately does not implement `Ord`: a derived ordering
//! would rank timers by namespace and domain too.

use std::cmp::Ordering;
use std::fmt;

use crate::state::StateNamespace;
use crate::time::{TimeDomain, Timestamp};

/// A timer: fire in `namespace` once `domain`'s clock passes `timestamp`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TimerData {
    namespace: StateNamespace,
    timestamp: Timestamp,
    domain: TimeDomain,
}

impl TimerData {
    /// Create a timer
    ///
    /// Any timestamp is accepted, including ones already in the past:
    /// processing-time timers may legitimately refer to elapsed time.
    pub fn of(namespace: StateNamespace, timestamp: Timestamp, domain: TimeDomain) -> Self {
        Self {
            namespace,
            timestamp,
            domain,
        }
    }

    pub fn namespace(&self) -> &StateNamespace {
        &self.namespace
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    pub fn domain(&self) -> TimeDomain {
        self.domain
    }

    /// Due order: earlier timestamps first, nothing else considered
    ///
    /// Returns `Equal` for timers with the same timestamp even when they
    /// differ in namespace or domain.
    pub fn compare_by_timestamp(&self, other: &TimerData) -> Ordering {
        self.timestamp.cmp(&other.timestamp)
    }
}

/// Comparator form of [`TimerData::compare_by_timestamp`], for `sort_by`
/// and friends
pub fn by_timestamp(a: &TimerData, b: &TimerData) -> Ordering {
    a.compare_by_timestamp(b)
}

impl fmt::Display for TimerData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TimerData{{namespace={}, timestamp={}, domain={}}}",
            self.namespace, self.timestamp, self.domain
        )
    }
}
