//! Per-key timer bookkeeping
//!
//! [`TimerInternals`] is the interface window execution uses to schedule
//! timers and read clocks. [`InMemoryTimerInternals`] keeps one key's
//! pending timers in memory and fires them as the caller advances its
//! clocks. It does not compute watermarks; whoever drives it decides what
//! the clocks say.
//!
//! One instance belongs to one key and is driven by one task at a time.

use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

use tracing::{debug, trace, warn};

use super::data::{by_timestamp, TimerData};
use crate::error::{Result, TimerError};
use crate::time::{TimeDomain, Timestamp};

/// Scheduling and clock access for one key
pub trait TimerInternals {
    /// Schedule a timer; setting an equal timer again has no effect
    fn set_timer(&mut self, timer: TimerData);

    /// Cancel a timer; unknown timers are ignored
    fn delete_timer(&mut self, timer: &TimerData);

    /// Current processing time
    fn current_processing_time(&self) -> Timestamp;

    /// Current synchronized processing time, if known
    fn current_synchronized_processing_time(&self) -> Option<Timestamp>;

    /// Current input watermark
    fn current_input_watermark_time(&self) -> Timestamp;

    /// Current output watermark, if known
    fn current_output_watermark_time(&self) -> Option<Timestamp>;
}

/// Heap entry ordered by due time only
#[derive(Debug)]
struct DueTimer(TimerData);

impl PartialEq for DueTimer {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for DueTimer {}

impl PartialOrd for DueTimer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for DueTimer {
    fn cmp(&self, other: &Self) -> Ordering {
        by_timestamp(&self.0, &other.0)
    }
}

type DueQueue = BinaryHeap<Reverse<DueTimer>>;

/// Stale entries tolerated in a due queue before it is rebuilt
const COMPACTION_SLACK: usize = 16;

/// In-memory timer set for a single key
///
/// Membership uses full value equality, so two timers that share a
/// timestamp but differ in namespace or domain are both kept. Firing order
/// uses timestamps only.
///
/// Deleted timers are removed from membership immediately and dropped from
/// the due queues lazily, the next time they reach the front. A queue whose
/// stale entries outgrow the live timers is rebuilt from membership, so its
/// size stays proportional to [`InMemoryTimerInternals::len`].
#[derive(Debug)]
pub struct InMemoryTimerInternals {
    existing: HashSet<TimerData>,
    event_time_timers: DueQueue,
    processing_time_timers: DueQueue,
    synchronized_processing_time_timers: DueQueue,
    input_watermark: Timestamp,
    output_watermark: Option<Timestamp>,
    processing_time: Timestamp,
    synchronized_processing_time: Timestamp,
}

impl Default for InMemoryTimerInternals {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryTimerInternals {
    /// Empty timer set with every clock at [`Timestamp::MIN_VALUE`]
    pub fn new() -> Self {
        Self {
            existing: HashSet::new(),
            event_time_timers: BinaryHeap::new(),
            processing_time_timers: BinaryHeap::new(),
            synchronized_processing_time_timers: BinaryHeap::new(),
            input_watermark: Timestamp::MIN_VALUE,
            output_watermark: None,
            processing_time: Timestamp::MIN_VALUE,
            synchronized_processing_time: Timestamp::MIN_VALUE,
        }
    }

    /// Rebuild a timer set, e.g. from a decoded checkpoint
    pub fn from_timers<I: IntoIterator<Item = TimerData>>(timers: I) -> Self {
        let mut internals = Self::new();
        for timer in timers {
            internals.set_timer(timer);
        }
        debug!(timers = internals.len(), "restored timer set");
        internals
    }

    /// Number of pending timers
    pub fn len(&self) -> usize {
        self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }

    pub fn contains(&self, timer: &TimerData) -> bool {
        self.existing.contains(timer)
    }

    /// Snapshot of all pending timers, earliest first
    pub fn pending_timers(&self) -> Vec<TimerData> {
        let mut timers: Vec<TimerData> = self.existing.iter().cloned().collect();
        timers.sort_by(by_timestamp);
        timers
    }

    /// The time `domain`'s timers are compared against
    pub fn current_time(&self, domain: TimeDomain) -> Timestamp {
        match domain {
            TimeDomain::EventTime => self.input_watermark,
            TimeDomain::ProcessingTime => self.processing_time,
            TimeDomain::SynchronizedProcessingTime => self.synchronized_processing_time,
        }
    }

    /// Timestamp of the earliest pending timer in `domain`
    pub fn next_timer_timestamp(&mut self, domain: TimeDomain) -> Option<Timestamp> {
        let (queue, existing) = self.queue_and_members(domain);
        prune_deleted(queue, existing);
        queue.peek().map(|Reverse(DueTimer(timer))| timer.timestamp())
    }

    /// Remove and return the earliest timer in `domain` whose timestamp is
    /// strictly before that domain's current time
    pub fn remove_next_timer(&mut self, domain: TimeDomain) -> Option<TimerData> {
        let now = self.current_time(domain);
        let (queue, existing) = self.queue_and_members(domain);
        prune_deleted(queue, existing);

        let is_due = queue
            .peek()
            .is_some_and(|Reverse(DueTimer(timer))| now.is_after(timer.timestamp()));
        if !is_due {
            return None;
        }

        let Reverse(DueTimer(timer)) = queue.pop()?;
        existing.remove(&timer);
        trace!(%timer, %now, "firing timer");
        Some(timer)
    }

    /// Advance the input watermark; event-time timers before it become due
    pub fn advance_input_watermark(&mut self, new_watermark: Timestamp) -> Result<()> {
        check_monotonic(TimeDomain::EventTime, self.input_watermark, new_watermark)?;
        trace!(from = %self.input_watermark, to = %new_watermark, "advancing input watermark");
        self.input_watermark = new_watermark;
        Ok(())
    }

    /// Advance the output watermark
    ///
    /// The output watermark never runs ahead of the input watermark; a
    /// larger value is clamped to it.
    pub fn advance_output_watermark(&mut self, new_watermark: Timestamp) -> Result<()> {
        let adjusted = if new_watermark.is_after(self.input_watermark) {
            debug!(
                requested = %new_watermark,
                input = %self.input_watermark,
                "clamping output watermark to input watermark"
            );
            self.input_watermark
        } else {
            new_watermark
        };

        if let Some(current) = self.output_watermark {
            check_monotonic(TimeDomain::EventTime, current, adjusted)?;
        }
        self.output_watermark = Some(adjusted);
        Ok(())
    }

    /// Advance processing time
    pub fn advance_processing_time(&mut self, new_time: Timestamp) -> Result<()> {
        check_monotonic(TimeDomain::ProcessingTime, self.processing_time, new_time)?;
        self.processing_time = new_time;
        Ok(())
    }

    /// Advance synchronized processing time
    pub fn advance_synchronized_processing_time(&mut self, new_time: Timestamp) -> Result<()> {
        check_monotonic(
            TimeDomain::SynchronizedProcessingTime,
            self.synchronized_processing_time,
            new_time,
        )?;
        self.synchronized_processing_time = new_time;
        Ok(())
    }

    fn queue_and_members(&mut self, domain: TimeDomain) -> (&mut DueQueue, &mut HashSet<TimerData>) {
        let queue = match domain {
            TimeDomain::EventTime => &mut self.event_time_timers,
            TimeDomain::ProcessingTime => &mut self.processing_time_timers,
            TimeDomain::SynchronizedProcessingTime => &mut self.synchronized_processing_time_timers,
        };
        (queue, &mut self.existing)
    }

    /// Rebuild `domain`'s queue from membership once stale entries dominate
    fn compact_if_stale(&mut self, domain: TimeDomain) {
        let live = self.existing.len();
        let (queue, existing) = self.queue_and_members(domain);
        if queue.len() <= 2 * live + COMPACTION_SLACK {
            return;
        }

        let before = queue.len();
        *queue = existing
            .iter()
            .filter(|timer| timer.domain() == domain)
            .cloned()
            .map(|timer| Reverse(DueTimer(timer)))
            .collect();
        trace!(%domain, before, after = queue.len(), "compacted timer queue");
    }
}

impl TimerInternals for InMemoryTimerInternals {
    fn set_timer(&mut self, timer: TimerData) {
        if self.existing.contains(&timer) {
            return;
        }
        trace!(%timer, "setting timer");
        let domain = timer.domain();
        let (queue, existing) = self.queue_and_members(domain);
        existing.insert(timer.clone());
        queue.push(Reverse(DueTimer(timer)));
        self.compact_if_stale(domain);
    }

    fn delete_timer(&mut self, timer: &TimerData) {
        if self.existing.remove(timer) {
            trace!(%timer, "deleted timer");
            self.compact_if_stale(timer.domain());
        }
    }

    fn current_processing_time(&self) -> Timestamp {
        self.processing_time
    }

    fn current_synchronized_processing_time(&self) -> Option<Timestamp> {
        Some(self.synchronized_processing_time)
    }

    fn current_input_watermark_time(&self) -> Timestamp {
        self.input_watermark
    }

    fn current_output_watermark_time(&self) -> Option<Timestamp> {
        self.output_watermark
    }
}

/// Drop queue entries whose timer was deleted or already fired
fn prune_deleted(queue: &mut DueQueue, existing: &HashSet<TimerData>) {
    while let Some(Reverse(DueTimer(timer))) = queue.peek() {
        if existing.contains(timer) {
            break;
        }
        queue.pop();
    }
}

fn check_monotonic(domain: TimeDomain, current: Timestamp, new_time: Timestamp) -> Result<()> {
    if new_time.is_before(current) {
        warn!(%domain, %current, new = %new_time, "rejected clock regression");
        return Err(TimerError::ClockRegression {
            domain,
            current_time: current,
            new_time,
        });
    }
    Ok(())
}
