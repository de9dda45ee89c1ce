//! Severity-prioritized bounded log buffer.
//!
//! Entries are kept in one FIFO bucket per [`Severity`]. When the buffer is
//! full, the oldest entry of the lowest-priority bucket that is above its
//! guaranteed minimum is evicted to make room, so a burst of chatty entries
//! can never push out the last few critical ones.
//!
//! The buffer itself is not synchronized; wrap it in a
//! [`SharedLogBuffer`](crate::SharedLogBuffer) when more than one thread writes.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::collections::vec_deque;
use std::iter::{FusedIterator, Peekable};

use crate::entry::LogEntry;
use crate::error::{LogBufferError, LogBufferResult};
use crate::severity::Severity;

/// Guaranteed entries per severity when nothing else is configured.
pub const DEFAULT_MINIMUM: usize = 100;

/// Total capacity when nothing else is configured.
pub const DEFAULT_TOTAL: usize = 1000;

/// What [`PriorityLogBuffer::add`] did with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Stored without evicting anything.
    Appended,
    /// Stored after evicting the oldest entry of the given bucket.
    Evicted(Severity),
    /// Not stored; every bucket sits at its floor.
    Dropped,
}

/// Ordering used to interleave buckets during enumeration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeKey {
    /// Wall-clock timestamp; entries without one sort first.
    #[default]
    Timestamp,
    /// Monotonic clock reading, always present.
    Clock,
}

#[derive(Debug, Clone, Default)]
struct Bucket {
    entries: VecDeque<LogEntry>,
    minimum: usize,
}

impl Bucket {
    fn with_minimum(minimum: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            minimum,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Buckets {
    critical: Bucket,
    error: Bucket,
    warning: Bucket,
    info: Bucket,
    verbose: Bucket,
    other: Bucket,
}

impl Buckets {
    fn get(&self, severity: Severity) -> &Bucket {
        match severity {
            Severity::Critical => &self.critical,
            Severity::Error => &self.error,
            Severity::Warning => &self.warning,
            Severity::Info => &self.info,
            Severity::Verbose => &self.verbose,
            Severity::Other => &self.other,
        }
    }

    fn get_mut(&mut self, severity: Severity) -> &mut Bucket {
        match severity {
            Severity::Critical => &mut self.critical,
            Severity::Error => &mut self.error,
            Severity::Warning => &mut self.warning,
            Severity::Info => &mut self.info,
            Severity::Verbose => &mut self.verbose,
            Severity::Other => &mut self.other,
        }
    }

    /// Buckets in [`Severity::ALL`] order.
    fn each(&self) -> [&Bucket; Severity::COUNT] {
        [
            &self.critical,
            &self.error,
            &self.warning,
            &self.info,
            &self.verbose,
            &self.other,
        ]
    }

    fn minimum_sum(&self) -> usize {
        self.each()
            .iter()
            .fold(0usize, |sum, bucket| sum.saturating_add(bucket.minimum))
    }
}

/// Bounded log buffer with per-severity minimum guarantees.
#[derive(Debug, Clone)]
pub struct PriorityLogBuffer {
    buckets: Buckets,
    configured_total: usize,
    total: usize,
    count: usize,
    merge_key: MergeKey,
}

impl PriorityLogBuffer {
    /// Buffer with [`DEFAULT_MINIMUM`] per severity and [`DEFAULT_TOTAL`] capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits([DEFAULT_MINIMUM; Severity::COUNT], DEFAULT_TOTAL)
    }

    /// Buffer with explicit minimums (in [`Severity::ALL`] order) and total.
    ///
    /// The effective capacity is never below the sum of the minimums.
    #[must_use]
    pub fn with_limits(minimums: [usize; Severity::COUNT], total: usize) -> Self {
        let [critical, error, warning, info, verbose, other] = minimums;
        let buckets = Buckets {
            critical: Bucket::with_minimum(critical),
            error: Bucket::with_minimum(error),
            warning: Bucket::with_minimum(warning),
            info: Bucket::with_minimum(info),
            verbose: Bucket::with_minimum(verbose),
            other: Bucket::with_minimum(other),
        };
        let mut buffer = Self {
            buckets,
            configured_total: total,
            total,
            count: 0,
            merge_key: MergeKey::default(),
        };
        buffer.recompute_total();
        buffer
    }

    /// Select the enumeration merge key.
    #[must_use]
    pub fn with_merge_key(mut self, merge_key: MergeKey) -> Self {
        self.merge_key = merge_key;
        self
    }

    /// Change the enumeration merge key.
    pub fn set_merge_key(&mut self, merge_key: MergeKey) {
        self.merge_key = merge_key;
    }

    /// Current enumeration merge key.
    #[must_use]
    pub fn merge_key(&self) -> MergeKey {
        self.merge_key
    }

    /// Set the guaranteed minimum for one severity.
    ///
    /// Lowering a minimum can lower the effective capacity; any excess is
    /// evicted right away.
    ///
    /// # Errors
    ///
    /// Returns [`LogBufferError::InvalidMinimum`] for a negative value.
    pub fn set_minimum(&mut self, severity: Severity, minimum: i64) -> LogBufferResult<()> {
        let Ok(count) = usize::try_from(minimum) else {
            return Err(LogBufferError::InvalidMinimum {
                severity,
                value: minimum,
            });
        };
        self.apply_minimum(severity, count);
        Ok(())
    }

    /// Set the total capacity.
    ///
    /// Lowering it below the current entry count evicts the excess right away.
    ///
    /// # Errors
    ///
    /// Returns [`LogBufferError::InvalidCapacity`] for a negative value.
    pub fn set_total_capacity(&mut self, total: i64) -> LogBufferResult<()> {
        let Ok(count) = usize::try_from(total) else {
            return Err(LogBufferError::InvalidCapacity(total));
        };
        self.apply_total(count);
        Ok(())
    }

    pub(crate) fn apply_minimum(&mut self, severity: Severity, minimum: usize) {
        self.buckets.get_mut(severity).minimum = minimum;
        self.recompute_total();
        self.shrink_to_capacity();
    }

    pub(crate) fn apply_total(&mut self, total: usize) {
        self.configured_total = total;
        self.recompute_total();
        self.shrink_to_capacity();
    }

    fn shrink_to_capacity(&mut self) {
        while self.count > self.total {
            if self.evict_one(None).is_none() {
                break;
            }
            self.count -= 1;
        }
    }

    fn recompute_total(&mut self) {
        self.total = self.configured_total.max(self.buckets.minimum_sum());
    }

    /// Guaranteed minimum of one severity.
    #[must_use]
    pub fn minimum(&self, severity: Severity) -> usize {
        self.buckets.get(severity).minimum
    }

    /// Effective capacity: the configured total or the sum of minimums, whichever is larger.
    #[must_use]
    pub fn total_capacity(&self) -> usize {
        self.total
    }

    /// Number of buffered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the buffer holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Number of buffered entries of one severity.
    #[must_use]
    pub fn bucket_len(&self, severity: Severity) -> usize {
        self.buckets.get(severity).entries.len()
    }

    /// Append an entry, evicting one older entry when the buffer is full.
    ///
    /// When every bucket already sits at its guaranteed minimum there is
    /// nothing to evict; the new entry is then dropped and
    /// [`AddOutcome::Dropped`] returned, so the total capacity is never
    /// exceeded.
    pub fn add(&mut self, entry: LogEntry) -> AddOutcome {
        let severity = entry.severity();
        let outcome = if self.count >= self.total {
            match self.evict_one(Some(severity)) {
                Some(evicted) => AddOutcome::Evicted(evicted),
                None => return AddOutcome::Dropped,
            }
        } else {
            self.count += 1;
            AddOutcome::Appended
        };
        self.buckets.get_mut(severity).entries.push_back(entry);
        outcome
    }

    /// Entries cannot be removed individually; this always fails.
    ///
    /// # Errors
    ///
    /// Always returns [`LogBufferError::RemovalUnsupported`].
    pub fn remove(&mut self, _entry: &LogEntry) -> LogBufferResult<()> {
        Err(LogBufferError::RemovalUnsupported)
    }

    /// Drop every entry. Limits are kept.
    pub fn clear(&mut self) {
        for severity in Severity::ALL {
            self.buckets.get_mut(severity).entries.clear();
        }
        self.count = 0;
    }

    /// Merge the buckets into a single sequence ordered by the merge key.
    ///
    /// Equal keys are yielded in bucket order, higher severity first.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            heads: self.buckets.each().map(|bucket| bucket.entries.iter().peekable()),
            merge_key: self.merge_key,
            remaining: self.count,
        }
    }

    /// Evict the oldest entry of the lowest-priority bucket above its floor.
    ///
    /// The bucket of `incoming` may go one below its minimum to admit the
    /// new entry.
    fn evict_one(&mut self, incoming: Option<Severity>) -> Option<Severity> {
        for severity in Severity::ALL.into_iter().rev() {
            let bucket = self.buckets.get_mut(severity);
            let floor = if incoming == Some(severity) {
                bucket.minimum.saturating_sub(1)
            } else {
                bucket.minimum
            };
            if bucket.entries.len() > floor {
                bucket.entries.pop_front();
                return Some(severity);
            }
        }
        None
    }
}

impl Default for PriorityLogBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Extend<LogEntry> for PriorityLogBuffer {
    fn extend<T: IntoIterator<Item = LogEntry>>(&mut self, iter: T) {
        for entry in iter {
            self.add(entry);
        }
    }
}

impl<'a> IntoIterator for &'a PriorityLogBuffer {
    type Item = &'a LogEntry;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Merge iterator over a [`PriorityLogBuffer`].
#[derive(Debug)]
pub struct Iter<'a> {
    heads: [Peekable<vec_deque::Iter<'a, LogEntry>>; Severity::COUNT],
    merge_key: MergeKey,
    remaining: usize,
}

fn precedes(merge_key: MergeKey, candidate: &LogEntry, current: &LogEntry) -> bool {
    match merge_key {
        MergeKey::Timestamp => candidate.timestamp() < current.timestamp(),
        MergeKey::Clock => candidate.clock() < current.clock(),
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a LogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let mut earliest: Option<(usize, &'a LogEntry)> = None;
        for (index, head) in self.heads.iter_mut().enumerate() {
            let Some(candidate) = head.peek().copied() else {
                continue;
            };
            let replace = match earliest {
                None => true,
                Some((_, current)) => precedes(self.merge_key, candidate, current),
            };
            if replace {
                earliest = Some((index, candidate));
            }
        }

        let (index, _) = earliest?;
        let entry = self.heads.get_mut(index)?.next()?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Iter<'_> {}

impl FusedIterator for Iter<'_> {}
