//! Named timer ledger.
//!
//! A ledger tracks an absolute expiry per name. Entries are found by name in
//! O(1) through a hash map, and the enabled ones are additionally kept in an
//! ordered schedule keyed by `(expiry, insertion sequence)` so the next due
//! entry is found in O(log n).
//!
//! Expiry and removal are separate on purpose: [`TimerLedger::expunge_expired`]
//! only *disables* due entries. They keep their name (so a second `add` is
//! still rejected) until the owner re-arms them with [`TimerLedger::change`]
//! or drops them with [`TimerLedger::remove`].

use std::collections::{BTreeMap, HashMap};

use crate::clock::SharedClock;
use crate::error::{TimingError, TimingResult};
use crate::timeout::Timeout;

#[derive(Debug, Clone, Copy)]
struct LedgerEntry {
    /// Absolute expiry, or `None` when disabled.
    expiry: Option<i64>,
    /// Insertion order, preserved across `change`.
    seq: u64,
}

/// A collection of named timers sharing one clock.
#[derive(Debug)]
pub struct TimerLedger {
    clock: SharedClock,
    entries: HashMap<String, LedgerEntry>,
    schedule: BTreeMap<(i64, u64), String>,
    next_seq: u64,
}

impl TimerLedger {
    /// Create an empty ledger reading time from `clock`.
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            clock,
            entries: HashMap::new(),
            schedule: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Insert a new timer expiring `timeout` from now.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::DuplicateKey`] if `name` is already present,
    /// enabled or not, and [`TimingError::InvalidArgument`] if `name` is empty.
    pub fn add(&mut self, name: &str, timeout: Timeout) -> TimingResult<()> {
        validate_name(name)?;
        if self.entries.contains_key(name) {
            return Err(TimingError::duplicate_key(name));
        }

        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);

        let expiry = timeout.deadline_from(self.clock.now());
        if let Some(expiry) = expiry {
            self.schedule.insert((expiry, seq), name.to_owned());
        }
        self.entries
            .insert(name.to_owned(), LedgerEntry { expiry, seq });
        Ok(())
    }

    /// Re-arm an existing timer to expire `timeout` from now.
    ///
    /// An `Infinite` timeout disables the entry; a finite one enables it.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::NotFound`] if `name` is absent and
    /// [`TimingError::InvalidArgument`] if `name` is empty.
    pub fn change(&mut self, name: &str, timeout: Timeout) -> TimingResult<()> {
        validate_name(name)?;
        let now = self.clock.now();
        let entry = self
            .entries
            .get_mut(name)
            .ok_or_else(|| TimingError::not_found(name))?;

        if let Some(old) = entry.expiry {
            self.schedule.remove(&(old, entry.seq));
        }
        entry.expiry = timeout.deadline_from(now);
        if let Some(expiry) = entry.expiry {
            self.schedule.insert((expiry, entry.seq), name.to_owned());
        }
        Ok(())
    }

    /// Remove a timer entirely.
    ///
    /// Returns `Ok(true)` if it existed and `Ok(false)` otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::InvalidArgument`] if `name` is empty.
    pub fn remove(&mut self, name: &str) -> TimingResult<bool> {
        validate_name(name)?;
        match self.entries.remove(name) {
            Some(entry) => {
                if let Some(expiry) = entry.expiry {
                    self.schedule.remove(&(expiry, entry.seq));
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Whether a timer with this name exists, enabled or not.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Whether the named timer exists and is armed.
    #[must_use]
    pub fn is_enabled(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|entry| entry.expiry.is_some())
    }

    /// Absolute expiry of the named timer: `None` if absent, `Some(None)` if disabled.
    #[must_use]
    pub fn expiry_of(&self, name: &str) -> Option<Option<i64>> {
        self.entries.get(name).map(|entry| entry.expiry)
    }

    /// Time until the earliest enabled timer is due.
    ///
    /// Clamped to zero for overdue entries; `Infinite` when nothing is enabled.
    #[must_use]
    pub fn next_expiry_offset(&self) -> Timeout {
        match self.schedule.keys().next() {
            Some(&(expiry, _)) => {
                let remaining = expiry.saturating_sub(self.clock.now());
                Timeout::Millis(u64::try_from(remaining).unwrap_or(0))
            }
            None => Timeout::Infinite,
        }
    }

    /// Disable every enabled timer that is due and return their names.
    ///
    /// Names come back in ascending expiry order, ties broken by insertion
    /// order. Each due entry is reported exactly once; it stays in the ledger
    /// as a disabled entry.
    pub fn expunge_expired(&mut self) -> Vec<String> {
        let now = self.clock.now();
        let mut expired = Vec::new();

        while let Some(entry) = self.schedule.first_entry() {
            let &(expiry, _) = entry.key();
            if expiry > now {
                break;
            }
            let name = entry.remove();
            if let Some(slot) = self.entries.get_mut(&name) {
                slot.expiry = None;
            }
            expired.push(name);
        }

        if !expired.is_empty() {
            tracing::trace!(count = expired.len(), now, "expunged expired timers");
        }
        expired
    }

    /// Remove every timer.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.schedule.clear();
    }

    /// Number of enabled timers.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.schedule.len()
    }

    /// Number of timers, enabled or not.
    #[must_use]
    pub fn total_count(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger holds no timers at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_name(name: &str) -> TimingResult<()> {
    if name.is_empty() {
        return Err(TimingError::invalid_argument("timer name must not be empty"));
    }
    Ok(())
}
