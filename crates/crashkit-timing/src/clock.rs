//! Wraparound-safe monotonic clocks.
//!
//! The system tick counter most platforms expose cheaply is a 32-bit
//! millisecond value that wraps roughly every 49.7 days. [`MonotonicClock`]
//! widens it to 64 bits by counting rollovers, so the value it returns never
//! goes backwards as long as it is sampled at least once per wrap period.
//!
//! Everything downstream (ledgers, alarms, log timestamps) consumes time
//! through the [`Clock`] trait, which keeps tests free to substitute a
//! [`VirtualClock`] that they drive by hand.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::sync::OnceLock;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::time::Instant;

/// A source of 64-bit, millisecond clock ticks.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Current tick count in milliseconds.
    fn now(&self) -> i64;
}

/// Shared handle to a clock, passed into every component that needs time.
pub type SharedClock = Arc<dyn Clock>;

/// A raw, wrapping 32-bit tick counter.
pub trait TickSource: Send + Sync + fmt::Debug {
    /// Current raw tick; allowed to wrap from `u32::MAX` back to zero.
    fn raw_ticks(&self) -> u32;
}

static PROCESS_START: OnceLock<Instant> = OnceLock::new();

/// Milliseconds since the first use of any [`SystemTickSource`] in this
/// process, truncated to 32 bits.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemTickSource;

impl TickSource for SystemTickSource {
    fn raw_ticks(&self) -> u32 {
        let start = *PROCESS_START.get_or_init(Instant::now);
        let elapsed = start.elapsed().as_millis();
        // Truncation is the point: this mimics a wrapping hardware counter.
        (elapsed & u128::from(u32::MAX)) as u32
    }
}

/// A settable tick source for exercising rollover behaviour.
#[derive(Debug, Default)]
pub struct ManualTickSource {
    ticks: AtomicU32,
}

impl ManualTickSource {
    /// Create a source starting at `start`.
    #[must_use]
    pub fn new(start: u32) -> Self {
        Self {
            ticks: AtomicU32::new(start),
        }
    }

    /// Overwrite the raw tick value.
    pub fn set(&self, ticks: u32) {
        self.ticks.store(ticks, Ordering::SeqCst);
    }

    /// Advance the raw tick value, wrapping at 32 bits.
    pub fn advance(&self, delta: u32) {
        // fetch_add on atomics wraps on overflow.
        self.ticks.fetch_add(delta, Ordering::SeqCst);
    }
}

impl TickSource for ManualTickSource {
    fn raw_ticks(&self) -> u32 {
        self.ticks.load(Ordering::SeqCst)
    }
}

impl<T: TickSource + ?Sized> TickSource for Arc<T> {
    fn raw_ticks(&self) -> u32 {
        (**self).raw_ticks()
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ClockState {
    epoch: i64,
    last_sample: u32,
    zero_offset: i64,
}

/// 64-bit monotonic clock layered over a wrapping 32-bit [`TickSource`].
///
/// Each call to [`now`](Clock::now) samples the source; a sample smaller than
/// the previous one means the counter rolled over and the epoch advances.
/// The result is `(epoch << 32) + raw - zero_offset`.
pub struct MonotonicClock {
    source: Box<dyn TickSource>,
    state: Mutex<ClockState>,
}

impl MonotonicClock {
    /// Create a clock over `source`. The first reading equals the raw tick.
    pub fn new(source: impl TickSource + 'static) -> Self {
        let last_sample = source.raw_ticks();
        Self {
            source: Box::new(source),
            state: Mutex::new(ClockState {
                last_sample,
                ..ClockState::default()
            }),
        }
    }

    /// A clock driven by the process-wide [`SystemTickSource`].
    #[must_use]
    pub fn system() -> Self {
        Self::new(SystemTickSource)
    }

    /// Rebase the clock so that the current instant reads as zero.
    ///
    /// Clears the epoch counter; values returned before the reset may be
    /// larger than values returned after it.
    pub fn reset(&self) {
        let mut state = self.state.lock();
        let raw = self.source.raw_ticks();
        state.epoch = 0;
        state.last_sample = raw;
        state.zero_offset = i64::from(raw);
    }

    /// Number of 32-bit rollovers observed since construction or the last reset.
    #[must_use]
    pub fn epoch(&self) -> i64 {
        self.state.lock().epoch
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> i64 {
        // Sample under the lock so concurrent readers cannot observe samples
        // out of order and double-count a rollover.
        let mut state = self.state.lock();
        let raw = self.source.raw_ticks();
        if raw < state.last_sample {
            state.epoch = state.epoch.saturating_add(1);
        }
        state.last_sample = raw;
        (state.epoch << 32)
            .saturating_add(i64::from(raw))
            .saturating_sub(state.zero_offset)
    }
}

impl fmt::Debug for MonotonicClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = *self.state.lock();
        f.debug_struct("MonotonicClock")
            .field("source", &self.source)
            .field("epoch", &state.epoch)
            .field("last_sample", &state.last_sample)
            .field("zero_offset", &state.zero_offset)
            .finish()
    }
}

/// A hand-driven clock for deterministic tests.
///
/// Unlike [`MonotonicClock`] it can be set to any value, including negative
/// ones, and only moves when told to.
#[derive(Debug, Default)]
pub struct VirtualClock {
    now: AtomicI64,
}

impl VirtualClock {
    /// Create a clock reading `start`.
    #[must_use]
    pub fn new(start: i64) -> Self {
        Self {
            now: AtomicI64::new(start),
        }
    }

    /// Create a shared clock reading `start`.
    #[must_use]
    pub fn shared(start: i64) -> Arc<Self> {
        Arc::new(Self::new(start))
    }

    /// Set the current reading.
    pub fn set(&self, now: i64) {
        self.now.store(now, Ordering::SeqCst);
    }

    /// Move the clock forward by `delta` milliseconds.
    pub fn advance(&self, delta: u64) {
        let delta = i64::try_from(delta).unwrap_or(i64::MAX);
        self.now.fetch_add(delta, Ordering::SeqCst);
    }
}

impl Clock for VirtualClock {
    fn now(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}
