//! Single pending-wakeup alarm.
//!
//! An [`AlarmTimer`] holds at most one deadline. It fires once when the clock
//! reaches that deadline and then stays disarmed until re-armed with
//! [`AlarmTimer::set_delay`]. Re-arming replaces the pending deadline and
//! arming with [`Timeout::Infinite`] cancels it without firing.
//!
//! The alarm can be driven two ways:
//! - manually, by calling [`AlarmTimer::poll`] after moving the clock (tests), or
//! - by a background driver thread started with [`AlarmTimer::start`] that
//!   sleeps until the deadline and invokes the callback.
//!
//! The driver never holds the alarm lock while running the callback, so the
//! callback may take its owner's lock and re-arm the alarm from inside it.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::clock::SharedClock;
use crate::error::{TimingError, TimingResult};
use crate::timeout::Timeout;

/// Upper bound on a single driver sleep.
///
/// Keeps a wrapping tick source sampled far more often than its wrap period.
pub const MAX_DRIVER_SLEEP: Duration = Duration::from_secs(3600);

#[derive(Debug, Default)]
struct AlarmState {
    deadline: Option<i64>,
    fired: u64,
    /// Bumped by every stop; a driver exits once it no longer matches.
    generation: u64,
}

#[derive(Debug)]
struct AlarmShared {
    clock: SharedClock,
    state: Mutex<AlarmState>,
    wakeup: Condvar,
}

impl AlarmState {
    /// Disarm and report `true` if the pending deadline has been reached.
    fn take_if_due(&mut self, now: i64) -> bool {
        match self.deadline {
            Some(deadline) if is_due(deadline, now) => {
                self.deadline = None;
                self.fired = self.fired.wrapping_add(1);
                true
            }
            _ => false,
        }
    }
}

/// Signed-difference comparison, tolerant of the tick counter wrapping.
#[inline]
fn is_due(deadline: i64, now: i64) -> bool {
    deadline.wrapping_sub(now) <= 0
}

/// A re-armable, cancelable one-shot alarm over a [`Clock`](crate::Clock).
#[derive(Debug)]
pub struct AlarmTimer {
    shared: Arc<AlarmShared>,
    driver: Mutex<Option<JoinHandle<()>>>,
}

impl AlarmTimer {
    /// Create a disarmed alarm with no driver thread.
    #[must_use]
    pub fn new(clock: SharedClock) -> Self {
        Self {
            shared: Arc::new(AlarmShared {
                clock,
                state: Mutex::new(AlarmState::default()),
                wakeup: Condvar::new(),
            }),
            driver: Mutex::new(None),
        }
    }

    /// Arm the alarm `delay` from now, replacing any pending deadline.
    ///
    /// `Timeout::Infinite` cancels the pending alarm without firing it.
    pub fn set_delay(&self, delay: Timeout) {
        let mut state = self.shared.state.lock();
        state.deadline = delay.deadline_from(self.shared.clock.now());
        self.shared.wakeup.notify_all();
    }

    /// Cancel any pending alarm.
    pub fn cancel(&self) {
        self.set_delay(Timeout::Infinite);
    }

    /// The pending absolute deadline, if armed.
    #[must_use]
    pub fn deadline(&self) -> Option<i64> {
        self.shared.state.lock().deadline
    }

    /// Whether a deadline is pending.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.deadline().is_some()
    }

    /// Total number of times this alarm has fired.
    #[must_use]
    pub fn fire_count(&self) -> u64 {
        self.shared.state.lock().fired
    }

    /// Fire the alarm if its deadline has been reached.
    ///
    /// Returns `true` exactly once per arm; the alarm is disarmed afterwards.
    pub fn poll(&self) -> bool {
        let mut state = self.shared.state.lock();
        let now = self.shared.clock.now();
        state.take_if_due(now)
    }

    /// Start a driver thread that invokes `on_fire` whenever the alarm fires.
    ///
    /// Clock ticks are interpreted as milliseconds of real time.
    ///
    /// # Errors
    ///
    /// Returns [`TimingError::DriverFailed`] if a driver is already running or
    /// the thread cannot be spawned. A stopped alarm may be started again.
    pub fn start<F>(&self, on_fire: F) -> TimingResult<()>
    where
        F: Fn() + Send + 'static,
    {
        let mut driver = self.driver.lock();
        if driver.is_some() {
            return Err(TimingError::driver_failed("alarm driver already running"));
        }

        let generation = self.shared.state.lock().generation;
        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("crashkit-alarm".into())
            .spawn(move || drive(&shared, generation, &on_fire))
            .map_err(|e| TimingError::driver_failed(e.to_string()))?;

        *driver = Some(handle);
        tracing::debug!("alarm driver started");
        Ok(())
    }

    /// Stop and join the driver thread, if one is running.
    pub fn stop(&self) {
        let handle = {
            let mut driver = self.driver.lock();
            let mut state = self.shared.state.lock();
            state.generation = state.generation.wrapping_add(1);
            self.shared.wakeup.notify_all();
            driver.take()
        };

        let Some(handle) = handle else {
            return;
        };
        // The last owner may be dropped from inside the callback itself.
        if handle.thread().id() == thread::current().id() {
            return;
        }
        if handle.join().is_err() {
            tracing::warn!("alarm driver thread panicked");
        }
    }
}

impl Drop for AlarmTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn drive(shared: &AlarmShared, generation: u64, on_fire: &dyn Fn()) {
    let mut state = shared.state.lock();
    loop {
        if state.generation != generation {
            return;
        }

        // Sampled on every pass, armed or not, so a wrapping source is never
        // left unread for longer than one capped sleep.
        let now = shared.clock.now();
        if state.take_if_due(now) {
            // Run the callback unlocked so it can re-arm this alarm.
            drop(state);
            on_fire();
            state = shared.state.lock();
            continue;
        }

        let sleep = state.deadline.map_or(MAX_DRIVER_SLEEP, |deadline| {
            let remaining = deadline.wrapping_sub(now);
            Duration::from_millis(u64::try_from(remaining).unwrap_or(0)).min(MAX_DRIVER_SLEEP)
        });
        shared.wakeup.wait_for(&mut state, sleep);
    }
}
