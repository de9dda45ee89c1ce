//! Core watchdog monitor.
//!
//! Each registered task owns one entry in a *warning* ledger and one in a
//! *critical* ledger. A ping re-arms both; silence lets them expire. A single
//! [`AlarmTimer`] is always armed for the earliest enabled entry across both
//! ledgers, so the monitor only wakes when something is actually due.
//!
//! ```text
//! Unregistered --register--> Registered --warning due--> Warned --critical due--> Critical
//!                                 ^                         |                        |
//!                                 +----------ping-----------+------------------------+
//! ```
//!
//! # Locking
//!
//! One lock guards both ledgers, the task records, listeners and handlers.
//! Every public operation holds it for its full duration, including the
//! alarm re-arm, and the alarm's own lock is only ever taken *after* it.
//!
//! Listeners and handlers run with the monitor lock held. They must not call
//! back into [`register`](WatchdogMonitor::register),
//! [`unregister`](WatchdogMonitor::unregister) or [`ping`](WatchdogMonitor::ping)
//! on the same monitor; doing so deadlocks.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::panic::Location;
use std::sync::Arc;

use crashkit_timing::{AlarmTimer, SharedClock, Timeout, TimerLedger};

use crate::call_site::{CallSiteCapture, CallerLocation};
use crate::config::{Thresholds, WatchdogConfig};
use crate::error::{WatchdogError, WatchdogResult};
use crate::report::{
    EventListener, StallHandler, StallLevel, StallReport, TaskRecord, TaskStatus, WatchdogEvent,
    abort_on_stall, log_stall_report,
};

struct MonitorState {
    warning: TimerLedger,
    critical: TimerLedger,
    tasks: HashMap<String, TaskRecord>,
    listeners: Vec<EventListener>,
    warning_handler: StallHandler,
    critical_handler: StallHandler,
}

impl MonitorState {
    fn next_expiry_offset(&self) -> Timeout {
        self.warning
            .next_expiry_offset()
            .min(self.critical.next_expiry_offset())
    }

    fn arm_new(&mut self, name: &str, thresholds: Thresholds) -> WatchdogResult<()> {
        self.warning.add(name, thresholds.warning)?;
        if let Err(err) = self.critical.add(name, thresholds.critical) {
            // Keep the two ledgers in step.
            self.warning.remove(name)?;
            return Err(err.into());
        }
        Ok(())
    }

    fn rearm_existing(&mut self, name: &str, thresholds: Thresholds) -> WatchdogResult<()> {
        self.warning.change(name, thresholds.warning)?;
        self.critical.change(name, thresholds.critical)?;
        Ok(())
    }

    fn disarm(&mut self, name: &str) -> WatchdogResult<()> {
        let in_warning = self.warning.remove(name)?;
        let in_critical = self.critical.remove(name)?;
        if in_warning && in_critical {
            Ok(())
        } else {
            Err(WatchdogError::inconsistent(name))
        }
    }

    fn notify(&self, level: StallLevel, tasks: &[String]) {
        if tasks.is_empty() || self.listeners.is_empty() {
            return;
        }
        let event = WatchdogEvent {
            level,
            tasks: tasks.to_vec(),
        };
        for listener in &self.listeners {
            listener(&event);
        }
    }

    fn report(&self, level: StallLevel, detected_at: i64, names: &[String]) -> StallReport {
        StallReport {
            level,
            detected_at,
            tasks: names
                .iter()
                .filter_map(|name| self.tasks.get(name).cloned())
                .collect(),
        }
    }
}

/// Dual-threshold liveness monitor for named tasks.
///
/// Create one per process (or per test) and share it by reference or `Arc`.
/// Use [`WatchdogMonitor::spawn`] in production, where a driver thread fires
/// the alarm on real time, or [`WatchdogMonitor::new`] plus
/// [`WatchdogMonitor::poll`] to drive it by hand.
pub struct WatchdogMonitor {
    clock: SharedClock,
    config: WatchdogConfig,
    call_sites: Box<dyn CallSiteCapture>,
    alarm: AlarmTimer,
    state: Mutex<MonitorState>,
}

impl WatchdogMonitor {
    /// Create a monitor whose alarm is driven manually through [`poll`](Self::poll).
    ///
    /// Warnings are logged and criticals abort the process until other
    /// handlers are installed.
    #[must_use]
    pub fn new(clock: SharedClock, config: WatchdogConfig) -> Self {
        let warning_handler: StallHandler = Arc::new(log_stall_report);
        let critical_handler: StallHandler = Arc::new(abort_on_stall);
        Self {
            alarm: AlarmTimer::new(Arc::clone(&clock)),
            state: Mutex::new(MonitorState {
                warning: TimerLedger::new(Arc::clone(&clock)),
                critical: TimerLedger::new(Arc::clone(&clock)),
                tasks: HashMap::new(),
                listeners: Vec::new(),
                warning_handler,
                critical_handler,
            }),
            clock,
            config,
            call_sites: Box::new(CallerLocation),
        }
    }

    /// Create a monitor with a driver thread firing the alarm in real time.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the driver thread
    /// cannot be started.
    pub fn spawn(clock: SharedClock, config: WatchdogConfig) -> WatchdogResult<Arc<Self>> {
        config.validate()?;
        Self::new(clock, config).start()
    }

    /// Replace how call sites are captured for registrations and pings.
    #[must_use]
    pub fn with_call_site_capture(mut self, capture: impl CallSiteCapture + 'static) -> Self {
        self.call_sites = Box::new(capture);
        self
    }

    /// Move the monitor behind an `Arc` and start its alarm driver thread.
    ///
    /// The driver holds only a weak reference; dropping the last `Arc` stops it.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver thread cannot be started.
    pub fn start(self) -> WatchdogResult<Arc<Self>> {
        let monitor = Arc::new(self);
        let weak = Arc::downgrade(&monitor);
        monitor.alarm.start(move || {
            if let Some(monitor) = weak.upgrade() {
                monitor.on_alarm();
            }
        })?;
        tracing::debug!("Watchdog monitor started");
        Ok(monitor)
    }

    /// Begin monitoring `name`.
    ///
    /// Thresholds from the configuration's override table take precedence
    /// over the requested ones. Returns `false`, and logs where the existing
    /// registration came from, if `name` is already registered.
    #[track_caller]
    pub fn register(&self, name: &str, warning: Timeout, critical: Timeout) -> bool {
        let location = Location::caller();
        let requested = Thresholds::new(warning, critical);
        let thresholds = self.config.thresholds_for(name).unwrap_or(requested);

        let mut guard = self.state.lock();
        let state = &mut *guard;

        if let Some(existing) = state.tasks.get(name) {
            tracing::warn!(
                task = name,
                registered_at = existing.registered_at,
                registered_by = %existing.registered_by,
                caller = %self.call_sites.capture(location),
                "Watchdog already registered"
            );
            return false;
        }
        if name.is_empty() {
            tracing::warn!(caller = %self.call_sites.capture(location), "Watchdog name must not be empty");
            return false;
        }

        let armed = state.arm_new(name, thresholds);
        debug_assert!(armed.is_ok(), "watchdog ledgers out of step for {name}");
        if let Err(err) = armed {
            tracing::error!(task = name, error = %err, "Watchdog ledgers out of step");
            return false;
        }

        let registered_by = self.call_sites.capture(location);
        tracing::debug!(
            task = name,
            warning = %thresholds.warning,
            critical = %thresholds.critical,
            overridden = thresholds != requested,
            registered_by = %registered_by,
            "Watchdog registered"
        );
        state.tasks.insert(
            name.to_owned(),
            TaskRecord {
                name: name.to_owned(),
                thresholds,
                registered_at: self.clock.now(),
                registered_by,
                last_ping_at: None,
                last_ping_by: None,
            },
        );

        self.rearm(state);
        true
    }

    /// Stop monitoring `name`. Returns `false` if it was not registered.
    #[track_caller]
    pub fn unregister(&self, name: &str) -> bool {
        let location = Location::caller();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if state.tasks.remove(name).is_none() {
            tracing::warn!(
                task = name,
                caller = %self.call_sites.capture(location),
                "Unregister of unknown watchdog"
            );
            return false;
        }

        let disarmed = state.disarm(name);
        debug_assert!(disarmed.is_ok(), "watchdog ledgers out of step for {name}");
        if let Err(err) = disarmed {
            tracing::error!(task = name, error = %err, "Watchdog ledgers out of step");
        }
        tracing::debug!(task = name, "Watchdog unregistered");

        self.rearm(state);
        true
    }

    /// Signal that `name` is alive, restarting both of its timeouts.
    ///
    /// Returns `false`, and logs the caller, if `name` is not registered.
    #[track_caller]
    pub fn ping(&self, name: &str) -> bool {
        let location = Location::caller();
        let mut guard = self.state.lock();
        let state = &mut *guard;

        let Some(thresholds) = state.tasks.get(name).map(|task| task.thresholds) else {
            tracing::warn!(
                task = name,
                caller = %self.call_sites.capture(location),
                "Ping of unknown watchdog"
            );
            return false;
        };

        let rearmed = state.rearm_existing(name, thresholds);
        debug_assert!(rearmed.is_ok(), "watchdog ledgers out of step for {name}");
        if let Err(err) = rearmed {
            tracing::error!(task = name, error = %err, "Watchdog ledgers out of step");
            return false;
        }

        let now = self.clock.now();
        let pinged_by = self
            .config
            .capture_ping_call_site
            .then(|| self.call_sites.capture(location));
        if let Some(task) = state.tasks.get_mut(name) {
            task.last_ping_at = Some(now);
            if pinged_by.is_some() {
                task.last_ping_by = pinged_by;
            }
        }

        self.rearm(state);
        true
    }

    /// Unregister every task and disarm the alarm. Returns how many were removed.
    pub fn unregister_all(&self) -> usize {
        let mut state = self.state.lock();
        let removed = state.tasks.len();
        state.tasks.clear();
        state.warning.clear();
        state.critical.clear();
        self.alarm.cancel();
        tracing::debug!(removed, "All watchdogs unregistered");
        removed
    }

    /// Fire the alarm if it is due and process expired timers.
    ///
    /// Returns `true` if the alarm fired. Only needed for monitors created
    /// with [`new`](Self::new); spawned monitors are driven by their thread.
    pub fn poll(&self) -> bool {
        if self.alarm.poll() {
            self.on_alarm();
            true
        } else {
            false
        }
    }

    fn on_alarm(&self) {
        let mut guard = self.state.lock();
        let state = &mut *guard;
        let now = self.clock.now();

        let critical = state.critical.expunge_expired();
        let warned: Vec<String> = state
            .warning
            .expunge_expired()
            .into_iter()
            .filter(|name| !critical.contains(name))
            .collect();

        for name in &warned {
            tracing::warn!(task = %name, now, "Watchdog warning timeout elapsed");
        }
        for name in &critical {
            tracing::error!(task = %name, now, "Watchdog critical timeout elapsed");
        }

        state.notify(StallLevel::Warning, &warned);
        state.notify(StallLevel::Critical, &critical);

        if !critical.is_empty() {
            let report = state.report(StallLevel::Critical, now, &critical);
            (state.critical_handler)(&report);
        } else if !warned.is_empty() {
            let report = state.report(StallLevel::Warning, now, &warned);
            (state.warning_handler)(&report);
        }

        self.rearm(state);
    }

    fn rearm(&self, state: &MonitorState) {
        self.alarm.set_delay(state.next_expiry_offset());
    }

    /// Subscribe to warning and critical notifications.
    ///
    /// The listener runs with the monitor lock held; see the module docs.
    pub fn subscribe<F>(&self, listener: F)
    where
        F: Fn(&WatchdogEvent) + Send + Sync + 'static,
    {
        self.state.lock().listeners.push(Arc::new(listener));
    }

    /// Replace the warning escalation handler.
    pub fn set_warning_handler<F>(&self, handler: F)
    where
        F: Fn(&StallReport) + Send + Sync + 'static,
    {
        self.state.lock().warning_handler = Arc::new(handler);
    }

    /// Replace the critical escalation handler (the default aborts the process).
    pub fn set_critical_handler<F>(&self, handler: F)
    where
        F: Fn(&StallReport) + Send + Sync + 'static,
    {
        self.state.lock().critical_handler = Arc::new(handler);
    }

    /// Time until the next timer across both tiers is due.
    #[must_use]
    pub fn next_expiry_offset(&self) -> Timeout {
        self.state.lock().next_expiry_offset()
    }

    /// Time until the next warning timer is due.
    #[must_use]
    pub fn warning_offset(&self) -> Timeout {
        self.state.lock().warning.next_expiry_offset()
    }

    /// Time until the next critical timer is due.
    #[must_use]
    pub fn critical_offset(&self) -> Timeout {
        self.state.lock().critical.next_expiry_offset()
    }

    /// Absolute deadline the alarm is currently armed for.
    #[must_use]
    pub fn alarm_deadline(&self) -> Option<i64> {
        self.alarm.deadline()
    }

    /// Whether `name` is registered.
    #[must_use]
    pub fn is_registered(&self, name: &str) -> bool {
        self.state.lock().tasks.contains_key(name)
    }

    /// Number of registered tasks.
    #[must_use]
    pub fn task_count(&self) -> usize {
        self.state.lock().tasks.len()
    }

    /// Snapshot of one task's record.
    #[must_use]
    pub fn task(&self, name: &str) -> Option<TaskRecord> {
        self.state.lock().tasks.get(name).cloned()
    }

    /// Snapshot of every task record, sorted by name.
    #[must_use]
    pub fn tasks(&self) -> Vec<TaskRecord> {
        let mut tasks: Vec<TaskRecord> = self.state.lock().tasks.values().cloned().collect();
        tasks.sort_by(|a, b| a.name.cmp(&b.name));
        tasks
    }

    /// Current liveness state of `name`, or `None` if not registered.
    #[must_use]
    pub fn status(&self, name: &str) -> Option<TaskStatus> {
        let state = self.state.lock();
        let task = state.tasks.get(name)?;
        let fired = |ledger: &TimerLedger, timeout: Timeout| {
            !timeout.is_infinite() && !ledger.is_enabled(name)
        };
        if fired(&state.critical, task.thresholds.critical) {
            Some(TaskStatus::Critical)
        } else if fired(&state.warning, task.thresholds.warning) {
            Some(TaskStatus::Warned)
        } else {
            Some(TaskStatus::Registered)
        }
    }

    /// The configuration this monitor was created with.
    #[must_use]
    pub fn config(&self) -> &WatchdogConfig {
        &self.config
    }
}

impl fmt::Debug for WatchdogMonitor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("WatchdogMonitor")
            .field("config", &self.config)
            .field("task_count", &state.tasks.len())
            .field("active_warnings", &state.warning.active_count())
            .field("active_criticals", &state.critical.active_count())
            .field("alarm", &self.alarm)
            .finish_non_exhaustive()
    }
}
