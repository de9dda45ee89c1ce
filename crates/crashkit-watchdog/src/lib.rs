//! # crashkit-watchdog
//!
//! Detects stalled or hung logical tasks inside a process.
//!
//! Every task registers with a *warning* and a *critical* timeout and pings
//! while it is healthy. When a task goes quiet for longer than a threshold,
//! the monitor notifies subscribers and escalates: warnings are logged by
//! default, criticals abort the process so a crash report can be collected.
//!
//! ## Architecture
//!
//! - [`monitor`] - [`WatchdogMonitor`], the register/ping/unregister surface
//! - [`config`] - [`WatchdogConfig`] with per-task [`Thresholds`] overrides
//! - [`report`] - task records, [`WatchdogEvent`] notifications, [`StallReport`] handlers
//! - [`call_site`] - pluggable call-site capture for diagnostics
//! - [`error`] - [`WatchdogError`]
//!
//! Timing primitives live in `crashkit-timing` and are re-exported here.
//!
//! ## Soft failures
//!
//! Registering a name twice, or pinging/unregistering an unknown name, are
//! expected races during start-up and shutdown. They return `false` and log a
//! warning; they never panic or return an error.
//!
//! ## Example
//!
//! ```rust
//! use crashkit_watchdog::prelude::*;
//!
//! let clock = VirtualClock::shared(0);
//! let monitor = WatchdogMonitor::new(clock.clone(), WatchdogConfig::default());
//! monitor.set_critical_handler(|report| {
//!     eprintln!("hung: {:?}", report.task_names().collect::<Vec<_>>());
//! });
//!
//! assert!(monitor.register("ingest", Timeout::Millis(1_000), Timeout::Millis(5_000)));
//! assert!(!monitor.register("ingest", Timeout::Millis(1_000), Timeout::Millis(5_000)));
//!
//! clock.advance(500);
//! assert!(monitor.ping("ingest"));
//! assert_eq!(monitor.next_expiry_offset(), Timeout::Millis(1_000));
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod call_site;
pub mod config;
pub mod error;
pub mod monitor;
pub mod report;

pub mod prelude;

pub use call_site::{BacktraceCapture, CallSite, CallSiteCapture, CallerLocation, NoCallSite};
pub use config::{Thresholds, WatchdogConfig, WatchdogConfigBuilder};
pub use error::{WatchdogError, WatchdogResult};
pub use monitor::WatchdogMonitor;
pub use report::{
    EventListener, StallHandler, StallLevel, StallReport, TaskRecord, TaskStatus, WatchdogEvent,
    abort_on_stall, log_stall_report,
};

// Re-export timing primitives for convenience
pub use crashkit_timing::{Clock, MonotonicClock, SharedClock, Timeout, VirtualClock};
