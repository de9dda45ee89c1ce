//! Prelude for crashkit-watchdog.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use crashkit_watchdog::prelude::*;
//!
//! let monitor = WatchdogMonitor::new(VirtualClock::shared(0), WatchdogConfig::default());
//! monitor.register("worker", Timeout::Millis(100), Timeout::Infinite);
//! monitor.ping("worker");
//! ```

pub use crate::call_site::{CallSite, CallSiteCapture};
pub use crate::config::{Thresholds, WatchdogConfig, WatchdogConfigBuilder};
pub use crate::error::{WatchdogError, WatchdogResult};
pub use crate::monitor::WatchdogMonitor;
pub use crate::report::{StallLevel, StallReport, TaskRecord, TaskStatus, WatchdogEvent};
pub use crashkit_timing::{Clock, MonotonicClock, SharedClock, Timeout, VirtualClock};
