//! Prelude for crashkit.

pub use crate::config::DiagnosticsConfig;
pub use crate::diagnostics::Diagnostics;
pub use crate::error::{CrashkitError, CrashkitResult};
pub use crashkit_logbuffer::{LogEntry, MergeKey, PriorityLogBuffer, Severity, SharedLogBuffer};
pub use crashkit_timing::{Clock, MonotonicClock, SharedClock, Timeout, VirtualClock};
pub use crashkit_watchdog::{StallLevel, StallReport, WatchdogConfig, WatchdogMonitor};
