//! Task records, stall notifications and escalation handlers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::call_site::CallSite;
use crate::config::Thresholds;

/// Which threshold tier a notification belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StallLevel {
    /// The warning timeout elapsed without a ping.
    Warning,
    /// The critical timeout elapsed without a ping.
    Critical,
}

impl fmt::Display for StallLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StallLevel::Warning => f.write_str("warning"),
            StallLevel::Critical => f.write_str("critical"),
        }
    }
}

/// Liveness state of a registered task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    /// Registered and pinging within its thresholds.
    Registered,
    /// The warning timeout elapsed since the last ping.
    Warned,
    /// The critical timeout elapsed since the last ping.
    Critical,
}

/// Everything the monitor knows about one registered task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Task name.
    pub name: String,
    /// Effective thresholds, after overrides.
    pub thresholds: Thresholds,
    /// Clock reading at registration.
    pub registered_at: i64,
    /// Who registered the task.
    pub registered_by: CallSite,
    /// Clock reading at the most recent ping.
    pub last_ping_at: Option<i64>,
    /// Who sent the most recent ping, when capture is enabled.
    pub last_ping_by: Option<CallSite>,
}

impl TaskRecord {
    /// Clock reading of the last sign of life (ping or registration).
    #[must_use]
    pub fn last_seen(&self) -> i64 {
        self.last_ping_at.unwrap_or(self.registered_at)
    }
}

/// Notification delivered to subscribers when timers fire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchdogEvent {
    /// Tier that fired.
    pub level: StallLevel,
    /// Names of the tasks that fired, in expiry order.
    pub tasks: Vec<String>,
}

/// Input to a warning or critical handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StallReport {
    /// Tier that fired.
    pub level: StallLevel,
    /// Clock reading when the stall was detected.
    pub detected_at: i64,
    /// Records of the stalled tasks, in expiry order.
    pub tasks: Vec<TaskRecord>,
}

impl StallReport {
    /// Names of the stalled tasks.
    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.tasks.iter().map(|task| task.name.as_str())
    }
}

/// Subscriber callback for [`WatchdogEvent`]s.
pub type EventListener = Arc<dyn Fn(&WatchdogEvent) + Send + Sync>;

/// Escalation callback invoked once per alarm with the stalled tasks.
pub type StallHandler = Arc<dyn Fn(&StallReport) + Send + Sync>;

/// Default warning escalation: log the report and keep running.
pub fn log_stall_report(report: &StallReport) {
    for task in &report.tasks {
        tracing::warn!(
            task = %task.name,
            level = %report.level,
            detected_at = report.detected_at,
            last_seen = task.last_seen(),
            last_ping_by = %task.last_ping_by.as_ref().unwrap_or(&task.registered_by),
            "Watchdog stall report"
        );
    }
}

/// Default critical escalation: log the report and abort the process.
///
/// Termination is deliberate and final; nothing is retried.
pub fn abort_on_stall(report: &StallReport) {
    for task in &report.tasks {
        tracing::error!(
            task = %task.name,
            detected_at = report.detected_at,
            last_seen = task.last_seen(),
            registered_by = %task.registered_by,
            "Watchdog critical stall, aborting process"
        );
    }
    std::process::abort();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, registered_at: i64, last_ping_at: Option<i64>) -> TaskRecord {
        TaskRecord {
            name: name.to_string(),
            thresholds: Thresholds::from_millis(10, 20),
            registered_at,
            registered_by: CallSite::default(),
            last_ping_at,
            last_ping_by: None,
        }
    }

    #[test]
    fn test_last_seen_prefers_ping() {
        assert_eq!(record("a", 5, None).last_seen(), 5);
        assert_eq!(record("a", 5, Some(40)).last_seen(), 40);
    }

    #[test]
    fn test_report_task_names() {
        let report = StallReport {
            level: StallLevel::Warning,
            detected_at: 100,
            tasks: vec![record("a", 0, None), record("b", 0, Some(3))],
        };
        assert_eq!(report.task_names().collect::<Vec<_>>(), vec!["a", "b"]);
        log_stall_report(&report);
    }

    #[test]
    fn test_level_display() {
        assert_eq!(StallLevel::Warning.to_string(), "warning");
        assert_eq!(StallLevel::Critical.to_string(), "critical");
    }
}
