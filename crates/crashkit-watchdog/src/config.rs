//! Watchdog configuration.
//!
//! Configuration is owned by the embedding application and read-only to the
//! monitor. It carries a per-task override table, consulted on every
//! registration, and the switch controlling call-site capture on ping.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crashkit_timing::Timeout;

use crate::error::{WatchdogError, WatchdogResult};

/// Warning and critical timeouts for one task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Thresholds {
    /// Silence after which a warning is raised.
    #[serde(rename = "warning_ms")]
    pub warning: Timeout,
    /// Silence after which the task is considered hung.
    #[serde(rename = "critical_ms")]
    pub critical: Timeout,
}

impl Thresholds {
    /// Create thresholds from two timeouts.
    #[must_use]
    pub fn new(warning: Timeout, critical: Timeout) -> Self {
        Self { warning, critical }
    }

    /// Create thresholds from signed millisecond counts; negatives disable a tier.
    #[must_use]
    pub fn from_millis(warning_ms: i64, critical_ms: i64) -> Self {
        Self::new(Timeout::from_millis(warning_ms), Timeout::from_millis(critical_ms))
    }

    /// The earlier of the two timeouts.
    #[must_use]
    pub fn earliest(&self) -> Timeout {
        self.warning.min(self.critical)
    }
}

/// Configuration for [`WatchdogMonitor`](crate::WatchdogMonitor).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchdogConfig {
    /// Per-task replacement thresholds, keyed by task name.
    pub overrides: HashMap<String, Thresholds>,
    /// Record the caller's location on every ping.
    pub capture_ping_call_site: bool,
}

impl WatchdogConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an override has an empty task name.
    pub fn validate(&self) -> WatchdogResult<()> {
        if self.overrides.keys().any(String::is_empty) {
            return Err(WatchdogError::invalid_configuration(
                "override task names must not be empty",
            ));
        }
        Ok(())
    }

    /// Override thresholds configured for `task`, if any.
    #[must_use]
    pub fn thresholds_for(&self, task: &str) -> Option<Thresholds> {
        self.overrides.get(task).copied()
    }

    /// Create a configuration builder.
    #[must_use]
    pub fn builder() -> WatchdogConfigBuilder {
        WatchdogConfigBuilder::default()
    }
}

/// Builder for `WatchdogConfig`.
#[derive(Debug, Default)]
pub struct WatchdogConfigBuilder {
    config: WatchdogConfig,
}

impl WatchdogConfigBuilder {
    /// Replace the thresholds requested for `task` at registration time.
    #[must_use]
    pub fn override_thresholds(mut self, task: impl Into<String>, thresholds: Thresholds) -> Self {
        self.config.overrides.insert(task.into(), thresholds);
        self
    }

    /// Enable or disable call-site capture on ping.
    #[must_use]
    pub fn capture_ping_call_site(mut self, enabled: bool) -> Self {
        self.config.capture_ping_call_site = enabled;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> WatchdogResult<WatchdogConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
