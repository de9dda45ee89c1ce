//! Process-level diagnostics configuration.
//!
//! Loaded once at start-up from YAML or JSON and handed to
//! [`Diagnostics`](crate::Diagnostics). Every section is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crashkit_logbuffer::LogBufferConfig;
use crashkit_watchdog::WatchdogConfig;

use crate::error::{CrashkitError, CrashkitResult};

/// Filter used when neither `RUST_LOG` nor the configuration sets one.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Watchdog overrides and call-site capture.
    pub watchdog: WatchdogConfig,
    /// Log buffer limits.
    pub log_buffer: LogBufferConfig,
    /// Directory crash artifacts are written to; none disables them.
    pub crash_dir: Option<PathBuf>,
    /// `tracing` filter directive, overridden by `RUST_LOG`.
    pub log_filter: String,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            watchdog: WatchdogConfig::default(),
            log_buffer: LogBufferConfig::default(),
            crash_dir: None,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl DiagnosticsConfig {
    /// Parse YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`CrashkitError::Config`] on malformed input or invalid values.
    pub fn from_yaml_str(text: &str) -> CrashkitResult<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CrashkitError::Config`] on malformed input or invalid values.
    pub fn from_json_str(text: &str) -> CrashkitResult<Self> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| CrashkitError::config(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a file; `.json` is parsed as JSON, anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> CrashkitResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        tracing::debug!(path = %path.display(), json = is_json, "Loading diagnostics configuration");
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Validate the configuration.
    ///
    /// Log buffer limits are not checked here; invalid ones fall back to
    /// defaults when the buffer is built.
    ///
    /// # Errors
    ///
    /// Returns an error for an invalid watchdog section or an empty filter.
    pub fn validate(&self) -> CrashkitResult<()> {
        self.watchdog.validate()?;
        if self.log_filter.trim().is_empty() {
            return Err(CrashkitError::config("log_filter must not be empty"));
        }
        Ok(())
    }
}
