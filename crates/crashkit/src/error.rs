//! Facade error types.

use crashkit_logbuffer::LogBufferError;
use crashkit_watchdog::WatchdogError;
use thiserror::Error;

/// Errors surfaced by the crashkit facade.
#[derive(Debug, Error)]
pub enum CrashkitError {
    /// Watchdog configuration or driver failure.
    #[error(transparent)]
    Watchdog(#[from] WatchdogError),

    /// Log buffer or dump export failure.
    #[error(transparent)]
    LogBuffer(#[from] LogBufferError),

    /// Configuration text could not be parsed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Global logging could not be installed.
    #[error("Logging setup failed: {0}")]
    Logging(String),

    /// Filesystem error while reading configuration or writing artifacts.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Crash artifact serialization failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl CrashkitError {
    /// Create a configuration error.
    #[must_use]
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config(reason.into())
    }

    /// Create a logging setup error.
    #[must_use]
    pub fn logging(reason: impl Into<String>) -> Self {
        Self::Logging(reason.into())
    }
}

impl From<serde_yaml::Error> for CrashkitError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Config(err.to_string())
    }
}

/// A specialized `Result` type for facade operations.
pub type CrashkitResult<T> = std::result::Result<T, CrashkitError>;
