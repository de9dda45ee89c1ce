//! Error types for the watchdog monitor.
//!
//! The monitor's liveness operations are soft and report problems as `bool`
//! plus a log record. These errors cover the remaining hard failures:
//! configuration mistakes, driver start-up, and ledger inconsistencies that
//! can only come from a programming error.

use crashkit_timing::TimingError;
use thiserror::Error;

/// Errors that can occur during watchdog operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WatchdogError {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The underlying timer ledger or alarm reported a failure.
    #[error("Timer failure: {0}")]
    Timer(#[from] TimingError),

    /// Registration metadata and timer ledgers disagree about a task.
    #[error("Watchdog state inconsistent for task '{0}'")]
    Inconsistent(String),
}

impl WatchdogError {
    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration(reason.into())
    }

    /// Create an inconsistent state error.
    #[must_use]
    pub fn inconsistent(task: impl Into<String>) -> Self {
        Self::Inconsistent(task.into())
    }
}

/// A specialized `Result` type for watchdog operations.
pub type WatchdogResult<T> = std::result::Result<T, WatchdogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WatchdogError::invalid_configuration("override name is empty");
        assert!(err.to_string().contains("override name is empty"));

        let err = WatchdogError::inconsistent("ingest");
        assert!(err.to_string().contains("'ingest'"));
    }

    #[test]
    fn test_timer_errors_convert() {
        let err: WatchdogError = TimingError::duplicate_key("ingest").into();
        assert!(matches!(
            err,
            WatchdogError::Timer(TimingError::DuplicateKey(_))
        ));
    }
}
