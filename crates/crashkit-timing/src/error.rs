//! Error types for the timing primitives.
//!
//! The timer ledger is strict: duplicate keys, unknown keys and malformed
//! names are programmer mistakes and surface as typed errors.

use thiserror::Error;

/// Errors raised by [`TimerLedger`](crate::ledger::TimerLedger) and the alarm driver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimingError {
    /// An entry with the same name already exists in the ledger.
    #[error("Duplicate timer key: {0}")]
    DuplicateKey(String),

    /// No entry with the given name exists in the ledger.
    #[error("Timer key not found: {0}")]
    NotFound(String),

    /// The argument is malformed (for example an empty name).
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The alarm driver thread could not be started.
    #[error("Alarm driver failed: {0}")]
    DriverFailed(String),
}

impl TimingError {
    /// Create a duplicate key error.
    #[must_use]
    pub fn duplicate_key(name: impl Into<String>) -> Self {
        Self::DuplicateKey(name.into())
    }

    /// Create a not found error.
    #[must_use]
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create an invalid argument error.
    #[must_use]
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    /// Create a driver failure error.
    #[must_use]
    pub fn driver_failed(reason: impl Into<String>) -> Self {
        Self::DriverFailed(reason.into())
    }
}

/// A specialized `Result` type for timing operations.
pub type TimingResult<T> = std::result::Result<T, TimingError>;
