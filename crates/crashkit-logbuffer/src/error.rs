//! Log buffer error types
//!
//! Covers buffer configuration, the unsupported removal operation, and dump
//! export failures.

use thiserror::Error;

use crate::severity::Severity;

/// Log buffer operation error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LogBufferError {
    /// A bucket minimum was negative
    #[error("Invalid minimum for {severity}: {value}")]
    InvalidMinimum {
        /// Bucket being configured
        severity: Severity,
        /// Rejected value
        value: i64,
    },

    /// The total capacity was negative
    #[error("Invalid total capacity: {0}")]
    InvalidCapacity(i64),

    /// Entries cannot be removed individually
    #[error("Log buffer entries cannot be removed individually")]
    RemovalUnsupported,

    /// The dump writer rejected data
    #[error("Dump export error: {0}")]
    Export(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for LogBufferError {
    fn from(err: std::io::Error) -> Self {
        LogBufferError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for LogBufferError {
    fn from(err: serde_json::Error) -> Self {
        LogBufferError::Serialization(err.to_string())
    }
}

/// Result type for log buffer operations
pub type LogBufferResult<T> = Result<T, LogBufferError>;
