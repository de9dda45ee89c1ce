//! Buffered log entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

/// One log record held by the buffer.
///
/// Built once with [`LogEntry::new`] and the `with_*` methods, then read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    clock: i64,
    severity: Severity,
    id: i64,
    source: String,
    timestamp: Option<DateTime<Utc>>,
    thread_id: Option<String>,
    message: String,
}

impl LogEntry {
    /// Create an entry stamped with a monotonic `clock` reading.
    pub fn new(clock: i64, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            clock,
            severity,
            id: 0,
            source: String::new(),
            timestamp: None,
            thread_id: None,
            message: message.into(),
        }
    }

    /// Set the event id.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Set the emitting source.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Set the wall-clock time.
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Set the emitting thread.
    #[must_use]
    pub fn with_thread_id(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// Monotonic clock reading at creation.
    #[must_use]
    pub fn clock(&self) -> i64 {
        self.clock
    }

    /// Severity bucket.
    #[must_use]
    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// Event id.
    #[must_use]
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Emitting source; may be empty.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Wall-clock time, when the producer supplied one.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    /// Emitting thread, when known.
    #[must_use]
    pub fn thread_id(&self) -> Option<&str> {
        self.thread_id.as_deref()
    }

    /// Message text.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}
