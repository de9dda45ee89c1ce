//! Log buffer configuration.
//!
//! Limits arrive as signed integers from an external source. Anything
//! non-positive is replaced by its default and recorded as a warning entry so
//! the fallback itself shows up in the next dump.

use serde::{Deserialize, Serialize};

use crashkit_timing::Clock;

use crate::buffer::{DEFAULT_MINIMUM, DEFAULT_TOTAL, MergeKey, PriorityLogBuffer};
use crate::entry::LogEntry;
use crate::error::LogBufferError;
use crate::severity::Severity;

/// Source recorded on fallback diagnostics.
pub const CONFIG_SOURCE: &str = "crashkit-logbuffer";

/// Per-severity minimums and total capacity as supplied by configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogBufferConfig {
    /// Guaranteed critical entries.
    pub critical: i64,
    /// Guaranteed error entries.
    pub error: i64,
    /// Guaranteed warning entries.
    pub warning: i64,
    /// Guaranteed info entries.
    pub info: i64,
    /// Guaranteed verbose entries.
    pub verbose: i64,
    /// Guaranteed entries of any other severity.
    pub other: i64,
    /// Total capacity.
    pub total: i64,
    /// Enumeration order.
    pub merge_key: MergeKey,
}

impl Default for LogBufferConfig {
    fn default() -> Self {
        let minimum = i64::try_from(DEFAULT_MINIMUM).unwrap_or(i64::MAX);
        Self {
            critical: minimum,
            error: minimum,
            warning: minimum,
            info: minimum,
            verbose: minimum,
            other: minimum,
            total: i64::try_from(DEFAULT_TOTAL).unwrap_or(i64::MAX),
            merge_key: MergeKey::default(),
        }
    }
}

/// A configured buffer plus the diagnostics produced while configuring it.
#[derive(Debug, Clone)]
pub struct ResolvedLogBuffer {
    /// Buffer with every accepted or substituted limit applied.
    pub buffer: PriorityLogBuffer,
    /// One warning entry per rejected value.
    pub diagnostics: Vec<LogEntry>,
}

impl LogBufferConfig {
    /// Configured minimum for one severity.
    #[must_use]
    pub fn minimum_for(&self, severity: Severity) -> i64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::Error => self.error,
            Severity::Warning => self.warning,
            Severity::Info => self.info,
            Severity::Verbose => self.verbose,
            Severity::Other => self.other,
        }
    }

    /// Apply the limits to a new buffer, substituting defaults for
    /// non-positive values.
    ///
    /// Diagnostics are stamped with `clock` but not inserted.
    #[must_use]
    pub fn resolve(&self, clock: &dyn Clock) -> ResolvedLogBuffer {
        let mut buffer =
            PriorityLogBuffer::with_limits([0; Severity::COUNT], 0).with_merge_key(self.merge_key);
        let mut diagnostics = Vec::new();

        for severity in Severity::ALL {
            let value = self.minimum_for(severity);
            let applied = if value > 0 {
                buffer.set_minimum(severity, value)
            } else {
                Err(LogBufferError::InvalidMinimum { severity, value })
            };
            if let Err(err) = applied {
                buffer.apply_minimum(severity, DEFAULT_MINIMUM);
                diagnostics.push(fallback_entry(clock, &err, DEFAULT_MINIMUM));
            }
        }

        let applied = if self.total > 0 {
            buffer.set_total_capacity(self.total)
        } else {
            Err(LogBufferError::InvalidCapacity(self.total))
        };
        if let Err(err) = applied {
            buffer.apply_total(DEFAULT_TOTAL);
            diagnostics.push(fallback_entry(clock, &err, DEFAULT_TOTAL));
        }

        ResolvedLogBuffer {
            buffer,
            diagnostics,
        }
    }

    /// [`resolve`](Self::resolve) and insert the diagnostics into the buffer.
    #[must_use]
    pub fn build(&self, clock: &dyn Clock) -> PriorityLogBuffer {
        let ResolvedLogBuffer {
            mut buffer,
            diagnostics,
        } = self.resolve(clock);
        buffer.extend(diagnostics);
        buffer
    }
}

fn fallback_entry(clock: &dyn Clock, err: &LogBufferError, default: usize) -> LogEntry {
    tracing::warn!(error = %err, default, "Rejected log buffer limit, using default");
    LogEntry::new(
        clock.now(),
        Severity::Warning,
        format!("{err}; using default {default}"),
    )
    .with_source(CONFIG_SOURCE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crashkit_timing::VirtualClock;

    #[test]
    fn test_defaults_resolve_cleanly() {
        let clock = VirtualClock::new(0);
        let resolved = LogBufferConfig::default().resolve(&clock);
        assert!(resolved.diagnostics.is_empty());
        assert_eq!(resolved.buffer.total_capacity(), 1000);
        assert_eq!(resolved.buffer.minimum(Severity::Verbose), 100);
    }

    #[test]
    fn test_non_positive_values_fall_back() {
        let clock = VirtualClock::new(77);
        let config = LogBufferConfig {
            critical: 5,
            error: 0,
            info: -3,
            total: -1,
            ..LogBufferConfig::default()
        };
        let resolved = config.resolve(&clock);

        assert_eq!(resolved.buffer.minimum(Severity::Critical), 5);
        assert_eq!(resolved.buffer.minimum(Severity::Error), 100);
        assert_eq!(resolved.buffer.minimum(Severity::Info), 100);
        assert_eq!(resolved.buffer.total_capacity(), 1000);
        assert_eq!(resolved.diagnostics.len(), 3);
        for entry in &resolved.diagnostics {
            assert_eq!(entry.severity(), Severity::Warning);
            assert_eq!(entry.source(), CONFIG_SOURCE);
            assert_eq!(entry.clock(), 77);
        }
        assert!(
            resolved
                .diagnostics
                .iter()
                .any(|entry| entry.message().contains("Info: -3"))
        );
    }

    #[test]
    fn test_build_inserts_diagnostics() {
        let clock = VirtualClock::new(0);
        let config = LogBufferConfig {
            verbose: 0,
            ..LogBufferConfig::default()
        };
        let buffer = config.build(&clock);
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.bucket_len(Severity::Warning), 1);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() -> Result<(), serde_json::Error> {
        let config: LogBufferConfig =
            serde_json::from_str(r#"{"critical": 10, "total": 50, "merge_key": "clock"}"#)?;
        assert_eq!(config.critical, 10);
        assert_eq!(config.total, 50);
        assert_eq!(config.info, 100);
        assert_eq!(config.merge_key, MergeKey::Clock);
        Ok(())
    }
}
