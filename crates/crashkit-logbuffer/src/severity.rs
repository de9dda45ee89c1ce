//! Log severities and their retention priority.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Severity of a buffered log entry, highest priority first.
///
/// Ordering follows retention priority: `Critical` is the greatest and
/// `Other` the least. `Other` catches anything that does not map onto the
/// five named levels (activity start/stop markers, transfers and the like)
/// and is the first bucket to give up entries under pressure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Unrecoverable failure.
    Critical,
    /// Recoverable error.
    Error,
    /// Something unexpected that did not fail.
    Warning,
    /// Informational message.
    Info,
    /// Debugging detail.
    Verbose,
    /// Anything else.
    Other,
}

impl Severity {
    /// Number of severities, and therefore of buffer buckets.
    pub const COUNT: usize = 6;

    /// Every severity from highest to lowest priority.
    pub const ALL: [Severity; Self::COUNT] = [
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
        Severity::Verbose,
        Severity::Other,
    ];

    /// Position in [`Severity::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Severity::Critical => 0,
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Verbose => 4,
            Severity::Other => 5,
        }
    }

    /// Canonical name used in dumps.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::Error => "Error",
            Severity::Warning => "Warning",
            Severity::Info => "Info",
            Severity::Verbose => "Verbose",
            Severity::Other => "Other",
        }
    }

    /// Map a level name onto a severity; unknown names become `Other`.
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "critical" | "fatal" => Severity::Critical,
            "error" => Severity::Error,
            "warning" | "warn" => Severity::Warning,
            "info" | "information" => Severity::Info,
            "verbose" | "debug" => Severity::Verbose,
            _ => Severity::Other,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Ord for Severity {
    fn cmp(&self, other: &Self) -> Ordering {
        other.index().cmp(&self.index())
    }
}

impl PartialOrd for Severity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<tracing::Level> for Severity {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::ERROR => Severity::Error,
            tracing::Level::WARN => Severity::Warning,
            tracing::Level::INFO => Severity::Info,
            tracing::Level::DEBUG => Severity::Verbose,
            tracing::Level::TRACE => Severity::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, severity) in Severity::ALL.iter().enumerate() {
            assert_eq!(severity.index(), i);
        }
    }

    #[test]
    fn test_parse_maps_unknown_to_other() {
        assert_eq!(Severity::parse("Information"), Severity::Info);
        assert_eq!(Severity::parse(" WARN "), Severity::Warning);
        assert_eq!(Severity::parse("fatal"), Severity::Critical);
        assert_eq!(Severity::parse("start"), Severity::Other);
        assert_eq!(Severity::parse("transfer"), Severity::Other);
    }

    #[test]
    fn test_tracing_levels() {
        assert_eq!(Severity::from(tracing::Level::ERROR), Severity::Error);
        assert_eq!(Severity::from(tracing::Level::DEBUG), Severity::Verbose);
        assert_eq!(Severity::from(tracing::Level::TRACE), Severity::Other);
    }

    #[test]
    fn test_priority_ordering() {
        assert!(Severity::Critical > Severity::Error);
        assert!(Severity::Verbose > Severity::Other);
        assert_eq!(Severity::ALL.iter().max(), Some(&Severity::Critical));
        assert!(Severity::ALL.windows(2).all(|pair| pair[0] > pair[1]));
    }
}
