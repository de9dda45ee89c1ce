//! Call-site identity for diagnostics.
//!
//! Registrations and pings remember *where* they came from so a stall report
//! can point at the code that last showed signs of life. Monitor entry points
//! are `#[track_caller]`, and the captured [`Location`] is turned into a
//! [`CallSite`] by a pluggable [`CallSiteCapture`].

use serde::{Deserialize, Serialize};
use std::backtrace::Backtrace;
use std::fmt;
use std::panic::Location;
use std::thread;

/// Where and on which thread an operation was invoked.
///
/// Both fields are opaque text and may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// Source location or stack text.
    pub location: String,
    /// Name and id of the calling thread.
    pub thread: String,
}

impl CallSite {
    /// Whether nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.location.is_empty() && self.thread.is_empty()
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.location.is_empty(), self.thread.is_empty()) {
            (true, true) => f.write_str("<unknown>"),
            (false, true) => f.write_str(&self.location),
            (true, false) => write!(f, "[{}]", self.thread),
            (false, false) => write!(f, "{} [{}]", self.location, self.thread),
        }
    }
}

/// Turns a caller location into a [`CallSite`].
pub trait CallSiteCapture: Send + Sync + fmt::Debug {
    /// Capture the identity of the current call.
    fn capture(&self, location: &'static Location<'static>) -> CallSite;
}

fn current_thread() -> String {
    let current = thread::current();
    match current.name() {
        Some(name) => format!("{name} ({:?})", current.id()),
        None => format!("{:?}", current.id()),
    }
}

/// Records `file:line:column` and the current thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct CallerLocation;

impl CallSiteCapture for CallerLocation {
    fn capture(&self, location: &'static Location<'static>) -> CallSite {
        CallSite {
            location: location.to_string(),
            thread: current_thread(),
        }
    }
}

/// Records a full backtrace when `RUST_BACKTRACE`/`RUST_LIB_BACKTRACE` enable
/// it, falling back to the caller location otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct BacktraceCapture;

impl CallSiteCapture for BacktraceCapture {
    fn capture(&self, location: &'static Location<'static>) -> CallSite {
        let backtrace = Backtrace::capture();
        let location = match backtrace.status() {
            std::backtrace::BacktraceStatus::Captured => backtrace.to_string(),
            _ => location.to_string(),
        };
        CallSite {
            location,
            thread: current_thread(),
        }
    }
}

/// Captures nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCallSite;

impl CallSiteCapture for NoCallSite {
    fn capture(&self, _location: &'static Location<'static>) -> CallSite {
        CallSite::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[track_caller]
    fn capture_here(capture: &dyn CallSiteCapture) -> CallSite {
        capture.capture(Location::caller())
    }

    #[test]
    fn test_caller_location_points_at_caller() {
        let site = capture_here(&CallerLocation);
        assert!(site.location.contains("call_site.rs"));
        assert!(!site.thread.is_empty());
    }

    #[test]
    fn test_no_call_site_is_empty() {
        let site = capture_here(&NoCallSite);
        assert!(site.is_empty());
        assert_eq!(site.to_string(), "<unknown>");
    }

    #[test]
    fn test_named_thread_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let site = thread::Builder::new()
            .name("pinger".into())
            .spawn(|| capture_here(&CallerLocation))?
            .join()
            .map_err(|_| "capture thread panicked")?;
        assert!(site.thread.starts_with("pinger"));
        assert!(site.to_string().contains("[pinger"));
        Ok(())
    }

    #[test]
    fn test_backtrace_capture_never_empty() {
        let site = capture_here(&BacktraceCapture);
        assert!(!site.location.is_empty());
    }
}
