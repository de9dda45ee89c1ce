//! # crashkit
//!
//! In-process hang detection and crash diagnostics.
//!
//! This crate wires the building blocks together:
//!
//! - [`crashkit_timing`] - monotonic clock, timer ledger and alarm
//! - [`crashkit_watchdog`] - dual-threshold liveness monitor for named tasks
//! - [`crashkit_logbuffer`] - severity-prioritized log buffer with dump export
//!
//! and adds the process-level pieces: [`DiagnosticsConfig`] loaded from YAML
//! or JSON, global logging that feeds the buffer, and crash artifacts written
//! when the watchdog detects a stall.
//!
//! ## Example
//!
//! ```rust,no_run
//! use crashkit::prelude::*;
//!
//! # fn main() -> CrashkitResult<()> {
//! let config = DiagnosticsConfig::from_yaml_str("crash_dir: /tmp/crashes\n")?;
//! let diagnostics = Diagnostics::start(config)?;
//! diagnostics.init_logging()?;
//! diagnostics.install_default_handlers();
//!
//! let monitor = diagnostics.monitor();
//! monitor.register("ingest", Timeout::Millis(2_000), Timeout::Millis(30_000));
//! loop {
//!     // ... do work ...
//!     monitor.ping("ingest");
//! #   break;
//! }
//! # Ok(())
//! # }
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod artifact;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod logging;

pub mod prelude;

pub use artifact::{ArtifactWriter, CrashArtifact};
pub use config::{DEFAULT_LOG_FILTER, DiagnosticsConfig};
pub use diagnostics::{CRITICAL_ARTIFACT, Diagnostics, WARNING_ARTIFACT};
pub use error::{CrashkitError, CrashkitResult};
pub use logging::{env_filter, init_logging};

pub use crashkit_logbuffer;
pub use crashkit_timing;
pub use crashkit_watchdog;
