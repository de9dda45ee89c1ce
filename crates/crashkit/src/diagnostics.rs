//! Process-wide wiring of clock, watchdog, log buffer and crash artifacts.
//!
//! [`Diagnostics`] is built once at start-up and passed by reference to the
//! code that registers tasks or logs. Nothing here is a global; tests build
//! as many independent instances as they like.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crashkit_logbuffer::{LogBufferLayer, SharedLogBuffer};
use crashkit_timing::{MonotonicClock, SharedClock};
use crashkit_watchdog::{StallReport, WatchdogMonitor, abort_on_stall, log_stall_report};

use crate::artifact::ArtifactWriter;
use crate::config::DiagnosticsConfig;
use crate::error::CrashkitResult;
use crate::logging;

/// Artifact kind written for warning stalls.
pub const WARNING_ARTIFACT: &str = "warning";

/// Artifact kind written for critical stalls.
pub const CRITICAL_ARTIFACT: &str = "critical";

/// The assembled diagnostics toolkit.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    config: DiagnosticsConfig,
    clock: SharedClock,
    monitor: Arc<WatchdogMonitor>,
    buffer: SharedLogBuffer,
    artifacts: ArtifactWriter,
}

impl Diagnostics {
    /// Build everything on the system clock with a running watchdog driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the driver thread
    /// cannot be started.
    pub fn start(config: DiagnosticsConfig) -> CrashkitResult<Self> {
        let clock: SharedClock = Arc::new(MonotonicClock::system());
        config.validate()?;
        let monitor = WatchdogMonitor::spawn(Arc::clone(&clock), config.watchdog.clone())?;
        Ok(Self::assemble(config, clock, monitor))
    }

    /// Build everything on `clock` with a manually polled watchdog.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn manual(config: DiagnosticsConfig, clock: SharedClock) -> CrashkitResult<Self> {
        config.validate()?;
        let monitor = Arc::new(WatchdogMonitor::new(
            Arc::clone(&clock),
            config.watchdog.clone(),
        ));
        Ok(Self::assemble(config, clock, monitor))
    }

    fn assemble(config: DiagnosticsConfig, clock: SharedClock, monitor: Arc<WatchdogMonitor>) -> Self {
        let buffer = SharedLogBuffer::new(config.log_buffer.build(clock.as_ref()));
        let artifacts = ArtifactWriter::new(buffer.clone(), config.crash_dir.clone());
        let capacity = buffer.lock().total_capacity();
        tracing::debug!(
            capacity,
            crash_dir = ?config.crash_dir,
            "Diagnostics assembled"
        );
        Self {
            config,
            clock,
            monitor,
            buffer,
            artifacts,
        }
    }

    /// Install handlers that write crash artifacts on stalls.
    ///
    /// Warnings write a `warning` artifact and the process continues.
    /// Criticals write a `critical` artifact and then abort the process.
    pub fn install_default_handlers(&self) {
        let artifacts = self.artifacts.clone();
        self.monitor.set_warning_handler(move |report| {
            log_stall_report(report);
            write_or_log(&artifacts, WARNING_ARTIFACT, report);
        });

        let artifacts = self.artifacts.clone();
        self.monitor.set_critical_handler(move |report| {
            write_or_log(&artifacts, CRITICAL_ARTIFACT, report);
            abort_on_stall(report);
        });
    }

    /// Write a crash artifact for `report` now.
    ///
    /// Returns the file written, or `None` when no crash directory is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be written.
    pub fn write_crash_artifact(
        &self,
        kind: &str,
        report: &StallReport,
    ) -> CrashkitResult<Option<PathBuf>> {
        self.artifacts.write(kind, report)
    }

    /// A `tracing` layer feeding this instance's log buffer.
    #[must_use]
    pub fn log_layer(&self) -> LogBufferLayer {
        LogBufferLayer::new(self.buffer.clone(), Arc::clone(&self.clock))
    }

    /// Install the global subscriber with this instance's buffer and filter.
    ///
    /// # Errors
    ///
    /// Returns an error if the filter is invalid or a global subscriber is
    /// already installed.
    pub fn init_logging(&self) -> CrashkitResult<()> {
        logging::init_logging(&self.config.log_filter, self.log_layer())
    }

    /// Unregister every task, e.g. during orderly shutdown.
    pub fn shutdown(&self) -> usize {
        let removed = self.monitor.unregister_all();
        tracing::info!(removed, "Diagnostics shut down");
        removed
    }

    /// The shared clock.
    #[must_use]
    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    /// The watchdog monitor.
    #[must_use]
    pub fn monitor(&self) -> &Arc<WatchdogMonitor> {
        &self.monitor
    }

    /// The shared log buffer.
    #[must_use]
    pub fn buffer(&self) -> &SharedLogBuffer {
        &self.buffer
    }

    /// Crash artifact directory, if configured.
    #[must_use]
    pub fn crash_dir(&self) -> Option<&Path> {
        self.artifacts.crash_dir()
    }

    /// The configuration this instance was built from.
    #[must_use]
    pub fn config(&self) -> &DiagnosticsConfig {
        &self.config
    }
}

fn write_or_log(artifacts: &ArtifactWriter, kind: &str, report: &StallReport) {
    if let Err(err) = artifacts.write(kind, report) {
        tracing::error!(error = %err, kind, "Failed to write crash artifact");
    }
}
