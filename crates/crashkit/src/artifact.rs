//! Crash artifacts: a stall report plus the buffered log, written as JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crashkit_logbuffer::{DumpSource, DumpTable, LOG_TABLE, MemoryDumpWriter, SharedLogBuffer};
use crashkit_watchdog::StallReport;

use crate::error::{CrashkitError, CrashkitResult};

/// Contents of one crash artifact file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrashArtifact {
    /// Artifact kind, e.g. `warning` or `critical`.
    pub kind: String,
    /// Wall-clock time the artifact was produced.
    pub written_at: DateTime<Utc>,
    /// The stall that triggered it.
    pub report: StallReport,
    /// The exported log buffer.
    pub log: DumpTable,
}

/// Writes crash artifacts for a log buffer into a directory.
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    buffer: SharedLogBuffer,
    crash_dir: Option<PathBuf>,
}

impl ArtifactWriter {
    /// Writer exporting `buffer` into `crash_dir`; `None` disables writing.
    #[must_use]
    pub fn new(buffer: SharedLogBuffer, crash_dir: Option<PathBuf>) -> Self {
        Self { buffer, crash_dir }
    }

    /// Target directory, if artifacts are enabled.
    #[must_use]
    pub fn crash_dir(&self) -> Option<&Path> {
        self.crash_dir.as_deref()
    }

    /// Assemble an artifact without writing it.
    ///
    /// # Errors
    ///
    /// Returns an error if the log buffer cannot be exported.
    pub fn collect(&self, kind: &str, report: &StallReport) -> CrashkitResult<CrashArtifact> {
        let mut writer = MemoryDumpWriter::new();
        self.buffer.export(&mut writer)?;
        let log = writer
            .into_tables()
            .into_iter()
            .find(|table| table.name == LOG_TABLE)
            .unwrap_or_default();
        Ok(CrashArtifact {
            kind: kind.to_string(),
            written_at: Utc::now(),
            report: report.clone(),
            log,
        })
    }

    /// Write `crashkit-<kind>-<unix_ms>.json` into the crash directory.
    ///
    /// Returns `None` when no crash directory is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the artifact cannot be collected, serialized or written.
    pub fn write(&self, kind: &str, report: &StallReport) -> CrashkitResult<Option<PathBuf>> {
        let Some(dir) = self.crash_dir.as_deref() else {
            return Ok(None);
        };
        if kind.is_empty() || kind.contains(['/', '\\']) {
            return Err(CrashkitError::config(format!("invalid artifact kind '{kind}'")));
        }

        let artifact = self.collect(kind, report)?;
        fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "crashkit-{kind}-{}.json",
            artifact.written_at.timestamp_millis()
        ));
        let json = serde_json::to_vec_pretty(&artifact)?;
        fs::write(&path, json)?;

        tracing::info!(
            path = %path.display(),
            kind,
            tasks = artifact.report.tasks.len(),
            log_rows = artifact.log.rows.len(),
            "Crash artifact written"
        );
        Ok(Some(path))
    }
}
