//! Pull-based dump export.
//!
//! A [`DumpSource`] pushes one named table (header plus rows) into a
//! [`DumpWriter`]. The writer owns formatting and the output's lifecycle;
//! sources only supply data and signal `flush` when done.

use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::buffer::PriorityLogBuffer;
use crate::entry::LogEntry;
use crate::error::{LogBufferError, LogBufferResult};

/// Table name of the log buffer dump.
pub const LOG_TABLE: &str = "Log";

/// Column names of the log buffer dump, in row order.
pub const LOG_HEADER: [&str; 7] = [
    "clock",
    "timestamp",
    "severity",
    "source",
    "id",
    "threadId",
    "message",
];

/// A single dump cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DumpValue {
    /// Integer column.
    Integer(i64),
    /// Text column; may be empty.
    Text(String),
}

impl From<i64> for DumpValue {
    fn from(value: i64) -> Self {
        DumpValue::Integer(value)
    }
}

impl From<String> for DumpValue {
    fn from(value: String) -> Self {
        DumpValue::Text(value)
    }
}

impl From<&str> for DumpValue {
    fn from(value: &str) -> Self {
        DumpValue::Text(value.to_string())
    }
}

/// Consumer side of a dump.
pub trait DumpWriter {
    /// Start a table; every following row belongs to it.
    ///
    /// # Errors
    ///
    /// Returns an error when the writer cannot accept a new table.
    fn begin_table(&mut self, name: &str, header: &[&str]) -> LogBufferResult<()>;

    /// Append one row to the current table.
    ///
    /// # Errors
    ///
    /// Returns an error when no table is open or the row does not match the header.
    fn write_row(&mut self, row: &[DumpValue]) -> LogBufferResult<()>;

    /// Signal that the source is done.
    ///
    /// # Errors
    ///
    /// Returns an error when pending output cannot be written.
    fn flush(&mut self) -> LogBufferResult<()>;
}

/// Producer side of a dump.
pub trait DumpSource {
    /// Logical table name.
    fn table_name(&self) -> &str;

    /// Ordered column names.
    fn header(&self) -> &[&str];

    /// Write the table into `writer` and flush. Returns the number of rows.
    ///
    /// # Errors
    ///
    /// Propagates writer failures.
    fn export(&self, writer: &mut dyn DumpWriter) -> LogBufferResult<usize>;
}

/// Dump row for one log entry, matching [`LOG_HEADER`].
#[must_use]
pub fn log_row(entry: &LogEntry) -> Vec<DumpValue> {
    let timestamp = entry
        .timestamp()
        .map(|ts| ts.to_rfc3339())
        .unwrap_or_default();
    vec![
        DumpValue::Integer(entry.clock()),
        DumpValue::Text(timestamp),
        DumpValue::from(entry.severity().as_str()),
        DumpValue::from(entry.source()),
        DumpValue::Integer(entry.id()),
        DumpValue::from(entry.thread_id().unwrap_or_default()),
        DumpValue::from(entry.message()),
    ]
}

impl DumpSource for PriorityLogBuffer {
    fn table_name(&self) -> &str {
        LOG_TABLE
    }

    fn header(&self) -> &[&str] {
        &LOG_HEADER
    }

    fn export(&self, writer: &mut dyn DumpWriter) -> LogBufferResult<usize> {
        writer.begin_table(LOG_TABLE, &LOG_HEADER)?;
        let mut rows = 0usize;
        for entry in self {
            writer.write_row(&log_row(entry))?;
            rows += 1;
        }
        writer.flush()?;
        Ok(rows)
    }
}

/// One exported table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpTable {
    /// Table name.
    pub name: String,
    /// Column names.
    pub header: Vec<String>,
    /// Rows, each as long as the header.
    pub rows: Vec<Vec<DumpValue>>,
}

impl DumpTable {
    fn new(name: &str, header: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            header: header.iter().map(|column| (*column).to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: &[DumpValue]) -> LogBufferResult<()> {
        if row.len() != self.header.len() {
            return Err(LogBufferError::Export(format!(
                "row has {} fields, table '{}' has {} columns",
                row.len(),
                self.name,
                self.header.len()
            )));
        }
        self.rows.push(row.to_vec());
        Ok(())
    }

    /// Value of `column` in row `row`, if both exist.
    #[must_use]
    pub fn cell(&self, row: usize, column: &str) -> Option<&DumpValue> {
        let index = self.header.iter().position(|name| name == column)?;
        self.rows.get(row)?.get(index)
    }
}

/// Writer that keeps every table in memory.
#[derive(Debug, Default)]
pub struct MemoryDumpWriter {
    tables: Vec<DumpTable>,
    open: bool,
    flushes: usize,
}

impl MemoryDumpWriter {
    /// Empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables received so far.
    #[must_use]
    pub fn tables(&self) -> &[DumpTable] {
        &self.tables
    }

    /// First table with the given name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&DumpTable> {
        self.tables.iter().find(|table| table.name == name)
    }

    /// Number of `flush` signals received.
    #[must_use]
    pub fn flush_count(&self) -> usize {
        self.flushes
    }

    /// Take ownership of the collected tables.
    #[must_use]
    pub fn into_tables(self) -> Vec<DumpTable> {
        self.tables
    }
}

impl DumpWriter for MemoryDumpWriter {
    fn begin_table(&mut self, name: &str, header: &[&str]) -> LogBufferResult<()> {
        self.tables.push(DumpTable::new(name, header));
        self.open = true;
        Ok(())
    }

    fn write_row(&mut self, row: &[DumpValue]) -> LogBufferResult<()> {
        match self.tables.last_mut() {
            Some(table) if self.open => table.push(row),
            _ => Err(LogBufferError::Export("row written before begin_table".to_string())),
        }
    }

    fn flush(&mut self) -> LogBufferResult<()> {
        self.open = false;
        self.flushes += 1;
        Ok(())
    }
}

/// Writer that emits one JSON document per table, newline separated.
///
/// Rows are staged until `flush` or the next `begin_table`.
#[derive(Debug)]
pub struct JsonDumpWriter<W: Write> {
    inner: W,
    pending: Option<DumpTable>,
    pretty: bool,
}

impl<W: Write> JsonDumpWriter<W> {
    /// Wrap an output stream.
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            pending: None,
            pretty: false,
        }
    }

    /// Pretty-print each document.
    #[must_use]
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// Flush any staged table and return the underlying stream.
    ///
    /// # Errors
    ///
    /// Returns an error when the staged table cannot be written.
    pub fn finish(mut self) -> LogBufferResult<W> {
        self.write_pending()?;
        self.inner.flush()?;
        Ok(self.inner)
    }

    fn write_pending(&mut self) -> LogBufferResult<()> {
        let Some(table) = self.pending.take() else {
            return Ok(());
        };
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.inner, &table)?;
        } else {
            serde_json::to_writer(&mut self.inner, &table)?;
        }
        self.inner.write_all(b"\n")?;
        Ok(())
    }
}

impl<W: Write> DumpWriter for JsonDumpWriter<W> {
    fn begin_table(&mut self, name: &str, header: &[&str]) -> LogBufferResult<()> {
        self.write_pending()?;
        self.pending = Some(DumpTable::new(name, header));
        Ok(())
    }

    fn write_row(&mut self, row: &[DumpValue]) -> LogBufferResult<()> {
        match self.pending.as_mut() {
            Some(table) => table.push(row),
            None => Err(LogBufferError::Export("row written before begin_table".to_string())),
        }
    }

    fn flush(&mut self) -> LogBufferResult<()> {
        self.write_pending()?;
        self.inner.flush()?;
        Ok(())
    }
}
