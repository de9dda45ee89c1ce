//! Prelude for crashkit-logbuffer.

pub use crate::buffer::{AddOutcome, MergeKey, PriorityLogBuffer};
pub use crate::config::LogBufferConfig;
pub use crate::entry::LogEntry;
pub use crate::error::{LogBufferError, LogBufferResult};
pub use crate::export::{DumpSource, DumpWriter, JsonDumpWriter, MemoryDumpWriter};
pub use crate::layer::LogBufferLayer;
pub use crate::severity::Severity;
pub use crate::shared::SharedLogBuffer;
