//! # crashkit-logbuffer
//!
//! A bounded, severity-prioritized log buffer that keeps the most useful
//! recent history in memory for crash reports.
//!
//! Each severity has its own FIFO bucket with a guaranteed minimum. When the
//! buffer is full, the lowest-priority bucket that is above its minimum loses
//! its oldest entry, so verbose chatter is always the first to go and the last
//! few critical entries survive.
//!
//! ## Architecture
//!
//! - [`buffer`] - [`PriorityLogBuffer`] and its merge iterator
//! - [`shared`] - [`SharedLogBuffer`], the lock-protected handle used by writers
//! - [`export`] - the [`DumpSource`]/[`DumpWriter`] contract and bundled writers
//! - [`layer`] - [`LogBufferLayer`], a `tracing_subscriber` layer feeding the buffer
//! - [`config`] - [`LogBufferConfig`], limits with fallback to defaults
//! - [`severity`], [`entry`], [`error`]
//!
//! ## Example
//!
//! ```rust
//! use crashkit_logbuffer::prelude::*;
//!
//! # fn main() -> LogBufferResult<()> {
//! let mut buffer = PriorityLogBuffer::with_limits([3; Severity::COUNT], 21);
//! for clock in 0..21 {
//!     buffer.add(LogEntry::new(clock, Severity::Info, "tick"));
//! }
//! assert_eq!(
//!     buffer.add(LogEntry::new(21, Severity::Critical, "boom")),
//!     AddOutcome::Evicted(Severity::Info)
//! );
//!
//! let mut writer = MemoryDumpWriter::new();
//! assert_eq!(buffer.export(&mut writer)?, 21);
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

pub mod buffer;
pub mod config;
pub mod entry;
pub mod error;
pub mod export;
pub mod layer;
pub mod severity;
pub mod shared;

pub mod prelude;

pub use buffer::{AddOutcome, DEFAULT_MINIMUM, DEFAULT_TOTAL, Iter, MergeKey, PriorityLogBuffer};
pub use config::{LogBufferConfig, ResolvedLogBuffer};
pub use entry::LogEntry;
pub use error::{LogBufferError, LogBufferResult};
pub use export::{
    DumpSource, DumpTable, DumpValue, DumpWriter, JsonDumpWriter, LOG_HEADER, LOG_TABLE,
    MemoryDumpWriter, log_row,
};
pub use layer::LogBufferLayer;
pub use severity::Severity;
pub use shared::SharedLogBuffer;
