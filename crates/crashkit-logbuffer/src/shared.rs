//! Thread-safe handle around a [`PriorityLogBuffer`].

use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

use crate::buffer::{AddOutcome, PriorityLogBuffer};
use crate::entry::LogEntry;
use crate::error::LogBufferResult;
use crate::export::{DumpSource, DumpWriter, LOG_HEADER, LOG_TABLE};

/// Cloneable, lock-protected log buffer.
///
/// Every `add` takes the lock, and a dump export holds it for the whole
/// enumeration so writers never observe a half-updated buffer.
#[derive(Debug, Clone, Default)]
pub struct SharedLogBuffer {
    inner: Arc<Mutex<PriorityLogBuffer>>,
}

impl SharedLogBuffer {
    /// Share an existing buffer.
    #[must_use]
    pub fn new(buffer: PriorityLogBuffer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    /// Append an entry under the lock.
    pub fn add(&self, entry: LogEntry) -> AddOutcome {
        self.inner.lock().add(entry)
    }

    /// Number of buffered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the buffer holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Copy of the buffered entries in merge order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.inner.lock().iter().cloned().collect()
    }

    /// Exclusive access for anything not covered above.
    ///
    /// Do not emit `tracing` events while holding the guard when a
    /// [`LogBufferLayer`](crate::LogBufferLayer) feeds this buffer; the
    /// layer would block on the same lock.
    pub fn lock(&self) -> MutexGuard<'_, PriorityLogBuffer> {
        self.inner.lock()
    }
}

impl DumpSource for SharedLogBuffer {
    fn table_name(&self) -> &str {
        LOG_TABLE
    }

    fn header(&self) -> &[&str] {
        &LOG_HEADER
    }

    fn export(&self, writer: &mut dyn DumpWriter) -> LogBufferResult<usize> {
        let guard = self.inner.lock();
        guard.export(writer)
    }
}
