//! `tracing` layer that records events into a [`SharedLogBuffer`].

use chrono::Utc;
use std::fmt::{self, Write as _};
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

use crashkit_timing::SharedClock;

use crate::entry::LogEntry;
use crate::severity::Severity;
use crate::shared::SharedLogBuffer;

/// Feeds every `tracing` event into a log buffer.
///
/// Severity comes from the event level, source from its target, and the
/// message from the `message` field with any other fields appended as
/// `key=value` pairs.
#[derive(Debug, Clone)]
pub struct LogBufferLayer {
    buffer: SharedLogBuffer,
    clock: SharedClock,
}

impl LogBufferLayer {
    /// Layer writing into `buffer`, stamping entries with `clock`.
    #[must_use]
    pub fn new(buffer: SharedLogBuffer, clock: SharedClock) -> Self {
        Self { buffer, clock }
    }

    /// Buffer this layer writes into.
    #[must_use]
    pub fn buffer(&self) -> &SharedLogBuffer {
        &self.buffer
    }
}

#[derive(Default)]
struct MessageVisitor {
    message: String,
    fields: String,
}

impl MessageVisitor {
    fn into_text(self) -> String {
        match (self.message.is_empty(), self.fields.is_empty()) {
            (_, true) => self.message,
            (true, false) => self.fields,
            (false, false) => format!("{} {}", self.message, self.fields),
        }
    }
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message.push_str(value);
        } else {
            self.record_debug(field, &value);
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            let _written = write!(self.message, "{value:?}");
            return;
        }
        if !self.fields.is_empty() {
            self.fields.push(' ');
        }
        let _written = write!(self.fields, "{}={value:?}", field.name());
    }
}

impl<S: Subscriber> Layer<S> for LogBufferLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);

        let current = std::thread::current();
        let thread_id = current
            .name()
            .map_or_else(|| format!("{:?}", current.id()), str::to_string);

        let entry = LogEntry::new(
            self.clock.now(),
            Severity::from(*metadata.level()),
            visitor.into_text(),
        )
        .with_source(metadata.target())
        .with_timestamp(Utc::now())
        .with_thread_id(thread_id);

        self.buffer.add(entry);
    }
}
