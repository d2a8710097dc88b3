//! Append-only destinations for session log events.
//!
//! The session calls [`LogSink::append`] exactly once per applied action, in
//! action order. Sinks must not reorder or drop events they accept. File and
//! SQLite sinks live in [`crate::storage`].

use crate::error::LogSinkError;
use crate::events::LogEvent;

/// Destination for [`LogEvent`]s.
pub trait LogSink {
    /// Append one event.
    ///
    /// # Errors
    /// Returns [`LogSinkError`] if the event could not be recorded. The
    /// session reports the failure and carries on.
    fn append(&mut self, event: &LogEvent) -> Result<(), LogSinkError>;
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn append(&mut self, event: &LogEvent) -> Result<(), LogSinkError> {
        (**self).append(event)
    }
}

/// In-memory sink, mainly for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryLogSink {
    events: Vec<LogEvent>,
    failures_remaining: usize,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink that rejects the next `count` events before accepting again.
    pub fn failing(count: usize) -> Self {
        Self {
            events: Vec::new(),
            failures_remaining: count,
        }
    }

    pub fn events(&self) -> &[LogEvent] {
        &self.events
    }
}

impl LogSink for MemoryLogSink {
    fn append(&mut self, event: &LogEvent) -> Result<(), LogSinkError> {
        if self.failures_remaining > 0 {
            self.failures_remaining -= 1;
            return Err(LogSinkError::Rejected("memory sink configured to fail".into()));
        }
        self.events.push(event.clone());
        Ok(())
    }
}
