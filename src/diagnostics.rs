//! Diagnostics sink injected into every pipeline component.
//!
//! Components never call the `log` macros directly; they report through a
//! [`DiagnosticSink`] handed to them at construction. [`LogSink`] forwards to
//! the `log` facade; [`MemorySink`] keeps records in memory for inspection.

use log::Level;
use std::sync::{Arc, Mutex};

/// Receiver of structured diagnostic events.
pub trait DiagnosticSink: Send + Sync {
    /// Record one event emitted by `component`.
    fn record(&self, level: Level, component: &'static str, message: &str);
}

/// Shared handle to a sink.
pub type SharedSink = Arc<dyn DiagnosticSink>;

/// Forwards every event to the `log` facade, targeted at the component.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn record(&self, level: Level, component: &'static str, message: &str) {
        log::log!(target: component, level, "{}", message);
    }
}

/// One event captured by [`MemorySink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    /// Severity
    pub level: Level,
    /// Emitting component
    pub component: &'static str,
    /// Rendered message
    pub message: String,
}

/// In-memory sink; every record is retained in arrival order.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all records so far.
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }

    /// Records at exactly `level`.
    pub fn at_level(&self, level: Level) -> Vec<DiagnosticRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .collect()
    }

    /// Whether any record at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.at_level(level)
            .iter()
            .any(|r| r.message.contains(needle))
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, level: Level, component: &'static str, message: &str) {
        if let Ok(mut records) = self.records.lock() {
            records.push(DiagnosticRecord {
                level,
                component,
                message: message.to_string(),
            });
        }
    }
}

/// Component-scoped reporter wrapping a shared sink.
#[derive(Clone)]
pub(crate) struct Reporter {
    sink: SharedSink,
    component: &'static str,
}

impl Reporter {
    pub(crate) fn new(sink: SharedSink, component: &'static str) -> Self {
        Self { sink, component }
    }

    pub(crate) fn debug(&self, message: impl AsRef<str>) {
        self.sink.record(Level::Debug, self.component, message.as_ref());
    }

    pub(crate) fn info(&self, message: impl AsRef<str>) {
        self.sink.record(Level::Info, self.component, message.as_ref());
    }

    pub(crate) fn warn(&self, message: impl AsRef<str>) {
        self.sink.record(Level::Warn, self.component, message.as_ref());
    }

    pub(crate) fn error(&self, message: impl AsRef<str>) {
        self.sink.record(Level::Error, self.component, message.as_ref());
    }

    pub(crate) fn sink(&self) -> SharedSink {
        Arc::clone(&self.sink)
    }
}
