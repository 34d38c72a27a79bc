//! Logging Module
//!
//! The textual event side channel. When a sink is attached, operations pass
//! it one line of the form `[cache-<op>] <details>`.

use std::fmt::Debug;
use std::sync::Arc;

use tracing::info;

/// Receives one human-readable line per logged operation.
pub trait LogSink: Send + Sync {
    fn log(&self, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn log(&self, message: &str) {
        self(message)
    }
}

/// Forwards every line to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&self, message: &str) {
        info!(target: "tagcache::events", "{}", message);
    }
}

/// An optional sink; logging through an empty one is a no-op.
#[derive(Clone, Default)]
pub(crate) struct EventLog {
    sink: Option<Arc<dyn LogSink>>,
}

impl EventLog {
    pub(crate) fn new(sink: Option<Arc<dyn LogSink>>) -> Self {
        Self { sink }
    }

    pub(crate) fn emit(&self, op: &str, details: impl FnOnce() -> String) {
        if let Some(sink) = &self.sink {
            sink.log(&format!("[cache-{}] {}", op, details()));
        }
    }
}

impl Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("attached", &self.sink.is_some())
            .finish()
    }
}
