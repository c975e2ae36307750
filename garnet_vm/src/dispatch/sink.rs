//! Diagnostic sinks for cache growth.
//!
//! Growth events are advisory. A node dispatches identically with or without
//! a sink; sinks only make call sites whose shape diversity keeps growing
//! visible to operators.

use super::entry::CacheGrowth;
use parking_lot::Mutex;
use tracing::{debug, warn};

/// Receives a [`CacheGrowth`] each time a node caches a new shape.
pub trait DiagnosticSink: Send + Sync {
    fn cache_grew(&self, event: &CacheGrowth);
}

/// Forwards growth events to `tracing`.
///
/// Growth below the polymorphic limit is logged at debug level; reaching the
/// limit is logged as a warning.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn cache_grew(&self, event: &CacheGrowth) {
        if event.at_limit() {
            warn!(
                method = %event.method,
                file = %event.location.file,
                line = event.location.line,
                size = event.size,
                shape = %event.shape,
                "call site cache reached polymorphic limit"
            );
        } else {
            debug!(
                method = %event.method,
                file = %event.location.file,
                line = event.location.line,
                size = event.size,
                shape = %event.shape,
                fallback = event.is_fallback,
                "call site cache grew"
            );
        }
    }
}

/// Keeps every event in memory.
/// Keeps every event in memory, for tests and tooling.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<CacheGrowth>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far, oldest first.
    pub fn events(&self) -> Vec<CacheGrowth> {
        self.events.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl DiagnosticSink for RecordingSink {
    fn cache_grew(&self, event: &CacheGrowth) {
        self.events.lock().push(event.clone());
    }
}
