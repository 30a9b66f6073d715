//! Observable and inert sinks.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::{MetricsSink, SharedSink};

/// A single recorded emission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Increment(String),
    Timing(String, Duration),
}

/// Captures every emission in memory, in order, for later assertions.
///
/// Clones share the same underlying buffer, so a test can keep one handle
/// and hand another to the wrapper under test.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<SinkEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<SinkEvent>> {
        // A panic mid-emission leaves nothing half-written; keep recording.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every emission seen so far, in emission order.
    pub fn events(&self) -> Vec<SinkEvent> {
        self.lock().clone()
    }

    /// Number of increments recorded against `bucket`.
    pub fn counts(&self, bucket: &str) -> usize {
        self.lock()
            .iter()
            .filter(|event| matches!(event, SinkEvent::Increment(name) if name == bucket))
            .count()
    }

    /// Timing samples recorded against `bucket`, in emission order.
    pub fn timings(&self, bucket: &str) -> Vec<Duration> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                SinkEvent::Timing(name, elapsed) if name == bucket => Some(*elapsed),
                _ => None,
            })
            .collect()
    }
}

impl MetricsSink for RecordingSink {
    fn increment(&self, bucket: &str) {
        self.lock().push(SinkEvent::Increment(bucket.to_string()));
    }

    fn record_timing(&self, bucket: &str, elapsed: Duration) {
        self.lock().push(SinkEvent::Timing(bucket.to_string(), elapsed));
    }
}

/// Discards everything; lets instrumentation be disabled without touching
/// call sites.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn increment(&self, _bucket: &str) {}

    fn record_timing(&self, _bucket: &str, _elapsed: Duration) {}
}

/// Create a no-op sink handle.
pub fn noop_sink() -> SharedSink {
    Arc::new(NoopSink)
}
