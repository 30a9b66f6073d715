//! Metrics-client seam
//!
//! The wrapper never talks to a concrete metrics backend. Everything is
//! emitted through [`MetricsSink`], injected as a shared handle:
//! - [`FacadeSink`] routes buckets into the `metrics` facade (production)
//! - [`RecordingSink`] captures emissions in memory (tests)
//! - [`NoopSink`] discards everything (instrumentation disabled)

pub mod facade;
pub mod recording;

pub use facade::FacadeSink;
pub use recording::{NoopSink, RecordingSink, SinkEvent, noop_sink};

use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counter and timing emission, fire-and-forget.
///
/// Implementations must be safe for concurrent use: every in-flight request
/// emits through the same handle. Delivery failures are never surfaced here;
/// instrumentation must not be able to fail the request it measures.
pub trait MetricsSink: Send + Sync {
    /// Increment the named counter bucket by one.
    fn increment(&self, bucket: &str);

    /// Record one timing sample for the named bucket.
    fn record_timing(&self, bucket: &str, elapsed: Duration);
}

/// Shared handle to an injected metrics sink.
pub type SharedSink = Arc<dyn MetricsSink>;

/// An in-flight timing measurement.
///
/// Starts measuring when constructed; [`Timing::send`] emits the elapsed
/// wall-clock time as a single sample and consumes the handle.
pub struct Timing {
    started: Instant,
    sink: SharedSink,
}

impl Timing {
    /// Start measuring now.
    pub fn start(sink: SharedSink) -> Self {
        Self {
            started: Instant::now(),
            sink,
        }
    }

    /// Elapsed time since the measurement started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Emit the elapsed time to `bucket`.
    pub fn send(self, bucket: &str) {
        self.sink.record_timing(bucket, self.started.elapsed());
    }
}

/// Namespace-scoping wrapper around an inner sink.
///
/// Prepends `"{prefix}."` to every bucket name flowing through it. The inner
/// handle is shared, not reconfigured: the prefix is owned here and the trait
/// surface is immutable, so neither side can observe changes on the other.
pub struct Prefixed {
    prefix: String,
    inner: SharedSink,
}

impl Prefixed {
    /// Scope `inner` under `prefix`. Trailing separators are trimmed so
    /// `"myapp."` and `"myapp"` scope identically.
    pub fn new(prefix: &str, inner: SharedSink) -> Self {
        Self {
            prefix: prefix.trim_end_matches('.').to_string(),
            inner,
        }
    }

    fn scoped(&self, bucket: &str) -> String {
        format!("{}.{}", self.prefix, bucket)
    }
}

impl MetricsSink for Prefixed {
    fn increment(&self, bucket: &str) {
        self.inner.increment(&self.scoped(bucket));
    }

    fn record_timing(&self, bucket: &str, elapsed: Duration) {
        self.inner.record_timing(&self.scoped(bucket), elapsed);
    }
}
