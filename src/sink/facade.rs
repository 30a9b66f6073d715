//! Default sink backed by the `metrics` crate facade.

use metrics::{counter, histogram};
use std::time::Duration;

use super::MetricsSink;

/// Routes bucket names into whatever recorder the host process installed.
///
/// Counters map to `metrics` counters; timings map to histograms recorded in
/// seconds. Bucket names pass through verbatim; exporters apply their own
/// name mangling where the backend requires it. Delivery semantics are
/// entirely the recorder's.
#[derive(Debug, Default, Clone, Copy)]
pub struct FacadeSink;

impl MetricsSink for FacadeSink {
    fn increment(&self, bucket: &str) {
        counter!(bucket.to_string()).increment(1);
    }

    fn record_timing(&self, bucket: &str, elapsed: Duration) {
        histogram!(bucket.to_string()).record(elapsed.as_secs_f64());
    }
}
