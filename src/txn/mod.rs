//! Per-request transaction lifecycle
//!
//! A [`Transaction`] ties one HTTP request to one metric emission sequence:
//! a timing sample plus a status-scoped and an unconditional counter
//! increment. Transactions are created per request, never pooled or reused.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::sink::{SharedSink, Timing};

/// A single request's metric emission record.
///
/// Timing starts the moment the transaction is created. Exactly one emission
/// happens per transaction, through [`Transaction::end`] or
/// [`Transaction::write`]. If neither ran when the transaction is dropped
/// (the handler unwound, or its future was cancelled), `Drop` emits with the
/// configured fallback status. The terminal operations consume the
/// transaction, so a closed transaction cannot be operated on again.
pub struct Transaction {
    route: Arc<str>,
    response_time_bucket: String,
    hits_bucket: String,
    timing: Option<Timing>,
    status: Option<StatusCode>,
    fallback: StatusCode,
    sink: SharedSink,
}

impl Transaction {
    pub(crate) fn start(route: Arc<str>, sink: SharedSink, fallback: StatusCode) -> Self {
        Self {
            response_time_bucket: format!("{route}.response_time"),
            hits_bucket: format!("{route}.count"),
            timing: Some(Timing::start(sink.clone())),
            status: None,
            fallback,
            route,
            sink,
        }
    }

    /// Record the status observed on the finished response.
    pub fn set_status(&mut self, status: StatusCode) {
        self.status = Some(status);
    }

    /// Close the transaction using the captured status, or the fallback
    /// status when none was captured.
    pub fn end(mut self) {
        let status = self.status.unwrap_or(self.fallback);
        self.emit(status);
    }

    /// Close the transaction using `status`, regardless of any captured
    /// status. For callers that already know the outcome and don't route
    /// through the service adapter.
    pub fn write(mut self, status: StatusCode) {
        self.emit(status);
    }

    fn emit(&mut self, status: StatusCode) {
        let Some(timing) = self.timing.take() else {
            return;
        };
        let elapsed = timing.elapsed();

        timing.send(&self.response_time_bucket);
        self.sink
            .increment(&format!("{}.http{}", self.route, status.as_u16()));
        self.sink.increment(&self.hits_bucket);

        tracing::debug!(
            route = %self.route,
            status = status.as_u16(),
            elapsed_ms = elapsed.as_millis() as u64,
            "request metrics emitted"
        );
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        // Unwinding or a cancelled response future still emits the triple.
        if self.timing.is_some() {
            let status = self.status.unwrap_or(self.fallback);
            self.emit(status);
        }
    }
}
