//! Request instrumentation for tower/axum handlers with statsd-style
//! bucket names.
//!
//! Wrapping a route handler makes every request emit one timing sample and
//! two counter increments, named after the route and the observed response
//! status:
//!
//! - `{prefix}.{route}.response_time`: handler wall-clock time
//! - `{prefix}.{route}.count`: one per request
//! - `{prefix}.{route}.http{status}`: one per request, status-scoped
//!
//! The metrics backend is injected through the [`MetricsSink`] trait;
//! [`FacadeSink`] forwards to whatever recorder the host process installed
//! via the `metrics` facade. Emission is fire-and-forget and runs on every
//! exit path, including handler panics.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use axum::{Router, routing::get_service};
//! use statsd_wrap::{FacadeSink, HandlerWrapper};
//!
//! async fn handle_home() -> &'static str {
//!     "OK"
//! }
//!
//! let wrap = HandlerWrapper::new("user_service", Arc::new(FacadeSink));
//! let (path, home) = wrap.wrap_handler_fn("home", "/", handle_home);
//! let app: Router = Router::new().route(path, get_service(home));
//! # let _ = app;
//! ```

pub mod config;
pub mod error;
pub mod sink;
pub mod txn;
pub mod wrap;

pub use config::{WrapConfig, load_config};
pub use error::WrapError;
pub use sink::{
    FacadeSink, MetricsSink, NoopSink, RecordingSink, SharedSink, SinkEvent, Timing, noop_sink,
};
pub use txn::Transaction;
pub use wrap::{HandlerWrapper, InstrumentLayer, Instrumented};
