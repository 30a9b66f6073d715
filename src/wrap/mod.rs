//! Handler wrapping
//!
//! [`HandlerWrapper`] binds a namespace prefix to a metrics sink and
//! produces per-route adapters: [`InstrumentLayer`] for tower-style
//! composition, and the `wrap_handler` / `wrap_handler_fn` pair that takes a
//! route pattern and a handler and hands back both, instrumented, ready for
//! router registration.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::Request;
use axum::handler::{Handler, HandlerService, HandlerWithoutStateExt};
use axum::http::StatusCode;
use axum::response::Response;
use garde::Validate;
use tower::{Layer, Service};

use crate::config::WrapConfig;
use crate::error::WrapError;
use crate::sink::{Prefixed, SharedSink};
use crate::txn::Transaction;

/// Builds instrumented adapters bound to a namespace prefix and a sink.
///
/// Immutable after construction. The supplied sink handle is shared, never
/// mutated; a non-empty prefix is applied through a private scoping wrapper,
/// so the caller's handle keeps emitting unprefixed names.
#[derive(Clone)]
pub struct HandlerWrapper {
    sink: SharedSink,
    fallback_status: StatusCode,
}

impl HandlerWrapper {
    /// Bind a wrapper to `prefix` and `sink`. An empty prefix adds no
    /// namespace.
    pub fn new(prefix: &str, sink: SharedSink) -> Self {
        let sink = if prefix.is_empty() {
            sink
        } else {
            Arc::new(Prefixed::new(prefix, sink)) as SharedSink
        };
        Self {
            sink,
            fallback_status: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Construct from a validated [`WrapConfig`].
    pub fn from_config(config: &WrapConfig, sink: SharedSink) -> Result<Self, WrapError> {
        config.validate()?;
        let fallback = StatusCode::from_u16(config.fallback_status)
            .map_err(|err| WrapError::Config(format!("fallback_status: {err}")))?;

        let mut wrapper = Self::new(&config.prefix, sink);
        wrapper.fallback_status = fallback;
        Ok(wrapper)
    }

    /// Tower layer emitting metrics rooted at `route_name`.
    pub fn layer(&self, route_name: &str) -> InstrumentLayer {
        InstrumentLayer {
            route: Arc::from(normalize_route_name(route_name)),
            sink: self.sink.clone(),
            fallback_status: self.fallback_status,
        }
    }

    /// Wrap a request/response service.
    ///
    /// `pattern` is an opaque pass-through, returned unchanged so the pair
    /// slots straight into the router's registration call.
    pub fn wrap_handler<'p, S>(
        &self,
        route_name: &str,
        pattern: &'p str,
        handler: S,
    ) -> (&'p str, Instrumented<S>) {
        (pattern, self.layer(route_name).layer(handler))
    }

    /// Wrap a bare async handler function.
    ///
    /// Adapts the function into a service and delegates to
    /// [`HandlerWrapper::wrap_handler`].
    pub fn wrap_handler_fn<'p, H, T>(
        &self,
        route_name: &str,
        pattern: &'p str,
        handler: H,
    ) -> (&'p str, Instrumented<HandlerService<H, T, ()>>)
    where
        H: Handler<T, ()>,
    {
        self.wrap_handler(route_name, pattern, handler.into_service())
    }

    /// Open a transaction outside the router, for manual instrumentation of
    /// work that is not a wrapped handler.
    pub fn start_transaction(&self, route_name: &str) -> Transaction {
        Transaction::start(
            Arc::from(normalize_route_name(route_name)),
            self.sink.clone(),
            self.fallback_status,
        )
    }
}

/// Replace statsd wire-breaking characters with `_`; name empty routes.
///
/// `.` stays legal: multi-segment roots such as `api.users` are intended
/// statsd hierarchy.
fn normalize_route_name(name: &str) -> String {
    if name.is_empty() {
        return "unnamed".to_string();
    }

    let normalized: String = name
        .chars()
        .map(|c| match c {
            ':' | '|' | '@' | '#' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();

    if normalized != name {
        tracing::warn!(
            route = %name,
            "route name rewritten for statsd compatibility"
        );
    }
    normalized
}

/// Per-route tower layer produced by [`HandlerWrapper::layer`].
#[derive(Clone)]
pub struct InstrumentLayer {
    route: Arc<str>,
    sink: SharedSink,
    fallback_status: StatusCode,
}

impl<S> Layer<S> for InstrumentLayer {
    type Service = Instrumented<S>;

    fn layer(&self, inner: S) -> Self::Service {
        Instrumented {
            inner,
            route: self.route.clone(),
            sink: self.sink.clone(),
            fallback_status: self.fallback_status,
        }
    }
}

/// Service adapter that runs a [`Transaction`] around every call.
///
/// The transaction lives inside the response future, so a panicking handler
/// or a cancelled future still emits its metrics when the future is dropped.
#[derive(Clone)]
pub struct Instrumented<S> {
    inner: S,
    route: Arc<str>,
    sink: SharedSink,
    fallback_status: StatusCode,
}

impl<S> Service<Request> for Instrumented<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let route = self.route.clone();
        let sink = self.sink.clone();
        let fallback = self.fallback_status;
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let mut txn = Transaction::start(route, sink, fallback);
            let result = inner.call(req).await;
            if let Ok(response) = &result {
                txn.set_status(response.status());
            }
            txn.end();
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::RecordingSink;
    use axum::body::Body;
    use tower::ServiceExt;

    async fn handle_ok() -> &'static str {
        "OK"
    }

    fn request() -> Request {
        Request::builder().uri("/").body(Body::empty()).unwrap()
    }

    #[test]
    fn test_normalize_passes_clean_names_through() {
        assert_eq!(normalize_route_name("home"), "home");
        assert_eq!(normalize_route_name("api.users"), "api.users");
        assert_eq!(normalize_route_name("user-detail_v2"), "user-detail_v2");
    }

    #[test]
    fn test_normalize_rewrites_wire_breaking_characters() {
        assert_eq!(normalize_route_name("home:page"), "home_page");
        assert_eq!(normalize_route_name("a|b@c#d"), "a_b_c_d");
        assert_eq!(normalize_route_name("two words"), "two_words");
        assert_eq!(normalize_route_name("line\nbreak"), "line_break");
    }

    #[test]
    fn test_normalize_names_empty_routes() {
        assert_eq!(normalize_route_name(""), "unnamed");
    }

    #[test]
    fn test_wrap_handler_passes_pattern_through() {
        let wrap = HandlerWrapper::new("", Arc::new(RecordingSink::new()));
        let (pattern, _svc) = wrap.wrap_handler_fn("home", "/some/{id}/path", handle_ok);
        assert_eq!(pattern, "/some/{id}/path");
    }

    #[tokio::test]
    async fn test_wrapped_handler_emits_prefixed_triple() {
        let sink = RecordingSink::new();
        let wrap = HandlerWrapper::new("acme", Arc::new(sink.clone()));
        let (_, svc) = wrap.wrap_handler_fn("home", "/", handle_ok);

        let response = svc.oneshot(request()).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(sink.timings("acme.home.response_time").len(), 1);
        assert_eq!(sink.counts("acme.home.http200"), 1);
        assert_eq!(sink.counts("acme.home.count"), 1);
    }

    #[tokio::test]
    async fn test_empty_prefix_emits_unscoped_names() {
        let sink = RecordingSink::new();
        let wrap = HandlerWrapper::new("", Arc::new(sink.clone()));
        let (_, svc) = wrap.wrap_handler_fn("home", "/", handle_ok);

        svc.oneshot(request()).await.unwrap();

        assert_eq!(sink.counts("home.count"), 1);
        assert_eq!(sink.counts("home.http200"), 1);
    }

    #[tokio::test]
    async fn test_layer_composes_with_tower() {
        let sink = RecordingSink::new();
        let wrap = HandlerWrapper::new("acme", Arc::new(sink.clone()));
        let svc = wrap.layer("home").layer(handle_ok.into_service());

        svc.oneshot(request()).await.unwrap();

        assert_eq!(sink.counts("acme.home.count"), 1);
    }

    #[tokio::test]
    async fn test_from_config_applies_prefix_and_fallback() {
        let sink = RecordingSink::new();
        let config = WrapConfig {
            prefix: "acme".to_string(),
            fallback_status: 503,
        };
        let wrap = HandlerWrapper::from_config(&config, Arc::new(sink.clone())).unwrap();

        // A transaction closed without a status lands in the configured
        // fallback bucket.
        wrap.start_transaction("job").end();

        assert_eq!(sink.counts("acme.job.http503"), 1);
        assert_eq!(sink.counts("acme.job.count"), 1);
    }

    #[test]
    fn test_from_config_rejects_invalid_prefix() {
        let config = WrapConfig {
            prefix: "bad prefix!".to_string(),
            fallback_status: 500,
        };
        let result = HandlerWrapper::from_config(&config, Arc::new(RecordingSink::new()));
        assert!(matches!(result, Err(WrapError::Config(_))));
    }
}
