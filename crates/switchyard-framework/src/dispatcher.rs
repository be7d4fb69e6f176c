//! Request dispatcher.
//!
//! The [`Dispatcher`] owns an ordered, immutable route table plus the optional
//! parameter resolver and response coercer. When a request is dispatched:
//!
//! 1. Routes are tested in declaration order against the request's method and
//!    path (the URI without its query string).
//! 2. The first route that accepts the request has its handler invoked.
//! 3. If the handler declines (returns nothing), scanning continues with the
//!    next route.
//! 4. The first reply wins. Routes after it are never evaluated.
//! 5. If no route produces a reply, dispatch returns `Ok(None)` (no match).
//!
//! A failure in resolution, the handler or coercion stops the scan. If the
//! failure carries a reply, that reply is returned as the result; otherwise
//! the error propagates.
//!
//! ```rust,ignore
//! use switchyard_framework::Dispatcher;
//!
//! let dispatcher = Dispatcher::builder()
//!     .route("GET", "/", root)
//!     .routes(&[("GET", "/greet"), ("POST", "/greet")], greet)
//!     .build()?;
//!
//! let reply = dispatcher.dispatch(Request::new("GET", "/greet"))?;
//! ```

use std::fmt;
use std::future::{Ready, ready};
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use tracing::{Level, debug, span, trace};

use switchyard_core::{Reply, Request};

use crate::coercer::ResponseCoercer;
use crate::error::{DispatchError, DispatchResult, RouteError};
use crate::handler::{BoxedHandler, Handler, into_handler};
use crate::resolver::ParameterResolver;
use crate::route::{Route, RouteDecl, RouteEnumerator};

/// The dispatch engine.
///
/// # Thread Safety
///
/// `Dispatcher` is `Send + Sync` and holds no per-request state. Cloning is
/// cheap and shares the route table, so any number of threads may dispatch
/// concurrently.
#[derive(Clone)]
pub struct Dispatcher {
    routes: Arc<[Route]>,
    resolver: Option<Arc<dyn ParameterResolver>>,
    coercer: Option<Arc<dyn ResponseCoercer>>,
}

impl Dispatcher {
    /// Starts building a dispatcher.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::new()
    }

    /// Returns the number of route entries.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    /// The route table, in priority order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Returns `true` if a parameter resolver is configured.
    pub fn has_resolver(&self) -> bool {
        self.resolver.is_some()
    }

    /// Returns `true` if a response coercer is configured.
    pub fn has_coercer(&self) -> bool {
        self.coercer.is_some()
    }

    /// Dispatches a request to the first route that produces a reply.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(reply))` if a route produced a reply, or a failure carried one.
    /// - `Ok(None)` if no route accepted the request or every accepting route
    ///   declined.
    ///
    /// # Errors
    ///
    /// Returns the [`DispatchError`] of the first failing route when the
    /// failure does not carry a reply.
    pub fn dispatch(&self, request: impl Into<Arc<Request>>) -> DispatchResult<Option<Reply>> {
        let request = request.into();
        let span = span!(
            Level::DEBUG,
            "dispatch",
            method = %request.method(),
            path = %request.path()
        );
        let _enter = span.enter();

        let resolver = self.resolver.as_deref();
        let coercer = self.coercer.as_deref();

        for (position, route) in self.routes.iter().enumerate() {
            let Some(captures) = route.matches(&request) else {
                trace!(position, pattern = route.pattern().source(), "Route skipped");
                continue;
            };
            debug!(
                position,
                pattern = route.pattern().source(),
                handler = route.handler().name(),
                "Route accepted request"
            );

            match route.invoke(&request, &captures, resolver, coercer) {
                Ok(Some(reply)) => return Ok(Some(reply)),
                Ok(None) => {
                    trace!(
                        handler = route.handler().name(),
                        "Handler declined, continuing scan"
                    );
                }
                Err(err) => {
                    debug!(error = %err, "Dispatch failed");
                    return err.into_reply().map(Some);
                }
            }
        }

        debug!("No route produced a reply");
        Ok(None)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            routes: Arc::from(Vec::new()),
            resolver: None,
            coercer: None,
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("route_count", &self.routes.len())
            .field("has_resolver", &self.resolver.is_some())
            .field("has_coercer", &self.coercer.is_some())
            .finish()
    }
}

impl Service<Request> for Dispatcher {
    type Response = Option<Reply>;
    type Error = DispatchError;
    type Future = Ready<DispatchResult<Option<Reply>>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        ready(self.dispatch(request))
    }
}

// ============================================================================
// DispatcherBuilder
// ============================================================================

/// Collects route declarations and extensions, then compiles a [`Dispatcher`].
///
/// Declaration order is kept verbatim; it is the priority order.
#[derive(Default)]
pub struct DispatcherBuilder {
    decls: Vec<RouteDecl>,
    resolver: Option<Arc<dyn ParameterResolver>>,
    coercer: Option<Arc<dyn ResponseCoercer>>,
}

impl DispatcherBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the parameter resolver.
    pub fn resolver(mut self, resolver: impl ParameterResolver) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Installs the response coercer.
    pub fn coercer(mut self, coercer: impl ResponseCoercer) -> Self {
        self.coercer = Some(Arc::new(coercer));
        self
    }

    /// Appends one route for a handler function.
    pub fn route<F, T>(self, method: &str, pattern: &str, f: F) -> Self
    where
        F: Handler<T>,
        T: 'static,
    {
        self.route_boxed(method, pattern, into_handler(f))
    }

    /// Appends one route for an already boxed handler.
    pub fn route_boxed(mut self, method: &str, pattern: &str, handler: BoxedHandler) -> Self {
        self.decls.push(RouteDecl::new(method, pattern, handler));
        self
    }

    /// Appends one route per `(method, pattern)` pair, all sharing one handler.
    pub fn routes<F, T>(mut self, declarations: &[(&str, &str)], f: F) -> Self
    where
        F: Handler<T>,
        T: 'static,
    {
        let handler = into_handler(f);
        for (method, pattern) in declarations {
            self.decls
                .push(RouteDecl::new(*method, *pattern, handler.clone()));
        }
        self
    }

    /// Appends every declaration produced by an enumerator, in order.
    pub fn enumerate<E>(mut self, enumerator: &E) -> Self
    where
        E: RouteEnumerator + ?Sized,
    {
        self.decls.extend(enumerator.routes());
        self
    }

    /// Compiles all declarations into a dispatcher.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] for the first pattern that does
    /// not compile. No dispatcher is produced in that case.
    pub fn build(self) -> Result<Dispatcher, RouteError> {
        let routes = self
            .decls
            .into_iter()
            .map(RouteDecl::compile)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            routes = routes.len(),
            resolver = self.resolver.is_some(),
            coercer = self.coercer.is_some(),
            "Dispatcher built"
        );

        Ok(Dispatcher {
            routes: routes.into(),
            resolver: self.resolver,
            coercer: self.coercer,
        })
    }
}

impl fmt::Debug for DispatcherBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatcherBuilder")
            .field("decls", &self.decls)
            .field("has_resolver", &self.resolver.is_some())
            .field("has_coercer", &self.coercer.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coercer::{Raw, RawValue};
    use crate::handler::HandlerMeta;
    use crate::pattern::Captures;
    use crate::resolver::{Resolved, Slot};
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use switchyard_core::{HandlerError, Response};

    fn body(reply: Option<Reply>) -> String {
        let response = reply.expect("expected a reply").into_response();
        response.body_text().unwrap_or_default().to_string()
    }

    fn number_resolver(
        _: &HandlerMeta,
        slot: &Slot,
        _: &Captures,
        _: &Request,
    ) -> Result<Resolved, HandlerError> {
        if slot.is::<i64>() {
            return Ok(Box::new(8i64));
        }
        Err(HandlerError::msg(format!("unhandled {}", slot.type_name())))
    }

    fn text_coercer(_: &HandlerMeta, value: RawValue) -> Result<Reply, HandlerError> {
        match value.downcast::<String>() {
            Ok(s) => Ok(Response::text(s).into()),
            Err(value) => Err(HandlerError::msg(format!("unhandled {}", value.type_name()))),
        }
    }

    #[test]
    fn test_method_and_path_select_route() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let (c1, c2, c3) = (calls.clone(), calls.clone(), calls.clone());

        let dispatcher = Dispatcher::builder()
            .route("GET", "/", move || {
                c1.lock().unwrap().push("H1");
                Response::text("root")
            })
            .route("GET", "/greet", move || {
                c2.lock().unwrap().push("H2");
                Response::text("hello")
            })
            .route("POST", "/greet", move || {
                c3.lock().unwrap().push("H3");
                Response::text("posted")
            })
            .build()
            .unwrap();
        assert_eq!(dispatcher.route_count(), 3);

        assert_eq!(body(dispatcher.dispatch(Request::new("GET", "/greet")).unwrap()), "hello");
        assert_eq!(*calls.lock().unwrap(), ["H2"]);

        calls.lock().unwrap().clear();
        assert_eq!(body(dispatcher.dispatch(Request::new("POST", "/greet")).unwrap()), "posted");
        assert_eq!(*calls.lock().unwrap(), ["H3"]);

        calls.lock().unwrap().clear();
        assert!(dispatcher.dispatch(Request::new("GET", "/other")).unwrap().is_none());
        assert!(calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_query_string_ignored_for_matching() {
        let dispatcher = Dispatcher::builder()
            .route("GET", "/greet", |request: Arc<Request>| {
                Response::text(request.query().unwrap_or_default().to_string())
            })
            .build()
            .unwrap();

        let reply = dispatcher.dispatch(Request::new("GET", "/greet?name=ada")).unwrap();
        assert_eq!(body(reply), "name=ada");
    }

    #[test]
    fn test_resolver_supplies_number() {
        let dispatcher = Dispatcher::builder()
            .resolver(number_resolver)
            .route("GET", "/n", |n: i64| Response::text(n.to_string()))
            .build()
            .unwrap();

        assert_eq!(body(dispatcher.dispatch(Request::new("GET", "/n")).unwrap()), "8");
    }

    #[test]
    fn test_missing_resolver_fails_without_call() {
        let called = Arc::new(AtomicUsize::new(0));
        let counter = called.clone();
        let dispatcher = Dispatcher::builder()
            .route("GET", "/n", move |_: i64| {
                counter.fetch_add(1, Ordering::SeqCst);
                Response::ok()
            })
            .build()
            .unwrap();

        let err = dispatcher.dispatch(Request::new("GET", "/n")).unwrap_err();
        assert!(matches!(err, DispatchError::UnresolvableParameter { index: 0, .. }));
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_named_capture_reaches_resolver() {
        let resolver = |_: &HandlerMeta,
                        slot: &Slot,
                        captures: &Captures,
                        _: &Request|
         -> Result<Resolved, HandlerError> {
            if slot.is::<String>() {
                let path = captures.name("path").unwrap_or_default().to_string();
                return Ok(Box::new(path));
            }
            Err(HandlerError::msg("unhandled"))
        };
        let dispatcher = Dispatcher::builder()
            .resolver(resolver)
            .route("GET", "/(?<path>.+)", |path: String| Response::text(path))
            .build()
            .unwrap();

        let reply = dispatcher.dispatch(Request::new("GET", "/apple")).unwrap();
        assert_eq!(body(reply), "apple");
    }

    #[test]
    fn test_request_slot_is_dispatched_instance() {
        let seen = Arc::new(Mutex::new(None));
        let sink = seen.clone();
        let dispatcher = Dispatcher::builder()
            .route("GET", "/", move |request: Arc<Request>| {
                *sink.lock().unwrap() = Some(request);
                Response::ok()
            })
            .build()
            .unwrap();

        let request = Arc::new(Request::new("GET", "/"));
        dispatcher.dispatch(Arc::clone(&request)).unwrap();

        let seen = seen.lock().unwrap().take().unwrap();
        assert!(Arc::ptr_eq(&seen, &request));
    }

    #[test]
    fn test_first_reply_wins() {
        let later = Arc::new(AtomicUsize::new(0));
        let counter = later.clone();
        let dispatcher = Dispatcher::builder()
            .route("GET", "/x", || Response::text("first"))
            .route("GET", "/.*", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Response::text("second")
            })
            .build()
            .unwrap();

        assert_eq!(body(dispatcher.dispatch(Request::new("GET", "/x")).unwrap()), "first");
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_decline_continues_scan() {
        let dispatcher = Dispatcher::builder()
            .route("GET", "/x", || None::<Response>)
            .route("GET", "/x", || ())
            .route("GET", "/x", || Response::text("third"))
            .build()
            .unwrap();

        assert_eq!(body(dispatcher.dispatch(Request::new("GET", "/x")).unwrap()), "third");
    }

    #[test]
    fn test_all_declined_is_no_match() {
        let dispatcher = Dispatcher::builder()
            .route("GET", "/x", || ())
            .build()
            .unwrap();
        assert!(dispatcher.dispatch(Request::new("GET", "/x")).unwrap().is_none());
    }

    #[test]
    fn test_empty_table_is_no_match() {
        let dispatcher = Dispatcher::default();
        assert_eq!(dispatcher.route_count(), 0);
        assert!(dispatcher.dispatch(Request::new("GET", "/")).unwrap().is_none());
    }

    #[test]
    fn test_uncoercible_result_fails() {
        let dispatcher = Dispatcher::builder()
            .route("GET", "/s", || String::from("Hello, world"))
            .build()
            .unwrap();

        let err = dispatcher.dispatch(Request::new("GET", "/s")).unwrap_err();
        assert!(matches!(
            err,
            DispatchError::UncoercibleResult {
                type_name: "alloc::string::String",
                ..
            }
        ));
    }

    #[test]
    fn test_coercer_converts_raw_value() {
        let dispatcher = Dispatcher::builder()
            .coercer(text_coercer)
            .route("GET", "/s", || String::from("Hello, world"))
            .route("GET", "/n", || Raw(5u8))
            .build()
            .unwrap();

        assert_eq!(
            body(dispatcher.dispatch(Request::new("GET", "/s")).unwrap()),
            "Hello, world"
        );
        let err = dispatcher.dispatch(Request::new("GET", "/n")).unwrap_err();
        assert!(matches!(err, DispatchError::Coercer { type_name: "u8", .. }));
    }

    #[test]
    fn test_reply_failure_becomes_result() {
        let later = Arc::new(AtomicUsize::new(0));
        let counter = later.clone();
        let dispatcher = Dispatcher::builder()
            .route("GET", "/", || -> Result<Response, HandlerError> {
                Err(Response::new(403, "Forbidden").into())
            })
            .route("GET", "/", move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Response::ok()
            })
            .build()
            .unwrap();

        let reply = dispatcher.dispatch(Request::new("GET", "/")).unwrap().unwrap();
        assert_eq!(reply.into_response().status(), 403);
        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_extension_reply_failures_become_result() {
        let later = Arc::new(AtomicUsize::new(0));
        let (c1, c2) = (later.clone(), later.clone());
        let dispatcher = Dispatcher::builder()
            .resolver(
                |_: &HandlerMeta,
                 _: &Slot,
                 _: &Captures,
                 _: &Request|
                 -> Result<Resolved, HandlerError> {
                    Err(Response::new(400, "Bad Request").into())
                },
            )
            .coercer(|_: &HandlerMeta, _: RawValue| -> Result<Reply, HandlerError> {
                Err(Response::new(406, "Not Acceptable").into())
            })
            .route("GET", "/resolve", |_: i64| Response::ok())
            .route("GET", "/resolve", move || {
                c1.fetch_add(1, Ordering::SeqCst);
                Response::ok()
            })
            .route("GET", "/coerce", || String::from("unsent"))
            .route("GET", "/coerce", move || {
                c2.fetch_add(1, Ordering::SeqCst);
                Response::ok()
            })
            .build()
            .unwrap();

        let reply = dispatcher.dispatch(Request::new("GET", "/resolve")).unwrap().unwrap();
        assert_eq!(reply.into_response().status(), 400);

        let reply = dispatcher.dispatch(Request::new("GET", "/coerce")).unwrap().unwrap();
        assert_eq!(reply.into_response().status(), 406);

        assert_eq!(later.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_plain_failure_stops_scan() {
        let dispatcher = Dispatcher::builder()
            .route("GET", "/", || -> Result<Response, HandlerError> {
                Err(HandlerError::msg("exploded"))
            })
            .route("GET", "/", || Response::ok())
            .build()
            .unwrap();

        let err = dispatcher.dispatch(Request::new("GET", "/")).unwrap_err();
        assert!(matches!(err, DispatchError::Handler { .. }));
    }

    #[test]
    fn test_shared_handler_across_declarations() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let dispatcher = Dispatcher::builder()
            .routes(
                &[("GET", "/greet"), ("POST", "/greet")],
                move |request: Arc<Request>| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Response::text(request.method().to_string())
                },
            )
            .route("GET", "/other", || Response::ok())
            .build()
            .unwrap();

        let routes = dispatcher.routes();
        assert_eq!(routes.len(), 3);
        assert!(routes[0].boxed_handler().ptr_eq(routes[1].boxed_handler()));
        assert!(!routes[1].boxed_handler().ptr_eq(routes[2].boxed_handler()));

        assert_eq!(body(dispatcher.dispatch(Request::new("POST", "/greet")).unwrap()), "POST");
        assert_eq!(body(dispatcher.dispatch(Request::new("GET", "/greet")).unwrap()), "GET");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_enumerated_order_kept() {
        let decls = vec![
            RouteDecl::handler("GET", "/a", || Response::text("a")),
            RouteDecl::handler("GET", "/.*", || Response::text("any")),
        ];
        let dispatcher = Dispatcher::builder()
            .enumerate(&decls)
            .route("GET", "/b", || Response::text("b"))
            .build()
            .unwrap();

        let sources: Vec<_> = dispatcher
            .routes()
            .iter()
            .map(|r| r.pattern().source().to_string())
            .collect();
        assert_eq!(sources, ["/a", "/.*", "/b"]);
        assert_eq!(body(dispatcher.dispatch(Request::new("GET", "/b")).unwrap()), "any");
    }

    #[test]
    fn test_invalid_pattern_fails_build() {
        let err = Dispatcher::builder()
            .route("GET", "/ok", || Response::ok())
            .route("GET", "/(", || Response::ok())
            .build()
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { ref pattern, .. } if pattern == "/("));

        let err = Dispatcher::builder()
            .route("GET", "/a)|(/b", || Response::ok())
            .build()
            .unwrap_err();
        assert!(matches!(err, RouteError::InvalidPattern { ref pattern, .. } if pattern == "/a)|(/b"));
    }

    #[test]
    fn test_concurrent_dispatch() {
        let dispatcher = Dispatcher::builder()
            .resolver(number_resolver)
            .route("GET", r"/echo/(?<n>\d+)", |captures: Captures, n: i64| {
                Response::text(format!("{}:{n}", captures.name("n").unwrap_or_default()))
            })
            .build()
            .unwrap();

        std::thread::scope(|scope| {
            for i in 0..8 {
                let dispatcher = &dispatcher;
                scope.spawn(move || {
                    for _ in 0..50 {
                        let reply = dispatcher
                            .dispatch(Request::new("GET", format!("/echo/{i}")))
                            .unwrap();
                        assert_eq!(body(reply), format!("{i}:8"));
                    }
                });
            }
        });
    }

    #[test]
    fn test_tower_service() {
        use tower::ServiceExt;

        let dispatcher = Dispatcher::builder()
            .route("GET", "/", || Response::text("served"))
            .build()
            .unwrap();

        let reply = tokio_test::block_on(dispatcher.clone().oneshot(Request::new("GET", "/")))
            .unwrap();
        assert_eq!(body(reply), "served");

        let missing =
            tokio_test::block_on(dispatcher.oneshot(Request::new("GET", "/nope"))).unwrap();
        assert!(missing.is_none());
    }
}
