//! Route declarations and route entries.
//!
//! A [`RouteDecl`] is what a route enumerator produces: an uncompiled
//! `(method, pattern, handler)` triple. A [`Route`] is the compiled, immutable
//! entry stored in a dispatcher.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use switchyard_core::{Reply, Request};

use crate::coercer::{self, ResponseCoercer};
use crate::error::{DispatchResult, RouteError};
use crate::handler::{BoxedHandler, Handler, HandlerMeta, into_handler};
use crate::pattern::{Captures, Pattern};
use crate::resolver::{Invocation, ParameterResolver};

/// An uncompiled route declaration.
#[derive(Clone)]
pub struct RouteDecl {
    method: String,
    pattern: String,
    handler: BoxedHandler,
}

impl RouteDecl {
    /// Declares a route for an already boxed handler.
    pub fn new(
        method: impl Into<String>,
        pattern: impl Into<String>,
        handler: BoxedHandler,
    ) -> Self {
        Self {
            method: method.into(),
            pattern: pattern.into(),
            handler,
        }
    }

    /// Declares a route for a handler function.
    pub fn handler<F, T>(method: impl Into<String>, pattern: impl Into<String>, f: F) -> Self
    where
        F: Handler<T>,
        T: 'static,
    {
        Self::new(method, pattern, into_handler(f))
    }

    /// The declared method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The declared pattern source.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The declared handler.
    pub fn boxed_handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// Compiles this declaration into a route entry.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if the pattern does not compile.
    pub fn compile(self) -> Result<Route, RouteError> {
        Ok(Route {
            pattern: Pattern::new(self.method, self.pattern)?,
            handler: self.handler,
        })
    }
}

impl fmt::Debug for RouteDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteDecl")
            .field("method", &self.method)
            .field("pattern", &self.pattern)
            .field("handler", &self.handler.meta().name())
            .finish()
    }
}

/// A source of ordered route declarations.
///
/// This is the boundary to however an application describes its routes. The
/// dispatcher keeps the returned order verbatim.
pub trait RouteEnumerator {
    /// Returns the declarations in priority order.
    fn routes(&self) -> Vec<RouteDecl>;
}

impl RouteEnumerator for [RouteDecl] {
    fn routes(&self) -> Vec<RouteDecl> {
        self.to_vec()
    }
}

impl RouteEnumerator for Vec<RouteDecl> {
    fn routes(&self) -> Vec<RouteDecl> {
        self.clone()
    }
}

impl<F> RouteEnumerator for F
where
    F: Fn() -> Vec<RouteDecl>,
{
    fn routes(&self) -> Vec<RouteDecl> {
        (self)()
    }
}

/// A compiled route entry.
///
/// Immutable once built. The handler may be shared with other entries.
#[derive(Clone)]
pub struct Route {
    pattern: Pattern,
    handler: BoxedHandler,
}

impl Route {
    /// Compiles a route entry directly.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidPattern`] if the pattern does not compile.
    pub fn new(
        method: impl Into<String>,
        pattern: impl Into<String>,
        handler: BoxedHandler,
    ) -> Result<Self, RouteError> {
        RouteDecl::new(method, pattern, handler).compile()
    }

    /// The method this route accepts.
    pub fn method(&self) -> &str {
        self.pattern.method()
    }

    /// The compiled pattern.
    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    /// Metadata of the handler.
    pub fn handler(&self) -> &HandlerMeta {
        self.handler.meta()
    }

    /// The boxed handler this route invokes.
    pub fn boxed_handler(&self) -> &BoxedHandler {
        &self.handler
    }

    /// Tests the route against a request, returning the captures on success.
    pub fn matches(&self, request: &Request) -> Option<Captures> {
        self.pattern.captures(request.method(), request.path())
    }

    /// Resolves parameters, calls the handler and coerces its result.
    ///
    /// `Ok(None)` means the handler declined.
    pub fn invoke(
        &self,
        request: &Arc<Request>,
        captures: &Captures,
        resolver: Option<&dyn ParameterResolver>,
        coercer: Option<&dyn ResponseCoercer>,
    ) -> DispatchResult<Option<Reply>> {
        let meta = self.handler.meta();
        trace!(
            handler = meta.name(),
            slots = meta.slots().len(),
            "Invoking route handler"
        );

        let invocation = Invocation::new(meta, request, captures, resolver);
        let output = self.handler.call(&invocation)?;
        coercer::coerce(output, meta, coercer)
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.pattern.method())
            .field("pattern", &self.pattern.source())
            .field("handler", &self.handler.meta().name())
            .finish()
    }
}
