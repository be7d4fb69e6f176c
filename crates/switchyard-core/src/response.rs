//! Response values and the producible-response contract.
//!
//! Two layers are modelled here:
//!
//! - [`Response`] is the final transport-level value.
//! - [`IntoResponse`] is the capability of producing one. [`Reply`] is the
//!   canonical, type-erased holder of that capability and is what the
//!   dispatcher hands back to its caller.

use std::fmt;

use crate::request::Header;

/// A transport-level HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    reason: String,
    headers: Vec<Header>,
    body: Vec<u8>,
}

impl Response {
    /// Creates a response with no headers and an empty body.
    pub fn new(status: u16, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// An empty `200 OK`.
    pub fn ok() -> Self {
        Self::new(200, "OK")
    }

    /// A `200 OK` with a UTF-8 plain text body.
    pub fn text(body: impl Into<String>) -> Self {
        Self::ok()
            .with_header("Content-Type", "text/plain; charset=utf-8")
            .with_body(body.into())
    }

    /// Appends a header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(name, value));
        self
    }

    /// Replaces the body.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Reason phrase.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// All headers in insertion order.
    pub fn headers(&self) -> &[Header] {
        &self.headers
    }

    /// Returns the first header value with the given name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// The raw body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// The body as UTF-8 text, if it is valid UTF-8.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

/// The producible-response contract.
///
/// Anything that can turn itself into a [`Response`] can be returned from a
/// handler or carried by a [`HandlerError::Reply`](crate::HandlerError::Reply).
/// The method takes `Box<Self>` so the trait stays object safe.
pub trait IntoResponse: Send + Sync + 'static {
    /// Produces the final response.
    fn into_response(self: Box<Self>) -> Response;
}

/// Identity adapter: a response produces itself.
impl IntoResponse for Response {
    fn into_response(self: Box<Self>) -> Response {
        *self
    }
}

struct Lazy<F>(F);

impl<F> IntoResponse for Lazy<F>
where
    F: FnOnce() -> Response + Send + Sync + 'static,
{
    fn into_response(self: Box<Self>) -> Response {
        (self.0)()
    }
}

/// The canonical response representation returned by dispatch.
///
/// A `Reply` wraps any [`IntoResponse`] implementor. The response itself is
/// only materialized when [`into_response`](Reply::into_response) is called,
/// which lets a handler defer expensive rendering until the transport actually
/// writes it out.
///
/// # Example
///
/// ```rust
/// use switchyard_core::{Reply, Response};
///
/// let reply = Reply::lazy(|| Response::text("rendered late"));
/// assert_eq!(reply.into_response().body_text(), Some("rendered late"));
/// ```
pub struct Reply(Box<dyn IntoResponse>);

impl Reply {
    /// Wraps a value satisfying the producible-response contract.
    pub fn new<R: IntoResponse>(response: R) -> Self {
        Self(Box::new(response))
    }

    /// Wraps a closure that builds the response on demand.
    pub fn lazy<F>(f: F) -> Self
    where
        F: FnOnce() -> Response + Send + Sync + 'static,
    {
        Self::new(Lazy(f))
    }

    /// Produces the final transport response.
    pub fn into_response(self) -> Response {
        self.0.into_response()
    }
}

impl IntoResponse for Reply {
    fn into_response(self: Box<Self>) -> Response {
        self.0.into_response()
    }
}

impl From<Response> for Reply {
    fn from(response: Response) -> Self {
        Self::new(response)
    }
}

impl fmt::Debug for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Reply").finish_non_exhaustive()
    }
}
