//! The inbound request value.

/// A single header line.
///
/// Names keep the casing they were received with; lookups through
/// [`Request::header`] and [`Response::header`](crate::Response::header)
/// compare names case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name as received.
    pub name: String,
    /// Header value.
    pub value: String,
}

impl Header {
    /// Creates a new header.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An HTTP request as delivered by the transport layer.
///
/// The dispatcher only looks at [`method`](Self::method) and
/// [`path`](Self::path). Everything else is carried for handlers and
/// parameter-resolver extensions.
///
/// # Example
///
/// ```rust
/// use switchyard_core::Request;
///
/// let request = Request::new("POST", "/greet?lang=en")
///     .with_header("Content-Type", "text/plain")
///     .with_body("hi");
///
/// assert_eq!(request.path(), "/greet");
/// assert_eq!(request.query(), Some("lang=en"));
/// assert_eq!(request.header("content-type"), Some("text/plain"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    uri: String,
    version: String,
    headers: Vec<Header>,
    body: Vec<u8>,
}

impl Request {
    /// Creates a request with no headers, an empty body and version `HTTP/1.1`.
    pub fn new(method: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            uri: uri.into(),
            version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Sets the protocol version string.
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
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

    /// The request method, exactly as received.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The full request target, including any query string.
    pub fn uri(&self) -> &str {
        &self.uri
    }

    /// The request target without its query string.
    ///
    /// This is what route patterns are matched against.
    pub fn path(&self) -> &str {
        match self.uri.split_once('?') {
            Some((path, _)) => path,
            None => &self.uri,
        }
    }

    /// The query string, without the leading `?`.
    pub fn query(&self) -> Option<&str> {
        self.uri.split_once('?').map(|(_, query)| query)
    }

    /// The protocol version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// All headers in the order they were received.
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

    /// The raw request body.
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
