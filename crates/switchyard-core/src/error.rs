//! Failures raised by handlers and extensions.

use thiserror::Error;

use crate::response::{IntoResponse, Reply, Response};

/// A boxed, thread-safe error.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// A failure raised by a handler, a parameter resolver or a response coercer.
///
/// The [`Reply`](HandlerError::Reply) variant satisfies the producible-response
/// contract: the dispatcher turns it into the dispatch result instead of
/// propagating it. This is how handler code signals a structured 4xx/5xx
/// without returning a response value.
///
/// # Example
///
/// ```rust
/// use switchyard_core::{HandlerError, Response};
///
/// fn load(id: &str) -> Result<String, HandlerError> {
///     if id.is_empty() {
///         return Err(Response::new(400, "Bad Request").into());
///     }
///     Ok(id.to_string())
/// }
///
/// assert!(load("").unwrap_err().into_reply().is_ok());
/// ```
#[derive(Debug, Error)]
pub enum HandlerError {
    /// A failure that carries the response to send.
    #[error("request answered with an error reply")]
    Reply(Reply),

    /// Any other failure.
    #[error(transparent)]
    Other(BoxError),
}

impl HandlerError {
    /// Creates a failure that carries a response.
    pub fn reply(response: impl IntoResponse) -> Self {
        Self::Reply(Reply::new(response))
    }

    /// Wraps an arbitrary error.
    pub fn other(err: impl Into<BoxError>) -> Self {
        Self::Other(err.into())
    }

    /// Creates a failure from a message.
    pub fn msg(msg: impl Into<String>) -> Self {
        let msg: String = msg.into();
        Self::Other(msg.into())
    }

    /// Returns `true` if this failure carries a reply.
    pub fn is_reply(&self) -> bool {
        matches!(self, Self::Reply(_))
    }

    /// Extracts the carried reply, or gives the error back.
    pub fn into_reply(self) -> Result<Reply, Self> {
        match self {
            Self::Reply(reply) => Ok(reply),
            other => Err(other),
        }
    }
}

impl From<Response> for HandlerError {
    fn from(response: Response) -> Self {
        Self::Reply(Reply::from(response))
    }
}

impl From<Reply> for HandlerError {
    fn from(reply: Reply) -> Self {
        Self::Reply(reply)
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

/// Result type for handler code.
pub type HandlerResult<T> = Result<T, HandlerError>;
