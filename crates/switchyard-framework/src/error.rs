//! Error types for the dispatch engine.

use thiserror::Error;

use switchyard_core::{HandlerError, Reply};

/// Errors raised while building a dispatcher.
///
/// These are fatal: a route table with a bad route is never built.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A route pattern failed to compile.
    #[error("invalid pattern `{pattern}` for {method} route: {source}")]
    InvalidPattern {
        /// Method of the offending route.
        method: String,
        /// Pattern source as declared.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while dispatching a request.
///
/// Each variant names the handler it occurred in. Variants wrapping a
/// [`HandlerError`] may carry a reply; see [`DispatchError::into_reply`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A slot has no built-in binding and no resolver is configured.
    #[error("cannot provide parameter #{index} ({type_name}) to handler `{handler}`")]
    UnresolvableParameter {
        /// Handler name.
        handler: String,
        /// Zero-based slot index.
        index: usize,
        /// Declared slot type.
        type_name: &'static str,
    },

    /// The resolver produced a value of a different type than the slot declares.
    #[error(
        "parameter resolver returned the wrong type for parameter #{index} ({type_name}) of handler `{handler}`"
    )]
    ParameterTypeMismatch {
        /// Handler name.
        handler: String,
        /// Zero-based slot index.
        index: usize,
        /// Declared slot type.
        type_name: &'static str,
    },

    /// The resolver failed for a slot.
    #[error("parameter resolver failed for parameter #{index} ({type_name}) of handler `{handler}`")]
    Resolver {
        /// Handler name.
        handler: String,
        /// Zero-based slot index.
        index: usize,
        /// Declared slot type.
        type_name: &'static str,
        /// The resolver's failure.
        #[source]
        source: HandlerError,
    },

    /// The handler returned a value that has no built-in coercion and no
    /// coercer is configured.
    #[error("cannot coerce `{type_name}` returned by handler `{handler}` into a response")]
    UncoercibleResult {
        /// Handler name.
        handler: String,
        /// Runtime type of the returned value.
        type_name: &'static str,
    },

    /// The coercer failed.
    #[error("response coercer failed for `{type_name}` returned by handler `{handler}`")]
    Coercer {
        /// Handler name.
        handler: String,
        /// Runtime type of the returned value.
        type_name: &'static str,
        /// The coercer's failure.
        #[source]
        source: HandlerError,
    },

    /// The handler itself failed.
    #[error("handler `{handler}` failed")]
    Handler {
        /// Handler name.
        handler: String,
        /// The handler's failure.
        #[source]
        source: HandlerError,
    },
}

impl DispatchError {
    /// Returns the wrapped [`HandlerError`], if any.
    pub fn handler_error(&self) -> Option<&HandlerError> {
        match self {
            Self::Resolver { source, .. }
            | Self::Coercer { source, .. }
            | Self::Handler { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Returns `true` if this failure carries a reply.
    pub fn is_reply(&self) -> bool {
        self.handler_error().is_some_and(HandlerError::is_reply)
    }

    /// Converts a reply-carrying failure into its reply, or gives the error back.
    ///
    /// This is the single place where the producible-response contract is
    /// checked on the failure path.
    pub fn into_reply(self) -> Result<Reply, Self> {
        match self {
            Self::Resolver {
                source: HandlerError::Reply(reply),
                ..
            }
            | Self::Coercer {
                source: HandlerError::Reply(reply),
                ..
            }
            | Self::Handler {
                source: HandlerError::Reply(reply),
                ..
            } => Ok(reply),
            other => Err(other),
        }
    }
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
