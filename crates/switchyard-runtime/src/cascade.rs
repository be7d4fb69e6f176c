//! Fallback composition of dispatchers.
//!
//! A [`Cascade`] asks several dispatchers in turn and always ends with a
//! transport response: the first reply, the configured not-found response, or
//! the configured internal-error response when dispatch fails.

use std::error::Error as _;
use std::sync::Arc;

use tracing::{debug, error};

use switchyard_core::{Request, Response};
use switchyard_framework::{DispatchError, Dispatcher};

use crate::config::{FallbackConfig, SwitchyardConfig};

/// An ordered chain of dispatchers with fallback responses.
#[derive(Debug, Clone, Default)]
pub struct Cascade {
    dispatchers: Vec<Dispatcher>,
    fallback: FallbackConfig,
}

impl Cascade {
    /// Creates an empty cascade with the given fallback responses.
    pub fn new(fallback: FallbackConfig) -> Self {
        Self {
            dispatchers: Vec::new(),
            fallback,
        }
    }

    /// Creates an empty cascade from the loaded configuration.
    pub fn from_config(config: &SwitchyardConfig) -> Self {
        Self::new(config.fallback.clone())
    }

    /// Appends a dispatcher (builder pattern).
    pub fn with(mut self, dispatcher: Dispatcher) -> Self {
        self.dispatchers.push(dispatcher);
        self
    }

    /// Appends a dispatcher.
    pub fn push(&mut self, dispatcher: Dispatcher) {
        self.dispatchers.push(dispatcher);
    }

    /// Returns the number of dispatchers.
    pub fn len(&self) -> usize {
        self.dispatchers.len()
    }

    /// Returns `true` if no dispatcher has been added.
    pub fn is_empty(&self) -> bool {
        self.dispatchers.is_empty()
    }

    /// The fallback responses in use.
    pub fn fallback(&self) -> &FallbackConfig {
        &self.fallback
    }

    /// Asks each dispatcher in order and returns the first reply as a response.
    ///
    /// `Ok(None)` means no dispatcher matched. A failure stops the chain.
    pub fn try_handle(
        &self,
        request: impl Into<Arc<Request>>,
    ) -> Result<Option<Response>, DispatchError> {
        let request = request.into();
        for (index, dispatcher) in self.dispatchers.iter().enumerate() {
            if let Some(reply) = dispatcher.dispatch(Arc::clone(&request))? {
                debug!(dispatcher = index, "Dispatcher produced a reply");
                return Ok(Some(reply.into_response()));
            }
        }
        Ok(None)
    }

    /// Handles a request, always producing a response.
    pub fn handle(&self, request: impl Into<Arc<Request>>) -> Response {
        let request = request.into();
        match self.try_handle(Arc::clone(&request)) {
            Ok(Some(response)) => response,
            Ok(None) => {
                debug!(
                    method = request.method(),
                    path = request.path(),
                    "No dispatcher matched, sending not-found response"
                );
                self.fallback.not_found.to_response()
            }
            Err(err) => {
                let message = error_chain(&err);
                error!(
                    method = request.method(),
                    path = request.path(),
                    error = %message,
                    "Dispatch failed"
                );

                let response = self.fallback.internal_error.to_response();
                if self.fallback.expose_errors {
                    response
                        .with_header("content-type", "text/plain; charset=utf-8")
                        .with_body(message)
                } else {
                    response
                }
            }
        }
    }
}

/// Renders an error with its sources, separated by `: `.
fn error_chain(err: &DispatchError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
