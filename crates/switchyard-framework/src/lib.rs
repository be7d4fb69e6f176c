//! # Switchyard Framework
//!
//! The dispatch engine: an ordered route table matched by method and full
//! path, handlers with declared parameter slots, and two optional extension
//! points.
//!
//! This layer provides:
//! - [`Pattern`] and [`Captures`] for anchored method + path matching
//! - The [`Handler`] trait, implemented for plain functions and closures
//! - [`ParameterResolver`] for slots with no built-in binding
//! - [`ResponseCoercer`] for return values with no built-in coercion
//! - [`Dispatcher`], which walks the route table first-match-wins
//! - The [`routes!`] macro and [`RouteEnumerator`] for declaring route tables
//!
//! ```rust
//! use std::sync::Arc;
//! use switchyard_core::{Request, Response};
//! use switchyard_framework::Dispatcher;
//!
//! let dispatcher = Dispatcher::builder()
//!     .route("GET", "/", || Response::text("root"))
//!     .routes(&[("GET", "/greet"), ("POST", "/greet")], |req: Arc<Request>| {
//!         Response::text(format!("{} greet", req.method()))
//!     })
//!     .build()
//!     .unwrap();
//!
//! let reply = dispatcher.dispatch(Request::new("POST", "/greet")).unwrap().unwrap();
//! assert_eq!(reply.into_response().body_text(), Some("POST greet"));
//!
//! assert!(dispatcher.dispatch(Request::new("GET", "/other")).unwrap().is_none());
//! ```

pub mod coercer;
pub mod dispatcher;
pub mod error;
pub mod handler;
mod macros;
pub mod pattern;
pub mod resolver;
pub mod route;

pub use coercer::{IntoOutput, Output, Raw, RawValue, ResponseCoercer};
pub use dispatcher::{Dispatcher, DispatcherBuilder};
pub use error::{DispatchError, DispatchResult, RouteError};
pub use handler::{BoxedHandler, Handler, HandlerMeta, into_handler};
pub use pattern::{Captures, Pattern};
pub use resolver::{Invocation, ParameterResolver, Resolved, Slot};
pub use route::{Route, RouteDecl, RouteEnumerator};
