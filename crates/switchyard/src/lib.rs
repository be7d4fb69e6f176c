//! # Switchyard
//!
//! A synchronous, first-match-wins request dispatcher that sits between an
//! HTTP transport and plain Rust handler functions.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐ Request  ┌─────────┐      ┌────────────┐ slots  ┌──────────┐
//! │ Transport │─────────▶│ Cascade │─────▶│ Dispatcher │───────▶│ Handler  │
//! │           │◀─────────│         │◀─────│            │◀───────│          │
//! └───────────┘ Response └─────────┘ Reply└────────────┘ value  └──────────┘
//!                                          │        ▲
//!                                 resolver ▼        │ coercer
//! ```
//!
//! - **Core**: request, response and error value types
//! - **Framework**: patterns, handlers, parameter resolution, response
//!   coercion and the dispatcher itself
//! - **Runtime**: configuration, logging, fallback composition and a standard
//!   coercer
//!
//! ## Quick Start
//!
//! ```rust
//! use switchyard::prelude::*;
//!
//! fn root() -> Response {
//!     Response::text("root")
//! }
//!
//! fn greet(request: Arc<Request>) -> String {
//!     format!("hello via {}", request.method())
//! }
//!
//! let api = Dispatcher::builder()
//!     .coercer(StandardCoercer)
//!     .enumerate(&routes! {
//!         GET "/" => root,
//!         GET | POST "/greet" => greet,
//!     })
//!     .build()
//!     .unwrap();
//!
//! let cascade = Cascade::default().with(api);
//!
//! assert_eq!(cascade.handle(Request::new("POST", "/greet")).body_text(), Some("hello via POST"));
//! assert_eq!(cascade.handle(Request::new("GET", "/other")).status(), 404);
//! ```
//!
//! ## Features
//!
//! - `toml-config`: TOML configuration files (default)
//! - `yaml-config`: YAML configuration files
//! - `json-log`: JSON log output

pub use switchyard_core as core;
pub use switchyard_framework as framework;
pub use switchyard_runtime as runtime;

pub use switchyard_framework::routes;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use switchyard::prelude::*;
/// ```
pub mod prelude {
    pub use std::sync::Arc;

    // Values crossing the transport boundary
    pub use switchyard_core::{HandlerError, HandlerResult, IntoResponse, Reply, Request, Response};

    // Dispatch engine
    pub use switchyard_framework::{
        Captures, DispatchError, Dispatcher, HandlerMeta, ParameterResolver, Raw, RawValue,
        Resolved, ResponseCoercer, RouteDecl, RouteEnumerator, Slot, routes,
    };

    // Runtime
    pub use switchyard_runtime::config::{ConfigLoader, validate_config};
    pub use switchyard_runtime::{Cascade, StandardCoercer, SwitchyardConfig};
}
