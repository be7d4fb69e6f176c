//! # Switchyard Core
//!
//! Foundation types shared by every layer of Switchyard.
//!
//! The dispatch engine sits between an HTTP transport and application handler
//! code. This crate defines the values that cross those two boundaries:
//!
//! - [`Request`]: the parsed request handed over by the transport
//! - [`Response`]: the transport-level response value
//! - [`IntoResponse`] and [`Reply`]: the "producible response" contract
//! - [`HandlerError`]: failures raised by handlers and extensions, which may
//!   themselves carry a reply
//!
//! ```text
//! ┌───────────┐ Request  ┌────────────┐  args   ┌──────────┐
//! │ Transport │─────────▶│ Dispatcher │────────▶│ Handler  │
//! │           │◀─────────│            │◀────────│          │
//! └───────────┘  Reply   └────────────┘  value  └──────────┘
//! ```

pub mod error;
pub mod request;
pub mod response;

pub use error::{BoxError, HandlerError, HandlerResult};
pub use request::{Header, Request};
pub use response::{IntoResponse, Reply, Response};
