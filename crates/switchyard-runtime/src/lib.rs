//! Switchyard Runtime - configuration, logging and fallback composition.
//!
//! This crate provides:
//! - Layered configuration loading and validation (`config`)
//! - `tracing` subscriber setup driven by that configuration (`logging`)
//! - [`Cascade`], which chains dispatchers and always answers with a response
//! - [`StandardCoercer`], a ready-made response coercer for std and JSON values
//!
//! ```rust,ignore
//! use switchyard_runtime::config::{load_config, validate_config};
//! use switchyard_runtime::{Cascade, StandardCoercer, logging};
//!
//! let config = load_config()?;
//! validate_config(&config)?;
//! logging::init_from_config(&config.logging);
//!
//! let api = Dispatcher::builder()
//!     .coercer(StandardCoercer)
//!     .enumerate(&routes! { GET "/" => root })
//!     .build()?;
//!
//! let cascade = Cascade::from_config(&config).with(api);
//! let response = cascade.handle(request);
//! ```

pub mod cascade;
pub mod coercers;
pub mod config;
pub mod logging;

// Re-exports
pub use cascade::Cascade;
pub use coercers::StandardCoercer;
pub use config::{
    ConfigError, ConfigLoader, ConfigResult, FallbackConfig, LoggingConfig, SwitchyardConfig,
};
pub use logging::{LoggingBuilder, LoggingError, SpanEvents};

// Re-export tracing for use by other crates
pub use tracing;
pub use tracing_subscriber;

/// Prelude module for convenient imports.
///
/// This provides the commonly used logging macros plus `Level` and
/// `instrument`.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
