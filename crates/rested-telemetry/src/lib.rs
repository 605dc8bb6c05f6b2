//! Diagnostics setup for rested.
//!
//! rested libraries only emit `tracing` events; installing a subscriber is
//! the application's call. [`init_logging`] does that from a [`LogConfig`],
//! and [`logging::fields`] names the fields dispatch logs carry.

#![doc(html_root_url = "https://docs.rs/rested-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, fields, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
