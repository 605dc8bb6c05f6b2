//! Typed configuration for rested endpoints.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Sections
//!
//! - [`EndpointConfig`] - dispatch settings (default authorization flag,
//!   action path parameter, `Allow` header)
//! - [`FilterConfig`] - the `field__operator=value` query grammar
//! - [`LoggingConfig`] - structured logging
//!
//! # Example
//!
//! ```no_run
//! use rested_config::ConfigLoader;
//!
//! # fn main() -> Result<(), rested_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_optional_file("rested.toml")?
//!     .with_env_prefix("RESTED")
//!     .load()?;
//!
//! let syntax = config.filters.syntax();
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [endpoint]
//! protected = true
//! action_param = "action"
//! allow_header = true
//!
//! [filters]
//! separator = "__"
//! list_delimiter = ","
//! reserved_prefix = "_"
//!
//! [logging]
//! enabled = true
//! level = "info,rested_endpoint=debug"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `RESTED__ENDPOINT__PROTECTED=true`
//! - `RESTED__FILTERS__SEPARATOR=.`
//! - `RESTED__LOGGING__FORMAT=pretty`

#![doc(html_root_url = "https://docs.rs/rested-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;

/// Re-exported so callers can name the logging format without a direct dependency.
pub use rested_telemetry::LogFormat;
