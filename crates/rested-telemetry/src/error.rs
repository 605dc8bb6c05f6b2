//! Telemetry error types.

use thiserror::Error;

/// Errors raised while setting up diagnostics.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed.
    #[error("Invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// The rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber could not be installed.
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),
}
