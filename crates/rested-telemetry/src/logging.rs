//! Structured logging.
//!
//! Dispatch emits `tracing` events inside a `dispatch` span carrying the
//! resource, verb and targeting. This module installs a subscriber that
//! renders them as JSON lines or as pretty, human-readable output.
//!
//! # Example
//!
//! ```rust,ignore
//! use rested_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::development())?;
//! tracing::info!(resource = "users", "endpoint ready");
//! ```

use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::error::TelemetryError;
use crate::TelemetryResult;

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human-readable output.
    Pretty,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// Whether logging is installed at all.
    pub enabled: bool,

    /// Filter directive (e.g. `"info"` or `"info,rested_endpoint=debug"`).
    pub level: String,

    /// Output format.
    pub format: LogFormat,

    /// Whether span open/close events are logged.
    pub span_events: bool,

    /// Whether file and line are included.
    pub file_line_info: bool,

    /// Whether the module path is included.
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            span_events: false,
            file_line_info: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Human-readable output with dispatch spans visible.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            span_events: true,
            file_line_info: true,
            include_target: true,
        }
    }

    /// JSON output at `info`.
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}

/// Checks that `directive` is a valid filter.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] with the parser message.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| TelemetryError::InvalidFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

/// Installs the global subscriber.
///
/// Does nothing when `config.enabled` is false.
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] for a bad directive and
/// [`TelemetryError::LoggingInit`] if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    match config.format {
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_events(span_events)
                .with_file(config.file_line_info)
                .with_line_number(config.file_line_info)
                .with_target(config.include_target)
                .with_filter(filter);

            tracing_subscriber::registry()
                .with(fmt_layer)
                .try_init()
                .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        }
        LogFormat::Pretty => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .pretty()
                .with_span_events(span_events)
                .with_file(config.file_line_info)
                .with_line_number(config.file_line_info)
                .with_target(config.include_target)
                .with_filter(filter);

            tracing_subscriber::registry()
                .with(fmt_layer)
                .try_init()
                .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
        }
    }

    Ok(())
}

/// Standard field names used by rested log events.
pub mod fields {
    /// Resource name.
    pub const RESOURCE: &str = "resource";

    /// Normalized verb.
    pub const METHOD: &str = "method";

    /// `item` or `collection`.
    pub const TARGET: &str = "target";

    /// Path suffix of a resolved custom action.
    pub const ACTION: &str = "action";

    /// Status of the produced result.
    pub const STATUS: &str = "status";

    /// Error message.
    pub const ERROR: &str = "error";
}
