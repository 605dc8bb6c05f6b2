//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use rested_core::FilterSyntax;
use rested_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// Endpoint dispatch configuration section.
///
/// # Example
///
/// ```
/// use rested_config::EndpointConfig;
///
/// let config = EndpointConfig {
///     protected: true,
///     ..Default::default()
/// };
/// assert_eq!(config.action_param, "action");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    /// Authorization flag handed to the hook for default CRUD operations.
    /// Custom actions carry their own flag.
    #[serde(default)]
    pub protected: bool,

    /// Path parameter holding the path left after the resource.
    #[serde(default = "default_action_param")]
    pub action_param: String,

    /// Emit an `Allow` header on OPTIONS results.
    #[serde(default = "default_true")]
    pub allow_header: bool,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            protected: false,
            action_param: default_action_param(),
            allow_header: true,
        }
    }
}

fn default_action_param() -> String {
    "action".to_string()
}

fn default_true() -> bool {
    true
}

/// Filter query-string grammar section.
///
/// An empty `reserved_prefix` turns every parameter except `_fields` into a
/// filter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Separator between field name and operator token.
    #[serde(default = "default_separator")]
    pub separator: String,

    /// Separator between `in` list elements.
    #[serde(default = "default_list_delimiter")]
    pub list_delimiter: String,

    /// Prefix of control parameters that never become filters.
    #[serde(default = "default_reserved_prefix")]
    pub reserved_prefix: String,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            separator: default_separator(),
            list_delimiter: default_list_delimiter(),
            reserved_prefix: default_reserved_prefix(),
        }
    }
}

fn default_separator() -> String {
    "__".to_string()
}

fn default_list_delimiter() -> String {
    ",".to_string()
}

fn default_reserved_prefix() -> String {
    "_".to_string()
}

impl FilterConfig {
    /// The parser grammar described by this section.
    #[must_use]
    pub fn syntax(&self) -> FilterSyntax {
        FilterSyntax {
            separator: self.separator.clone(),
            list_delimiter: self.list_delimiter.clone(),
            reserved_prefix: if self.reserved_prefix.is_empty() {
                None
            } else {
                Some(self.reserved_prefix.clone())
            },
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (trace, debug, info, warn, error, or per-target).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Log span open and close events.
    #[serde(default)]
    pub span_events: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            span_events: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl LoggingConfig {
    /// Converts the section into a subscriber configuration.
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            span_events: self.span_events,
            file_line_info: self.include_location,
            include_target: true,
        }
    }
}
