//! Main configuration types.
//!
//! This module provides the top-level [`RestedConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{ConfigError, EndpointConfig, FilterConfig, LoggingConfig};

/// Complete rested configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use rested_config::RestedConfig;
///
/// let config = RestedConfig::default();
/// assert!(!config.endpoint.protected);
/// assert_eq!(config.filters.separator, "__");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct RestedConfig {
    /// Endpoint dispatch configuration.
    #[serde(default)]
    pub endpoint: EndpointConfig,

    /// Filter query-string grammar.
    #[serde(default)]
    pub filters: FilterConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl RestedConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> RestedConfigBuilder {
        RestedConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if:
    /// - A filter separator or list delimiter is empty
    /// - The list delimiter equals the separator
    /// - The action parameter name is empty
    /// - The log level is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.filters.separator.is_empty() {
            return Err(ConfigError::invalid_value(
                "filters.separator",
                "must not be empty",
            ));
        }

        if self.filters.list_delimiter.is_empty() {
            return Err(ConfigError::invalid_value(
                "filters.list_delimiter",
                "must not be empty",
            ));
        }

        if self.filters.list_delimiter == self.filters.separator {
            return Err(ConfigError::invalid_value(
                "filters.list_delimiter",
                format!(
                    "must differ from the separator '{}'",
                    self.filters.separator
                ),
            ));
        }

        if self.endpoint.action_param.is_empty() {
            return Err(ConfigError::invalid_value(
                "endpoint.action_param",
                "must not be empty",
            ));
        }

        if let Err(e) = rested_telemetry::create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", e.to_string()));
        }

        Ok(())
    }

    /// Development preset: pretty debug logging with span events.
    ///
    /// # Example
    ///
    /// ```
    /// use rested_config::RestedConfig;
    ///
    /// let config = RestedConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = rested_telemetry::LogFormat::Pretty;
        config.logging.span_events = true;
        config.logging.include_location = true;

        config
    }

    /// Production preset: JSON logging at info and protected endpoints.
    ///
    /// # Example
    ///
    /// ```
    /// use rested_config::RestedConfig;
    ///
    /// let config = RestedConfig::production();
    /// assert!(config.endpoint.protected);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = rested_telemetry::LogFormat::Json;

        config.endpoint.protected = true;

        config
    }
}

/// Builder for [`RestedConfig`].
#[derive(Debug, Default)]
pub struct RestedConfigBuilder {
    endpoint: Option<EndpointConfig>,
    filters: Option<FilterConfig>,
    logging: Option<LoggingConfig>,
}

impl RestedConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the endpoint configuration.
    #[must_use]
    pub fn endpoint(mut self, endpoint: EndpointConfig) -> Self {
        self.endpoint = Some(endpoint);
        self
    }

    /// Set the filter grammar.
    #[must_use]
    pub fn filters(mut self, filters: FilterConfig) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration. Unset sections use their defaults.
    #[must_use]
    pub fn build(self) -> RestedConfig {
        RestedConfig {
            endpoint: self.endpoint.unwrap_or_default(),
            filters: self.filters.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<RestedConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = RestedConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.endpoint.action_param, "action");
    }

    #[test]
    fn test_builder_sections() {
        let config = RestedConfig::builder()
            .endpoint(EndpointConfig {
                protected: true,
                ..Default::default()
            })
            .build();

        assert!(config.endpoint.protected);
        assert_eq!(config.filters, FilterConfig::default());
    }

    #[test]
    fn test_validate_empty_separator() {
        let result = RestedConfig::builder()
            .filters(FilterConfig {
                separator: String::new(),
                ..Default::default()
            })
            .build_validated();

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "filters.separator"
        ));
    }

    #[test]
    fn test_validate_delimiter_equals_separator() {
        let config = RestedConfig::builder()
            .filters(FilterConfig {
                separator: ",".to_string(),
                list_delimiter: ",".to_string(),
                ..Default::default()
            })
            .build();

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("filters.list_delimiter"));
    }

    #[test]
    fn test_validate_empty_action_param() {
        let mut config = RestedConfig::default();
        config.endpoint.action_param = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_log_level() {
        let mut config = RestedConfig::default();
        config.logging.level = "rested=loud".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("logging.level"));
    }

    #[test]
    fn test_presets() {
        let dev = RestedConfig::development();
        assert!(dev.logging.span_events);
        assert!(dev.validate().is_ok());

        let prod = RestedConfig::production();
        assert!(prod.endpoint.protected);
        assert_eq!(prod.logging.format, rested_telemetry::LogFormat::Json);
    }

    #[test]
    fn test_serde_roundtrip_toml() {
        let config = RestedConfig::development();
        let text = toml::to_string(&config).unwrap();
        let parsed: RestedConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }
}
