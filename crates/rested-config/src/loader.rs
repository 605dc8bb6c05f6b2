//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use std::env;
use std::fs;
use std::path::Path;

use rested_telemetry::LogFormat;

use crate::{ConfigError, RestedConfig};

/// Configuration loader with layered approach.
///
/// Later layers override earlier ones:
/// 1. Default values (or a preset)
/// 2. Configuration file or string (TOML or JSON)
/// 3. Environment variables
///
/// # Example
///
/// ```no_run
/// use rested_config::ConfigLoader;
///
/// # fn main() -> Result<(), rested_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_file("rested.toml")?
///     .with_env_prefix("RESTED")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: RestedConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: RestedConfig::default(),
            env_prefix: None,
        }
    }

    /// Start with default configuration values.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.config = RestedConfig::default();
        self
    }

    /// Start with the development preset.
    ///
    /// # Example
    ///
    /// ```
    /// use rested_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_development()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = RestedConfig::development();
        self
    }

    /// Start with the production preset.
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = RestedConfig::production();
        self
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`. Sections the
    /// file omits take their defaults, not the values of earlier layers.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    /// - The file contains unknown fields
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        self.config = Self::parse(&content, &extension)?;
        Ok(self)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`with_file`](Self::with_file) when the file exists.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in the given format (`"toml"` or `"json"`).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if parsing fails or the format is unknown.
    ///
    /// # Example
    ///
    /// ```
    /// use rested_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [endpoint]
    ///     protected = true
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.endpoint.protected);
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = Self::parse(content, &format.to_lowercase())?;
        Ok(self)
    }

    /// Set the environment variable prefix for overrides.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, e.g.
    /// `RESTED__ENDPOINT__PROTECTED=true` or `RESTED__LOGGING__LEVEL=debug`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file into the process environment, if one exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::DotenvError` if a `.env` file exists but is malformed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply environment overrides and validate.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable cannot be parsed or
    /// the final configuration is invalid.
    pub fn load(mut self) -> Result<RestedConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// Finalize without environment overrides or validation.
    #[must_use]
    pub fn load_unvalidated(self) -> RestedConfig {
        self.config
    }

    fn parse(content: &str, format: &str) -> Result<RestedConfig, ConfigError> {
        match format {
            "toml" => Ok(toml::from_str(content)?),
            "json" => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let mut vars: Vec<(String, String)> = env::vars()
            .filter(|(k, _)| k.starts_with(prefix))
            .collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let Some(key_without_prefix) = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
        else {
            // Shares the prefix but not the separator, e.g. RESTEDX_FOO.
            return Ok(());
        };

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["ENDPOINT", "PROTECTED"] => {
                self.config.endpoint.protected = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["ENDPOINT", "ACTION_PARAM"] => {
                self.config.endpoint.action_param = value.to_string();
            }
            ["ENDPOINT", "ALLOW_HEADER"] => {
                self.config.endpoint.allow_header = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            ["FILTERS", "SEPARATOR"] => {
                self.config.filters.separator = value.to_string();
            }
            ["FILTERS", "LIST_DELIMITER"] => {
                self.config.filters.list_delimiter = value.to_string();
            }
            ["FILTERS", "RESERVED_PREFIX"] => {
                self.config.filters.reserved_prefix = value.to_string();
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = match value.to_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "pretty" => LogFormat::Pretty,
                    _ => {
                        return Err(ConfigError::env_parse_error(
                            key,
                            "expected 'json' or 'pretty'",
                        ))
                    }
                };
            }
            ["LOGGING", "SPAN_EVENTS"] => {
                self.config.logging.span_events = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::env_parse_error(key, "expected boolean"))?;
            }

            // Unknown key
            _ => {}
        }

        Ok(())
    }
}

/// Parse a boolean from a string.
fn parse_bool(s: &str) -> Option<bool> {
    match s.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, RestedConfig::default());
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert!(config.endpoint.protected);
    }

    #[test]
    fn test_loader_with_string_toml() {
        let toml = r#"
            [filters]
            separator = "."
            list_delimiter = "|"
        "#;

        let config = ConfigLoader::new()
            .with_string(toml, "toml")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.filters.separator, ".");
        assert_eq!(config.filters.list_delimiter, "|");
        assert_eq!(config.filters.reserved_prefix, "_");
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{"endpoint": {"action_param": "rest"}}"#;

        let config = ConfigLoader::new()
            .with_string(json, "JSON")
            .unwrap()
            .load()
            .unwrap();

        assert_eq!(config.endpoint.action_param, "rest");
    }

    #[test]
    fn test_loader_unknown_format() {
        let result = ConfigLoader::new().with_string("a: b", "yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(ref f)) if f == "yaml"));
    }

    #[test]
    fn test_loader_unknown_field() {
        let result = ConfigLoader::new().with_string("[server]\nport = 1", "toml");
        assert!(matches!(result, Err(ConfigError::TomlError(_))));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        let result = ConfigLoader::new().with_file("/nonexistent/rested.toml");
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/rested.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, RestedConfig::default());
    }

    #[test]
    fn test_load_validates() {
        let result = ConfigLoader::new()
            .with_string("[filters]\nseparator = \"\"", "toml")
            .unwrap()
            .load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool("on"), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("Off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_apply_env_var_endpoint() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__ENDPOINT__PROTECTED", "yes", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__ENDPOINT__ACTION_PARAM", "rest", "TEST")
            .unwrap();
        assert!(loader.config.endpoint.protected);
        assert_eq!(loader.config.endpoint.action_param, "rest");
    }

    #[test]
    fn test_apply_env_var_logging() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__LOGGING__FORMAT", "pretty", "TEST")
            .unwrap();
        loader
            .apply_env_var("TEST__LOGGING__LEVEL", "warn", "TEST")
            .unwrap();
        assert_eq!(loader.config.logging.format, LogFormat::Pretty);
        assert_eq!(loader.config.logging.level, "warn");

        let err = loader
            .apply_env_var("TEST__LOGGING__FORMAT", "xml", "TEST")
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { .. }));
    }

    #[test]
    fn test_apply_env_var_invalid_boolean() {
        let mut loader = ConfigLoader::new();
        let result = loader.apply_env_var("TEST__ENDPOINT__ALLOW_HEADER", "sometimes", "TEST");
        assert!(result.is_err());
    }

    #[test]
    fn test_apply_env_var_ignores_unknown_and_foreign_keys() {
        let mut loader = ConfigLoader::new();
        loader
            .apply_env_var("TEST__SERVER__PORT", "80", "TEST")
            .unwrap();
        loader.apply_env_var("TESTING_X", "1", "TEST").unwrap();
        assert_eq!(loader.config, RestedConfig::default());
    }
}
