//! Configuration management for the `AgroClim` dashboard
//!
//! Handles loading configuration from files, environment variables,
//! and provides validation for all configuration settings.

use crate::AgroClimError;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure for the `AgroClim` application
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgroClimConfig {
    /// Dashboard backend configuration
    #[serde(default)]
    pub backend: BackendConfig,
    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Default application settings
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// Dashboard backend API configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Bearer token for the backend (optional for open deployments)
    pub access_token: Option<String>,
    /// Base URL for the dashboard backend, including the `/api` prefix
    #[serde(default = "default_backend_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_backend_timeout")]
    pub timeout_seconds: u32,
    /// Maximum number of retries for failed requests
    #[serde(default = "default_backend_max_retries")]
    pub max_retries: u32,
}

/// Cache configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Cache TTL in hours for historical weather responses
    #[serde(default = "default_cache_ttl")]
    pub ttl_hours: u32,
    /// Cache directory location
    #[serde(default = "default_cache_location")]
    pub location: String,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (pretty or json)
    #[serde(default = "default_log_format")]
    pub format: String,
}

/// Default application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Location the dashboard opens on when none is given
    pub location_id: Option<String>,
    /// Page size for list endpoints
    #[serde(default = "default_page_limit")]
    pub page_limit: u32,
    /// How far back the historical view reaches by default, in days
    #[serde(default = "default_history_days")]
    pub history_days: u32,
}

// Default value functions
fn default_backend_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_backend_timeout() -> u32 {
    30
}

fn default_backend_max_retries() -> u32 {
    3
}

fn default_cache_ttl() -> u32 {
    6
}

fn default_cache_location() -> String {
    "~/.cache/agroclim".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_page_limit() -> u32 {
    50
}

fn default_history_days() -> u32 {
    365
}

impl Default for AgroClimConfig {
    fn default() -> Self {
        Self {
            backend: BackendConfig::default(),
            cache: CacheConfig::default(),
            logging: LoggingConfig::default(),
            defaults: DefaultsConfig::default(),
        }
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: default_backend_base_url(),
            timeout_seconds: default_backend_timeout(),
            max_retries: default_backend_max_retries(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_hours: default_cache_ttl(),
            location: default_cache_location(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            location_id: None,
            page_limit: default_page_limit(),
            history_days: default_history_days(),
        }
    }
}

impl AgroClimConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path(None)
    }

    /// Load configuration from specified path
    pub fn load_from_path(config_path: Option<PathBuf>) -> Result<Self> {
        let mut builder = Config::builder();

        // Load from file if path is provided or use default location
        let config_file = config_path.unwrap_or_else(|| {
            Self::get_config_path().unwrap_or_else(|| PathBuf::from("config.toml"))
        });

        if config_file.exists() {
            builder = builder.add_source(
                File::from(config_file.clone())
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Add environment variable overrides with AGROCLIM_ prefix,
        // e.g. AGROCLIM_BACKEND__BASE_URL overrides backend.base_url
        builder = builder.add_source(
            Environment::with_prefix("AGROCLIM")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .with_context(|| "Failed to build configuration")?;

        let mut config: AgroClimConfig = settings
            .try_deserialize()
            .with_context(|| "Failed to deserialize configuration")?;

        // Apply defaults for missing values
        config.apply_defaults();

        // Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Get the default configuration file path
    #[must_use]
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("agroclim").join("config.toml"))
    }

    /// Apply default values to missing configuration fields
    pub fn apply_defaults(&mut self) {
        if self.backend.base_url.is_empty() {
            self.backend.base_url = default_backend_base_url();
        }
        if self.backend.timeout_seconds == 0 {
            self.backend.timeout_seconds = default_backend_timeout();
        }
        if self.cache.ttl_hours == 0 {
            self.cache.ttl_hours = default_cache_ttl();
        }
        if self.cache.location.is_empty() {
            self.cache.location = default_cache_location();
        }
        if self.logging.level.is_empty() {
            self.logging.level = default_log_level();
        }
        if self.logging.format.is_empty() {
            self.logging.format = default_log_format();
        }
        if self.defaults.page_limit == 0 {
            self.defaults.page_limit = default_page_limit();
        }
        if self.defaults.history_days == 0 {
            self.defaults.history_days = default_history_days();
        }
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        self.validate_credentials()?;
        self.validate_numeric_ranges()?;
        self.validate_string_values()?;
        Ok(())
    }

    /// Validate backend credentials
    pub fn validate_credentials(&self) -> Result<()> {
        if let Some(token) = &self.backend.access_token {
            if token.is_empty() {
                return Err(AgroClimError::config(
                    "Backend access token cannot be empty if provided. Either remove it or provide a valid token."
                ).into());
            }

            if token.len() < 8 {
                return Err(AgroClimError::config(
                    "Backend access token appears to be invalid (too short). Please check your token."
                ).into());
            }
        }

        Ok(())
    }

    /// Validate numeric configuration ranges
    fn validate_numeric_ranges(&self) -> Result<()> {
        if self.backend.timeout_seconds > 300 {
            return Err(
                AgroClimError::config("Backend timeout cannot exceed 300 seconds").into(),
            );
        }

        if self.backend.max_retries > 10 {
            return Err(AgroClimError::config("Backend max retries cannot exceed 10").into());
        }

        if self.cache.ttl_hours > 168 {
            return Err(
                AgroClimError::config("Cache TTL cannot exceed 168 hours (1 week)").into(),
            );
        }

        if self.defaults.page_limit > 500 {
            return Err(AgroClimError::config("Page limit cannot exceed 500").into());
        }

        if self.defaults.history_days > 3660 {
            return Err(
                AgroClimError::config("History range cannot exceed 3660 days (10 years)").into(),
            );
        }

        Ok(())
    }

    /// Validate string configuration values
    fn validate_string_values(&self) -> Result<()> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(AgroClimError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(AgroClimError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(AgroClimError::config(
                "Backend base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        Ok(())
    }

    /// Create configuration directory if it doesn't exist
    pub fn ensure_config_dir() -> Result<PathBuf> {
        if let Some(config_dir) = dirs::config_dir() {
            let agroclim_config_dir = config_dir.join("agroclim");
            std::fs::create_dir_all(&agroclim_config_dir).with_context(|| {
                format!(
                    "Failed to create config directory: {}",
                    agroclim_config_dir.display()
                )
            })?;
            Ok(agroclim_config_dir)
        } else {
            Err(AgroClimError::config("Unable to determine config directory").into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AgroClimConfig::default();
        assert_eq!(config.backend.base_url, "http://localhost:5000/api");
        assert_eq!(config.backend.timeout_seconds, 30);
        assert_eq!(config.cache.ttl_hours, 6);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.defaults.page_limit, 50);
        assert!(config.backend.access_token.is_none());
    }

    #[test]
    fn test_config_validation_no_token() {
        let config = AgroClimConfig::default();
        // Access token is optional
        assert!(config.validate_credentials().is_ok());
    }

    #[test]
    fn test_config_validation_valid_token() {
        let mut config = AgroClimConfig::default();
        config.backend.access_token = Some("valid_token_123".to_string());
        assert!(config.validate_credentials().is_ok());
    }

    #[test]
    fn test_config_validation_short_token() {
        let mut config = AgroClimConfig::default();
        config.backend.access_token = Some("abc".to_string());
        let result = config.validate_credentials();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("too short"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = AgroClimConfig::default();
        config.logging.level = "invalid".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_numeric_ranges() {
        let mut config = AgroClimConfig::default();
        config.backend.timeout_seconds = 500; // Invalid - too high
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("timeout cannot exceed"));
    }

    #[test]
    fn test_config_validation_bad_base_url() {
        let mut config = AgroClimConfig::default();
        config.backend.base_url = "ftp://example.com".to_string();
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("base URL"));
    }

    #[test]
    fn test_config_path_generation() {
        let path = AgroClimConfig::get_config_path();
        assert!(path.is_some());
        let path = path.unwrap();
        assert!(path.to_string_lossy().contains("agroclim"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }
}
