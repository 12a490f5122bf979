//! Configuration management for the InfoHub gateway
//!
//! The only externally supplied setting is the listening port (`PORT`).
//! Everything else is a process-lifetime constant with a default here so
//! tests can point the weather client at a fake upstream.

use crate::GatewayError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable holding the listening port
pub const PORT_VAR: &str = "PORT";

/// Root configuration structure for the gateway
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// TCP port the HTTP server binds to
    #[serde(default = "default_port")]
    pub port: u16,
    /// Weather upstream configuration
    pub weather: WeatherConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Weather upstream settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the current-conditions provider
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,
    /// Latitude queried for every weather request
    #[serde(default = "default_latitude")]
    pub latitude: f64,
    /// Longitude queried for every weather request
    #[serde(default = "default_longitude")]
    pub longitude: f64,
    /// Label returned when the caller gives no city
    #[serde(default = "default_city")]
    pub default_city: String,
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

fn default_port() -> u16 {
    3001
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

// London
fn default_latitude() -> f64 {
    51.5085
}

fn default_longitude() -> f64 {
    -0.1257
}

fn default_city() -> String {
    "London".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            default_city: default_city(),
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

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            weather: WeatherConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from the process environment
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using `lookup` to resolve environment variables
    pub fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(PORT_VAR).filter(|value| !value.trim().is_empty()) {
            config.port = raw
                .trim()
                .parse::<u16>()
                .map_err(|e| GatewayError::config(format!("Invalid {PORT_VAR} '{raw}': {e}")))
                .with_context(|| "Failed to read listening port")?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration settings
    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(GatewayError::config("Port must be between 1 and 65535").into());
        }

        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.logging.level.as_str()) {
            return Err(GatewayError::config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.logging.level,
                valid_log_levels.join(", ")
            ))
            .into());
        }

        let valid_log_formats = ["pretty", "json"];
        if !valid_log_formats.contains(&self.logging.format.as_str()) {
            return Err(GatewayError::config(format!(
                "Invalid log format '{}'. Must be one of: {}",
                self.logging.format,
                valid_log_formats.join(", ")
            ))
            .into());
        }

        if !self.weather.base_url.starts_with("http://")
            && !self.weather.base_url.starts_with("https://")
        {
            return Err(GatewayError::config(
                "Weather API base URL must be a valid HTTP or HTTPS URL",
            )
            .into());
        }

        if !(-90.0..=90.0).contains(&self.weather.latitude)
            || !(-180.0..=180.0).contains(&self.weather.longitude)
        {
            return Err(GatewayError::config("Weather coordinates are out of range").into());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.weather.base_url, "https://api.open-meteo.com/v1");
        assert_eq!(config.weather.default_city, "London");
        assert_eq!(config.logging.level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_port_defaults_when_unset() {
        let config = GatewayConfig::load_with(lookup_from(&[])).unwrap();
        assert_eq!(config.port, 3001);

        let config = GatewayConfig::load_with(lookup_from(&[("PORT", "  ")])).unwrap();
        assert_eq!(config.port, 3001);
    }

    #[test]
    fn test_port_from_environment() {
        let config = GatewayConfig::load_with(lookup_from(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = GatewayConfig::load_with(lookup_from(&[("PORT", "http")]));
        assert!(result.is_err());

        let result = GatewayConfig::load_with(lookup_from(&[("PORT", "0")]));
        assert!(result.unwrap_err().to_string().contains("Port must be"));
    }

    #[test]
    fn test_config_validation_invalid_log_level() {
        let mut config = GatewayConfig::default();
        config.logging.level = "loud".to_string();
        let result = config.validate();
        assert!(result.unwrap_err().to_string().contains("Invalid log level"));
    }

    #[test]
    fn test_config_validation_base_url() {
        let mut config = GatewayConfig::default();
        config.weather.base_url = "api.open-meteo.com".to_string();
        assert!(config.validate().is_err());
    }
}
