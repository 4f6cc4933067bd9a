//! Application configuration structs
//!
//! Loads configuration from environment variables (and a `.env` file, if any).

use crate::telemetry::TracingConfig;
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub gateway: GatewayConfig,
    pub bridge: BridgeConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default)]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    /// Parse an environment name, ignoring case
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_lowercase().as_str() {
            "production" => Some(Self::Production),
            "staging" => Some(Self::Staging),
            "development" => Some(Self::Development),
            _ => None,
        }
    }
}

/// WebSocket gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    /// Route that accepts WebSocket upgrades
    #[serde(default = "default_path")]
    pub path: String,
    /// How long graceful shutdown may take before open sockets are dropped
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

impl GatewayConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    #[must_use]
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }
}

/// Bridge and consumer loop configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Interval between two polls of the consumer loop
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Capacity of each connection's outgoing frame buffer
    #[serde(default = "default_outgoing_buffer")]
    pub outgoing_buffer: usize,
}

impl BridgeConfig {
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// Default value functions
fn default_app_name() -> String {
    "wsbridge".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_path() -> String {
    "/ws".to_string()
}

fn default_shutdown_timeout_ms() -> u64 {
    5000
}

fn default_poll_interval_ms() -> u64 {
    16 // about one frame at 60 Hz
}

fn default_outgoing_buffer() -> usize {
    64
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = match lookup("APP_ENV") {
            Some(value) => Environment::parse(&value)
                .ok_or(ConfigError::InvalidValue("APP_ENV", value))?,
            None => Environment::default(),
        };

        let path = lookup("GATEWAY_PATH").unwrap_or_else(default_path);
        if !path.starts_with('/') {
            return Err(ConfigError::InvalidValue("GATEWAY_PATH", path));
        }

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env,
            },
            gateway: GatewayConfig {
                host: lookup("GATEWAY_HOST").unwrap_or_else(default_host),
                port: parse_var(&lookup, "GATEWAY_PORT")?
                    .ok_or(ConfigError::MissingVar("GATEWAY_PORT"))?,
                path,
                shutdown_timeout_ms: parse_var(&lookup, "GATEWAY_SHUTDOWN_TIMEOUT_MS")?
                    .unwrap_or_else(default_shutdown_timeout_ms),
            },
            bridge: BridgeConfig {
                poll_interval_ms: parse_var(&lookup, "BRIDGE_POLL_INTERVAL_MS")?
                    .filter(|ms| *ms > 0)
                    .unwrap_or_else(default_poll_interval_ms),
                outgoing_buffer: parse_var(&lookup, "BRIDGE_OUTGOING_BUFFER")?
                    .filter(|n| *n > 0)
                    .unwrap_or_else(default_outgoing_buffer),
            },
        })
    }

    /// Tracing setup matching the configured environment
    #[must_use]
    pub fn tracing_config(&self) -> TracingConfig {
        match self.app.env {
            Environment::Production => TracingConfig::production(),
            Environment::Staging => TracingConfig::default(),
            Environment::Development => TracingConfig::development(),
        }
    }
}

/// Parse an optional variable, rejecting values that are present but malformed
fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(key, raw)),
        None => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
