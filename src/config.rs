//! # Harness Configuration
//!
//! Settings for the SITL connection, serial buffer sizing and logging.
//! Every field has a default, so an empty file (or no file) is valid.
//!
//! ## Example: TOML Configuration
//!
//! ```toml
//! [sitl]
//! host = "127.0.0.1"
//! port = 5555
//! connect_timeout_ms = 1000
//! auto_connect = true
//!
//! [stream]
//! input_capacity = 1024
//! loopback_capacity = 1024
//!
//! [logging]
//! level = "debug"
//! ```

// src/config.rs - Single configuration file
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level harness configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct HarnessConfig {
    #[serde(default)]
    pub sitl: SitlConfig,
    #[serde(default)]
    pub stream: StreamConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the external simulator listens.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SitlConfig {
    #[serde(default = "default_sitl_host")]
    pub host: String,
    #[serde(default = "default_sitl_port")]
    pub port: u16,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// Connect the primary serial port at startup.
    #[serde(default)]
    pub auto_connect: bool,
}

impl SitlConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

impl Default for SitlConfig {
    fn default() -> Self {
        Self {
            host: default_sitl_host(),
            port: default_sitl_port(),
            connect_timeout_ms: default_connect_timeout_ms(),
            auto_connect: false,
        }
    }
}

/// Fixed buffer sizes of each serial stream.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct StreamConfig {
    #[serde(default = "default_buffer_capacity")]
    pub input_capacity: usize,
    #[serde(default = "default_buffer_capacity")]
    pub loopback_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            input_capacity: default_buffer_capacity(),
            loopback_capacity: default_buffer_capacity(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_sitl_host() -> String {
    "127.0.0.1".to_string()
}
fn default_sitl_port() -> u16 {
    5555
}
fn default_connect_timeout_ms() -> u64 {
    1000
}
fn default_buffer_capacity() -> usize {
    1024
}
fn default_log_level() -> String {
    "info".to_string()
}

impl HarnessConfig {
    /// Reject values the harness cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.stream.input_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "stream.input_capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.stream.loopback_capacity == 0 {
            return Err(ConfigError::Invalid {
                field: "stream.loopback_capacity",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.sitl.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "sitl.connect_timeout_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.sitl.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "sitl.host",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

impl HarnessConfig {
    /// Replace every field the overrides set, then re-validate.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) -> Result<(), ConfigError> {
        if let Some(host) = &overrides.host {
            self.sitl.host = host.clone();
        }
        if let Some(port) = overrides.port {
            self.sitl.port = port;
        }
        if let Some(level) = &overrides.log_level {
            self.logging.level = level.clone();
        }
        self.validate()
    }
}

/// Parse and validate a configuration from TOML text.
pub fn parse_config(text: &str) -> Result<HarnessConfig, ConfigError> {
    let config: HarnessConfig = toml::from_str(text)?;
    config.validate()?;
    Ok(config)
}

/// Load configuration from a TOML file.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<HarnessConfig, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref())?;
    let config = parse_config(&content)?;
    tracing::debug!("Loaded harness config from {}", path.as_ref().display());
    Ok(config)
}
