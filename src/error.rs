// src/error.rs - Error types for the native harness
use astra_shared::{SensorError, SitlError};
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("SITL error: {0}")]
    Sitl(#[from] SitlError),
    #[error("Sensor error: {0}")]
    Sensor(#[from] SensorError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Storage error on {path}: {source}")]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
