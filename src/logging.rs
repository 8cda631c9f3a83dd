// src/logging.rs - tracing subscriber setup for the harness binary and tests
use std::str::FromStr;

use tracing::Level;

use crate::error::HarnessError;

/// Parse a level name such as `"info"` or `"TRACE"`.
pub fn parse_level(level: &str) -> Result<Level, HarnessError> {
    Level::from_str(level.trim()).map_err(|_| HarnessError::InvalidLogLevel(level.to_string()))
}

/// Install the global fmt subscriber.
///
/// Safe to call more than once (every test may call it); only the first call
/// installs a subscriber.
pub fn init_logging(level: &str) -> Result<(), HarnessError> {
    let level = parse_level(level)?;
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!("Logging initialized at {}", level);
    }
    Ok(())
}
