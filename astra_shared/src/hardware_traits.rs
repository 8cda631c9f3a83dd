// Trait-based interfaces for the mocked sensor hardware (shared)

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SensorError {
    #[error("{0} failed to initialize")]
    InitFailed(String),
    #[error("{0} is not initialized")]
    NotInitialized(String),
}

/// Capability every flight sensor exposes to firmware code.
pub trait Sensor {
    fn name(&self) -> &str;
    fn init(&mut self) -> Result<(), SensorError>;
    /// Sample the device and refresh the cached reading.
    fn update(&mut self) -> Result<(), SensorError>;
    fn is_healthy(&self) -> bool;
    fn is_initialized(&self) -> bool;
}

/// Raw ADC access, the `analogRead(pin)` of the board.
pub trait AnalogInput {
    fn analog_read(&self, pin: i32) -> i32;
}
