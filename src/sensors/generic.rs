// src/sensors/generic.rs - Named sensor with no readings
use astra_shared::{Sensor, SensorError};

use super::SensorBase;

/// Always initializes, never reports anything.
#[derive(Debug, Clone)]
pub struct FakeGenericSensor {
    base: SensorBase,
}

impl FakeGenericSensor {
    pub fn new(name: &str) -> Self {
        Self {
            base: SensorBase::new(name),
        }
    }
}

impl Default for FakeGenericSensor {
    fn default() -> Self {
        Self::new("FakeSensor")
    }
}

impl Sensor for FakeGenericSensor {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn init(&mut self) -> Result<(), SensorError> {
        self.base.mark_initialized();
        Ok(())
    }

    fn update(&mut self) -> Result<(), SensorError> {
        self.base.require_initialized()
    }

    fn is_healthy(&self) -> bool {
        self.base.is_healthy()
    }

    fn is_initialized(&self) -> bool {
        self.base.is_initialized()
    }
}
