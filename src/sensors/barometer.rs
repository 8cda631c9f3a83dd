// src/sensors/barometer.rs - Fake barometer with standard-atmosphere altitude
use astra_shared::{Sensor, SensorError};

use super::SensorBase;

pub const SEA_LEVEL_PRESSURE_PA: f64 = 101_325.0;

/// Pressure at `altitude_m` in the standard atmosphere.
pub fn pressure_at_altitude(altitude_m: f64) -> f64 {
    SEA_LEVEL_PRESSURE_PA * (1.0 - altitude_m / 44_330.0).powf(5.255)
}

/// Inverse of [`pressure_at_altitude`].
pub fn altitude_from_pressure(pressure_pa: f64) -> f64 {
    44_330.0 * (1.0 - (pressure_pa / SEA_LEVEL_PRESSURE_PA).powf(1.0 / 5.255))
}

#[derive(Debug, Clone)]
pub struct FakeBarometer {
    base: SensorBase,
    /// Health reported from now on.
    pub healthy: bool,
    pub fail_init: bool,
    fake_pressure: f64,
    fake_temp: f64,
    /// Set by `set_altitude`; reported verbatim instead of derived.
    fake_altitude: Option<f64>,
    pressure: f64,
    temp: f64,
    altitude: f64,
}

impl FakeBarometer {
    pub fn new() -> Self {
        Self {
            base: SensorBase::new("FakeBarometer"),
            healthy: true,
            fail_init: false,
            fake_pressure: SEA_LEVEL_PRESSURE_PA,
            fake_temp: 20.0,
            fake_altitude: None,
            pressure: 0.0,
            temp: 0.0,
            altitude: 0.0,
        }
    }

    /// Pressure in Pa and temperature in C for the next reads.
    pub fn set(&mut self, pressure: f64, temp: f64) {
        self.fake_pressure = pressure;
        self.fake_temp = temp;
        self.pressure = pressure;
        self.temp = temp;
        self.fake_altitude = None;
    }

    pub fn set_altitude(&mut self, altitude_m: f64) {
        self.fake_pressure = pressure_at_altitude(altitude_m);
        self.fake_temp = 15.0 - altitude_m * 0.0065;
        self.fake_altitude = Some(altitude_m);
        self.pressure = self.fake_pressure;
        self.temp = self.fake_temp;
        self.altitude = altitude_m;
    }

    pub fn pressure(&self) -> f64 {
        self.pressure
    }

    pub fn temperature(&self) -> f64 {
        self.temp
    }

    /// Altitude above sea level from the last update.
    pub fn altitude(&self) -> f64 {
        self.altitude
    }

    pub fn reset(&mut self) {
        self.base.reset();
    }
}

impl Default for FakeBarometer {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for FakeBarometer {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn init(&mut self) -> Result<(), SensorError> {
        if self.fail_init {
            return Err(self.base.init_failed());
        }
        self.base.mark_initialized();
        Ok(())
    }

    fn update(&mut self) -> Result<(), SensorError> {
        self.base.require_initialized()?;
        self.pressure = self.fake_pressure;
        self.temp = self.fake_temp;
        self.base.set_healthy(self.healthy);
        self.altitude = match self.fake_altitude {
            Some(alt) => alt,
            None => altitude_from_pressure(self.pressure),
        };
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.healthy
    }

    fn is_initialized(&self) -> bool {
        self.base.is_initialized()
    }
}
