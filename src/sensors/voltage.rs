// src/sensors/voltage.rs - Voltage sensor reading the mock ADC
use astra_shared::{AnalogInput, Sensor, SensorError};

use super::SensorBase;
use crate::context::HarnessContext;

/// Full-scale reading of the 10-bit ADC.
const ADC_MAX: f64 = 1023.0;
const DEFAULT_REF_VOLTAGE: f64 = 3.3;

/// Reads a battery or rail voltage through an optional resistor divider.
///
/// Raw values come from the context's analog table, so tests drive the sensor
/// with `set_mock_raw_value` (or `HarnessContext::set_mock_analog_read`).
#[derive(Debug, Clone)]
pub struct MockVoltageSensor {
    base: SensorBase,
    ctx: HarnessContext,
    pin: i32,
    r1: u32,
    r2: u32,
    ref_voltage: f64,
    raw: i32,
    voltage: f64,
    pub init_called: bool,
    pub read_called: bool,
}

impl MockVoltageSensor {
    /// Direct connection to the ADC pin, 3.3 V reference.
    pub fn new(ctx: &HarnessContext, pin: i32) -> Self {
        Self::with_divider(ctx, pin, 0, 0, DEFAULT_REF_VOLTAGE)
    }

    /// `r1` on the high side, `r2` to ground. `r2 == 0` means no divider.
    pub fn with_divider(ctx: &HarnessContext, pin: i32, r1: u32, r2: u32, ref_voltage: f64) -> Self {
        Self {
            base: SensorBase::new("MockVoltage"),
            ctx: ctx.clone(),
            pin,
            r1,
            r2,
            ref_voltage,
            raw: 0,
            voltage: 0.0,
            init_called: false,
            read_called: false,
        }
    }

    pub fn pin(&self) -> i32 {
        self.pin
    }

    /// Inject the ADC reading for this sensor's pin.
    pub fn set_mock_raw_value(&self, value: i32) {
        self.ctx.set_mock_analog_read(self.pin, value);
    }

    /// Sample the ADC and convert. Works before `init`.
    pub fn read(&mut self) -> f64 {
        self.read_called = true;
        self.raw = self.ctx.analog_read(self.pin);
        self.voltage = self.convert(self.raw);
        self.voltage
    }

    pub fn raw(&self) -> i32 {
        self.raw
    }

    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    fn convert(&self, raw: i32) -> f64 {
        let pin_voltage = raw as f64 / ADC_MAX * self.ref_voltage;
        if self.r2 == 0 {
            return pin_voltage;
        }
        pin_voltage * (self.r1 as f64 + self.r2 as f64) / self.r2 as f64
    }
}

impl Sensor for MockVoltageSensor {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn init(&mut self) -> Result<(), SensorError> {
        self.init_called = true;
        self.base.mark_initialized();
        Ok(())
    }

    fn update(&mut self) -> Result<(), SensorError> {
        self.base.require_initialized()?;
        self.read();
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.base.is_healthy()
    }

    fn is_initialized(&self) -> bool {
        self.base.is_initialized()
    }
}
