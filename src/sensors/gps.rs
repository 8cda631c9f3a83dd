// src/sensors/gps.rs - Fake GPS receiver
use astra_shared::{Sensor, SensorError, Vec3};

use super::SensorBase;

/// Fix quality reported once a first fix is simulated.
const FIRST_FIX_QUALITY: u8 = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpsDateTime {
    pub year: i32,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

#[derive(Debug, Clone)]
pub struct FakeGps {
    base: SensorBase,
    pub healthy: bool,
    pub fail_init: bool,
    /// Latitude, longitude (degrees) and altitude (m).
    position: Vec3,
    heading: f64,
    date_time: GpsDateTime,
    time_of_day: String,
    fix_quality: u8,
    has_fix: bool,
}

impl FakeGps {
    pub fn new() -> Self {
        Self {
            base: SensorBase::new("FakeGPS"),
            healthy: true,
            fail_init: false,
            position: Vec3::ZERO,
            heading: 0.0,
            date_time: GpsDateTime::default(),
            time_of_day: String::new(),
            fix_quality: 0,
            has_fix: false,
        }
    }

    pub fn set(&mut self, lat: f64, lon: f64, alt: f64) {
        self.position = Vec3::new(lat, lon, alt);
    }

    pub fn set_heading(&mut self, heading: f64) {
        self.heading = heading;
    }

    pub fn set_date_time(&mut self, year: i32, month: u8, day: u8, hour: u8, minute: u8, second: u8) {
        self.date_time = GpsDateTime {
            year,
            month,
            day,
            hour,
            minute,
            second,
        };
        self.time_of_day = format!("{:02}:{:02}:{:02}", hour, minute, second);
    }

    /// Simulate acquiring (or losing) the first fix.
    pub fn set_has_first_fix(&mut self, fix: bool) {
        self.has_fix = fix;
        self.fix_quality = if fix { FIRST_FIX_QUALITY } else { 0 };
    }

    pub fn set_fix_quality(&mut self, quality: u8) {
        self.fix_quality = quality;
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn heading(&self) -> f64 {
        self.heading
    }

    pub fn date_time(&self) -> GpsDateTime {
        self.date_time
    }

    /// `HH:MM:SS`, empty until a time is set.
    pub fn time_of_day(&self) -> &str {
        &self.time_of_day
    }

    pub fn fix_quality(&self) -> u8 {
        self.fix_quality
    }

    pub fn has_fix(&self) -> bool {
        self.has_fix
    }

    pub fn reset(&mut self) {
        self.base.reset();
    }
}

impl Default for FakeGps {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for FakeGps {
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
        self.base.set_healthy(self.healthy);
        self.has_fix = self.fix_quality > 0;
        Ok(())
    }

    fn is_healthy(&self) -> bool {
        self.healthy
    }

    fn is_initialized(&self) -> bool {
        self.base.is_initialized()
    }
}
