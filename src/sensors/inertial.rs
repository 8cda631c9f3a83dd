// src/sensors/inertial.rs - Fake accelerometer, gyroscope, magnetometer and IMUs
use astra_shared::{Sensor, SensorError, Vec3};

use super::SensorBase;

/// Gravity as a resting accelerometer on the pad reports it.
pub const RESTING_ACCEL: Vec3 = Vec3::new(0.0, 0.0, -9.81);

/// Reading an IMU9 magnetometer reports right after init.
pub const DEFAULT_MAG_FIELD: Vec3 = Vec3::new(20.0, 0.0, 0.0);

/// Single three-axis sensor that reports whatever was last `set`.
macro_rules! vector_fake {
    ($(#[$doc:meta])* $ty:ident, $name:literal, $default:expr, $getter:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone)]
        pub struct $ty {
            base: SensorBase,
            pub healthy: bool,
            pub fail_init: bool,
            reading: Vec3,
            current: Vec3,
        }

        impl $ty {
            pub fn new() -> Self {
                Self::named($name)
            }

            fn named(name: &str) -> Self {
                Self {
                    base: SensorBase::new(name),
                    healthy: true,
                    fail_init: false,
                    reading: $default,
                    current: Vec3::ZERO,
                }
            }

            /// Reading reported from now on.
            pub fn set(&mut self, reading: impl Into<Vec3>) {
                self.reading = reading.into();
                self.current = self.reading;
            }

            pub fn $getter(&self) -> Vec3 {
                self.current
            }

            pub fn reset(&mut self) {
                self.base.reset();
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Sensor for $ty {
            fn name(&self) -> &str {
                self.base.name()
            }

            fn init(&mut self) -> Result<(), SensorError> {
                if self.fail_init {
                    return Err(self.base.init_failed());
                }
                self.current = self.reading;
                self.base.mark_initialized();
                Ok(())
            }

            fn update(&mut self) -> Result<(), SensorError> {
                self.base.require_initialized()?;
                self.current = self.reading;
                self.base.set_healthy(self.healthy);
                Ok(())
            }

            fn is_healthy(&self) -> bool {
                self.healthy
            }

            fn is_initialized(&self) -> bool {
                self.base.is_initialized()
            }
        }
    };
}

vector_fake!(
    /// Accelerometer in m/s^2.
    FakeAccel,
    "FakeAccel",
    RESTING_ACCEL,
    acceleration
);

vector_fake!(
    /// Gyroscope in rad/s.
    FakeGyro,
    "FakeGyro",
    Vec3::ZERO,
    angular_velocity
);

vector_fake!(FakeMag, "FakeMag", Vec3::ZERO, magnetic_field);

impl FakeAccel {
    /// An accelerometer whose `init` always fails.
    pub fn failing() -> Self {
        let mut accel = Self::named("FailingAccel");
        accel.fail_init = true;
        accel.reading = Vec3::ZERO;
        accel
    }
}

#[derive(Debug, Clone)]
pub struct FakeImu6 {
    base: SensorBase,
    acc: Vec3,
    ang_vel: Vec3,
}

impl FakeImu6 {
    pub fn new() -> Self {
        Self {
            base: SensorBase::new("FakeIMU"),
            acc: Vec3::ZERO,
            ang_vel: Vec3::ZERO,
        }
    }

    pub fn set(&mut self, acc: impl Into<Vec3>, gyro: impl Into<Vec3>) {
        self.acc = acc.into();
        self.ang_vel = gyro.into();
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acc
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.ang_vel
    }

    pub fn reset(&mut self) {
        self.base.reset();
    }
}

impl Default for FakeImu6 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for FakeImu6 {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn init(&mut self) -> Result<(), SensorError> {
        self.acc = RESTING_ACCEL;
        self.ang_vel = Vec3::ZERO;
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

#[derive(Debug, Clone)]
pub struct FakeImu9 {
    base: SensorBase,
    acc: Vec3,
    ang_vel: Vec3,
    mag: Vec3,
}

impl FakeImu9 {
    pub fn new() -> Self {
        Self {
            base: SensorBase::new("FakeIMU9DoF"),
            acc: Vec3::ZERO,
            ang_vel: Vec3::ZERO,
            mag: Vec3::ZERO,
        }
    }

    pub fn set(&mut self, acc: impl Into<Vec3>, gyro: impl Into<Vec3>, mag: impl Into<Vec3>) {
        self.acc = acc.into();
        self.ang_vel = gyro.into();
        self.mag = mag.into();
    }

    pub fn acceleration(&self) -> Vec3 {
        self.acc
    }

    pub fn angular_velocity(&self) -> Vec3 {
        self.ang_vel
    }

    pub fn magnetic_field(&self) -> Vec3 {
        self.mag
    }

    pub fn reset(&mut self) {
        self.base.reset();
    }
}

impl Default for FakeImu9 {
    fn default() -> Self {
        Self::new()
    }
}

impl Sensor for FakeImu9 {
    fn name(&self) -> &str {
        self.base.name()
    }

    fn init(&mut self) -> Result<(), SensorError> {
        self.acc = RESTING_ACCEL;
        self.ang_vel = Vec3::ZERO;
        self.mag = DEFAULT_MAG_FIELD;
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
