//! Fake flight sensors for native tests.
//!
//! Each fake implements [`Sensor`] and exposes plain setters so tests decide
//! what the firmware reads. `healthy` and `fail_init` are public knobs on the
//! fakes that support fault injection.

// src/sensors/mod.rs - Fake sensor set
pub mod barometer;
pub mod generic;
pub mod gps;
pub mod inertial;
pub mod voltage;

pub use barometer::FakeBarometer;
pub use generic::FakeGenericSensor;
pub use gps::FakeGps;
pub use inertial::{FakeAccel, FakeGyro, FakeImu6, FakeImu9, FakeMag};
pub use voltage::MockVoltageSensor;

use astra_shared::{Sensor, SensorError};

/// Name plus the lifecycle flags every sensor carries.
#[derive(Debug, Clone)]
pub(crate) struct SensorBase {
    name: String,
    initialized: bool,
    healthy: bool,
}

impl SensorBase {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            initialized: false,
            healthy: false,
        }
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn mark_initialized(&mut self) {
        self.initialized = true;
        self.healthy = true;
        tracing::debug!("{} initialized", self.name);
    }

    pub(crate) fn init_failed(&self) -> SensorError {
        tracing::warn!("{} failed to initialize", self.name);
        SensorError::InitFailed(self.name.clone())
    }

    pub(crate) fn require_initialized(&self) -> Result<(), SensorError> {
        if self.initialized {
            Ok(())
        } else {
            Err(SensorError::NotInitialized(self.name.clone()))
        }
    }

    pub(crate) fn set_healthy(&mut self, healthy: bool) {
        self.healthy = healthy;
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn is_healthy(&self) -> bool {
        self.healthy
    }

    /// Forget a previous `init`.
    pub(crate) fn reset(&mut self) {
        self.initialized = false;
    }
}

/// Every fake the harness offers, for code that holds a heterogeneous sensor list.
#[derive(Debug)]
pub enum MockSensor {
    Barometer(FakeBarometer),
    Gps(FakeGps),
    Accel(FakeAccel),
    Gyro(FakeGyro),
    Mag(FakeMag),
    Imu6(FakeImu6),
    Imu9(FakeImu9),
    Generic(FakeGenericSensor),
    Voltage(MockVoltageSensor),
}

impl MockSensor {
    fn inner(&self) -> &dyn Sensor {
        match self {
            MockSensor::Barometer(s) => s,
            MockSensor::Gps(s) => s,
            MockSensor::Accel(s) => s,
            MockSensor::Gyro(s) => s,
            MockSensor::Mag(s) => s,
            MockSensor::Imu6(s) => s,
            MockSensor::Imu9(s) => s,
            MockSensor::Generic(s) => s,
            MockSensor::Voltage(s) => s,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Sensor {
        match self {
            MockSensor::Barometer(s) => s,
            MockSensor::Gps(s) => s,
            MockSensor::Accel(s) => s,
            MockSensor::Gyro(s) => s,
            MockSensor::Mag(s) => s,
            MockSensor::Imu6(s) => s,
            MockSensor::Imu9(s) => s,
            MockSensor::Generic(s) => s,
            MockSensor::Voltage(s) => s,
        }
    }
}

impl Sensor for MockSensor {
    fn name(&self) -> &str {
        self.inner().name()
    }

    fn init(&mut self) -> Result<(), SensorError> {
        self.inner_mut().init()
    }

    fn update(&mut self) -> Result<(), SensorError> {
        self.inner_mut().update()
    }

    fn is_healthy(&self) -> bool {
        self.inner().is_healthy()
    }

    fn is_initialized(&self) -> bool {
        self.inner().is_initialized()
    }
}

macro_rules! impl_from_fake {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for MockSensor {
                fn from(sensor: $ty) -> Self {
                    MockSensor::$variant(sensor)
                }
            }
        )*
    };
}

impl_from_fake! {
    Barometer => FakeBarometer,
    Gps => FakeGps,
    Accel => FakeAccel,
    Gyro => FakeGyro,
    Mag => FakeMag,
    Imu6 => FakeImu6,
    Imu9 => FakeImu9,
    Generic => FakeGenericSensor,
    Voltage => MockVoltageSensor,
}

/// Initialize every sensor, collecting the ones that failed.
pub fn init_all(sensors: &mut [MockSensor]) -> Vec<SensorError> {
    sensors
        .iter_mut()
        .filter_map(|s| s.init().err())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::HarnessContext;

    fn full_set(ctx: &HarnessContext) -> Vec<MockSensor> {
        vec![
            FakeBarometer::new().into(),
            FakeGps::new().into(),
            FakeAccel::new().into(),
            FakeGyro::new().into(),
            FakeMag::new().into(),
            FakeImu6::new().into(),
            FakeImu9::new().into(),
            FakeGenericSensor::default().into(),
            MockVoltageSensor::new(ctx, 14).into(),
        ]
    }

    #[test]
    fn test_enum_dispatches_lifecycle() {
        let ctx = HarnessContext::new();
        let mut sensors = full_set(&ctx);
        assert!(sensors.iter().all(|s| !s.is_initialized()));
        assert!(init_all(&mut sensors).is_empty());
        for sensor in sensors.iter_mut() {
            assert!(sensor.is_initialized(), "{}", sensor.name());
            assert!(sensor.update().is_ok(), "{}", sensor.name());
            assert!(sensor.is_healthy(), "{}", sensor.name());
        }
    }

    #[test]
    fn test_failures_are_collected() {
        let mut sensors: Vec<MockSensor> = vec![
            FakeAccel::failing().into(),
            FakeGyro::new().into(),
        ];
        let errors = init_all(&mut sensors);
        assert_eq!(errors, vec![SensorError::InitFailed("FailingAccel".into())]);
        assert!(sensors[1].is_initialized());
    }

    #[test]
    fn test_update_before_init() {
        let mut sensor = MockSensor::from(FakeBarometer::new());
        assert_eq!(
            sensor.update(),
            Err(SensorError::NotInitialized("FakeBarometer".into()))
        );
    }

    #[test]
    fn test_names() {
        let ctx = HarnessContext::new();
        let names: Vec<String> = full_set(&ctx).iter().map(|s| s.name().to_string()).collect();
        assert_eq!(
            names,
            [
                "FakeBarometer",
                "FakeGPS",
                "FakeAccel",
                "FakeGyro",
                "FakeMag",
                "FakeIMU",
                "FakeIMU9DoF",
                "FakeSensor",
                "MockVoltage",
            ]
        );
    }
}
