// astra_shared: capability traits shared by the native harness, its mocks, and tests

pub mod hardware_traits;
pub mod serial_interface;
pub mod storage_traits;
pub mod vector;

pub use hardware_traits::{AnalogInput, Sensor, SensorError};
pub use serial_interface::{SitlConnection, SitlError};
pub use storage_traits::{LogSink, Storage, StorageFile};
pub use vector::Vec3;

/// Monotonic elapsed-time capability.
///
/// Mirrors the `millis()`/`micros()` pair firmware uses on the microcontroller.
/// Values are elapsed time since the source's origin, not wall-clock time.
pub trait TimeSource {
    fn now_millis(&self) -> u64;
    fn now_micros(&self) -> u64;
    /// Block the caller for `ms` of real time.
    fn sleep_millis(&self, ms: u64);
    /// Block the caller for `us` of real time.
    fn sleep_micros(&self, us: u64);
}
