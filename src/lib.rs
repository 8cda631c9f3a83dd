// src/lib.rs - Native test harness and mock hardware for the Astra flight computer
pub mod clock;
pub mod config;
pub mod context;
pub mod echo;
pub mod error;
pub mod hardware;
pub mod logging;
pub mod runner;
pub mod sensors;
pub mod storage;

pub use clock::FakeClock;
pub use config::{HarnessConfig, load_config};
pub use context::{DEFAULT_ANALOG_READING, HarnessContext};
pub use error::HarnessError;
pub use hardware::{SerialPorts, Stream, StreamStats};
pub use runner::{Board, Firmware, install_crash_handler, run};
