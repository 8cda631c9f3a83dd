// src/hardware/mod.rs - Mock board hardware: serial streams, SITL link and pins
pub mod pins;
#[cfg(any(test, feature = "test-support"))]
pub mod scripted_socket;
pub mod serial_ports;
pub mod socket;
pub mod stream;

pub use pins::{HIGH, INPUT, INPUT_PULLUP, LOW, OUTPUT};
pub use serial_ports::SerialPorts;
pub use socket::TcpSitlSocket;
pub use stream::{SocketFactory, Stream, StreamStats};
