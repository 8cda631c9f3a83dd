// src/hardware/serial_ports.rs - The board's four serial ports
use crate::config::HarnessConfig;
use crate::hardware::stream::Stream;

/// `Serial` plus the three extra UARTs the flight computer exposes.
#[derive(Debug)]
pub struct SerialPorts {
    pub serial: Stream,
    pub serial1: Stream,
    pub serial2: Stream,
    pub serial3: Stream,
}

impl SerialPorts {
    pub fn new(config: &HarnessConfig) -> Self {
        let timeout = config.sitl.connect_timeout();
        let port = |name: &str| Stream::with_config(name, &config.stream, timeout);
        Self {
            serial: port("Serial"),
            serial1: port("Serial1"),
            serial2: port("Serial2"),
            serial3: port("Serial3"),
        }
    }

    /// Look a port up by index, 0 being `Serial`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Stream> {
        match index {
            0 => Some(&mut self.serial),
            1 => Some(&mut self.serial1),
            2 => Some(&mut self.serial2),
            3 => Some(&mut self.serial3),
            _ => None,
        }
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Stream> {
        [
            &mut self.serial,
            &mut self.serial1,
            &mut self.serial2,
            &mut self.serial3,
        ]
        .into_iter()
    }

    /// Drop every SITL connection and clear all buffers.
    pub fn reset(&mut self) {
        for port in self.iter_mut() {
            port.disconnect_sitl();
            port.clear_buffer();
        }
    }
}

impl Default for SerialPorts {
    fn default() -> Self {
        Self::new(&HarnessConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ports_are_independent() {
        let mut ports = SerialPorts::default();
        ports.serial.print("a");
        ports.serial2.print("b");
        assert_eq!(ports.serial.loopback(), b"a");
        assert!(ports.serial1.loopback().is_empty());
        assert_eq!(ports.serial2.loopback(), b"b");
        assert_eq!(ports.serial3.name(), "Serial3");
    }

    #[test]
    fn test_index_lookup() {
        let mut ports = SerialPorts::default();
        assert_eq!(ports.get_mut(1).map(|s| s.name().to_string()).as_deref(), Some("Serial1"));
        assert!(ports.get_mut(4).is_none());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut ports = SerialPorts::default();
        for port in ports.iter_mut() {
            port.print("x");
            port.simulate_input("y");
        }
        ports.reset();
        for port in ports.iter_mut() {
            assert!(port.loopback().is_empty());
            assert_eq!(port.available(), 0);
        }
    }

    #[test]
    fn test_capacity_from_config() {
        let mut config = HarnessConfig::default();
        config.stream.input_capacity = 16;
        config.stream.loopback_capacity = 8;
        let ports = SerialPorts::new(&config);
        assert_eq!(ports.serial1.input_capacity(), 16);
        assert_eq!(ports.serial1.loopback_capacity(), 8);
    }
}
