// src/hardware/scripted_socket.rs - In-memory SITL peer for tests without a real simulator
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use astra_shared::{SitlConnection, SitlError};

use crate::hardware::stream::SocketFactory;

#[derive(Debug, Default)]
struct Wire {
    refusing: bool,
    connected: bool,
    inbound: VecDeque<u8>,
    outbound: Vec<u8>,
    endpoint: Option<(String, u16)>,
    connect_attempts: usize,
}

/// Test-side handle of a scripted SITL process.
///
/// Every `ScriptedSitl` created from the same peer shares its wire, so a test
/// can keep the peer while the `Stream` owns (and drops) the connection.
#[derive(Debug, Clone, Default)]
pub struct ScriptedPeer {
    wire: Rc<RefCell<Wire>>,
}

impl ScriptedPeer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A peer that rejects every connection attempt.
    pub fn refusing() -> Self {
        let peer = Self::default();
        peer.set_refusing(true);
        peer
    }

    pub fn set_refusing(&self, refusing: bool) {
        self.wire.borrow_mut().refusing = refusing;
    }

    /// Queue bytes for the firmware side to read.
    pub fn send(&self, data: &[u8]) {
        self.wire.borrow_mut().inbound.extend(data);
    }

    /// Bytes the firmware side has written so far, draining them.
    pub fn take_received(&self) -> Vec<u8> {
        std::mem::take(&mut self.wire.borrow_mut().outbound)
    }

    /// Bytes queued by `send` that the firmware has not consumed yet.
    pub fn pending(&self) -> usize {
        self.wire.borrow().inbound.len()
    }

    /// Simulate the simulator going away.
    pub fn close(&self) {
        self.wire.borrow_mut().connected = false;
    }

    pub fn is_connected(&self) -> bool {
        self.wire.borrow().connected
    }

    pub fn connect_attempts(&self) -> usize {
        self.wire.borrow().connect_attempts
    }

    pub fn endpoint(&self) -> Option<(String, u16)> {
        self.wire.borrow().endpoint.clone()
    }

    pub fn socket(&self) -> ScriptedSitl {
        ScriptedSitl {
            wire: Rc::clone(&self.wire),
        }
    }

    /// Socket factory for `Stream::with_socket_factory`.
    pub fn factory(&self) -> SocketFactory {
        let peer = self.clone();
        Box::new(move || Box::new(peer.socket()) as Box<dyn SitlConnection>)
    }
}

/// Firmware-side end of a `ScriptedPeer`.
#[derive(Debug)]
pub struct ScriptedSitl {
    wire: Rc<RefCell<Wire>>,
}

impl SitlConnection for ScriptedSitl {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), SitlError> {
        let mut wire = self.wire.borrow_mut();
        wire.connect_attempts += 1;
        if wire.refusing {
            return Err(SitlError::Connect {
                addr: format!("{}:{}", host, port),
                source: io::Error::from(io::ErrorKind::ConnectionRefused),
            });
        }
        wire.connected = true;
        wire.endpoint = Some((host.to_string(), port));
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        let mut wire = self.wire.borrow_mut();
        if !wire.connected {
            return 0;
        }
        let n = buf.len().min(wire.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(wire.inbound.drain(..n)) {
            *slot = byte;
        }
        n
    }

    fn write(&mut self, data: &[u8]) -> usize {
        let mut wire = self.wire.borrow_mut();
        if !wire.connected {
            return 0;
        }
        wire.outbound.extend_from_slice(data);
        data.len()
    }

    fn disconnect(&mut self) {
        self.wire.borrow_mut().connected = false;
    }

    fn is_connected(&self) -> bool {
        self.wire.borrow().connected
    }
}
