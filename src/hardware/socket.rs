// src/hardware/socket.rs - TCP client connection to an external SITL process
use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use astra_shared::{SitlConnection, SitlError};

/// Non-blocking TCP connection to the simulator.
///
/// The socket is switched to non-blocking mode once connected, so reads return
/// immediately with whatever the kernel has buffered. A clean close or a hard
/// error from the peer drops the stream and the connection reports
/// disconnected from then on.
#[derive(Debug)]
pub struct TcpSitlSocket {
    stream: Option<TcpStream>,
    peer: Option<SocketAddr>,
    connect_timeout: Duration,
}

impl TcpSitlSocket {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            stream: None,
            peer: None,
            connect_timeout,
        }
    }

    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }

    fn drop_stream(&mut self, reason: &str) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
            tracing::info!("SITL connection to {:?} closed: {}", self.peer, reason);
        }
    }
}

impl Default for TcpSitlSocket {
    fn default() -> Self {
        Self::new(Duration::from_millis(1000))
    }
}

impl SitlConnection for TcpSitlSocket {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), SitlError> {
        self.drop_stream("reconnecting");

        let addrs: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|_| SitlError::Resolve {
                host: host.to_string(),
                port,
            })?
            .collect();
        if addrs.is_empty() {
            return Err(SitlError::Resolve {
                host: host.to_string(),
                port,
            });
        }

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => {
                    stream.set_nonblocking(true)?;
                    stream.set_nodelay(true)?;
                    tracing::info!("Connected to SITL at {}", addr);
                    self.stream = Some(stream);
                    self.peer = Some(addr);
                    return Ok(());
                }
                Err(e) => {
                    tracing::debug!("SITL connect to {} failed: {}", addr, e);
                    last_err = Some((addr, e));
                }
            }
        }

        match last_err {
            Some((addr, source)) => Err(SitlError::Connect {
                addr: addr.to_string(),
                source,
            }),
            None => Err(SitlError::Resolve {
                host: host.to_string(),
                port,
            }),
        }
    }

    fn read(&mut self, buf: &mut [u8]) -> usize {
        if buf.is_empty() {
            return 0;
        }
        let Some(stream) = self.stream.as_mut() else {
            return 0;
        };
        match stream.read(buf) {
            Ok(0) => {
                self.drop_stream("peer closed the connection");
                0
            }
            Ok(n) => {
                tracing::trace!("SITL RX {} bytes", n);
                n
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::Interrupted) => 0,
            Err(e) => {
                tracing::warn!("SITL read error: {}", e);
                self.drop_stream("read error");
                0
            }
        }
    }

    fn write(&mut self, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }
        let Some(stream) = self.stream.as_mut() else {
            return 0;
        };
        let mut written = 0;
        while written < data.len() {
            match stream.write(&data[written..]) {
                Ok(0) => {
                    self.drop_stream("peer stopped accepting data");
                    break;
                }
                Ok(n) => written += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == ErrorKind::WouldBlock => {
                    tracing::debug!(
                        "SITL send buffer full, dropped {} bytes",
                        data.len() - written
                    );
                    break;
                }
                Err(e) => {
                    tracing::warn!("SITL write error: {}", e);
                    self.drop_stream("write error");
                    break;
                }
            }
        }
        written
    }

    fn disconnect(&mut self) {
        self.drop_stream("disconnect requested");
        self.peer = None;
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }
}

impl Drop for TcpSitlSocket {
    fn drop(&mut self) {
        self.drop_stream("socket dropped");
    }
}
