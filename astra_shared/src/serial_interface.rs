use thiserror::Error;

#[derive(Debug, Error)]
pub enum SitlError {
    #[error("could not resolve SITL host {host}:{port}")]
    Resolve { host: String, port: u16 },
    #[error("connection to SITL at {addr} failed: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("socket setup failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Point-to-point byte stream to an external SITL process.
///
/// Implementations never block on `read`/`write`: firmware polls them from its
/// run loop and cannot tolerate stalls. A disconnected connection reads and
/// writes zero bytes instead of failing.
pub trait SitlConnection {
    fn connect(&mut self, host: &str, port: u16) -> Result<(), SitlError>;
    /// Copy whatever bytes are available right now into `buf`.
    fn read(&mut self, buf: &mut [u8]) -> usize;
    /// Send as much of `data` as the peer accepts right now.
    fn write(&mut self, data: &[u8]) -> usize;
    /// Safe to call when already disconnected.
    fn disconnect(&mut self);
    fn is_connected(&self) -> bool;
}
