//! Serial stream shim.
//!
//! `Stream` stands in for a hardware UART. Firmware reads from a fixed-size
//! input buffer and writes into a fixed-size loopback buffer kept for test
//! inspection. When a SITL connection is attached, reads first poll the
//! simulator for new bytes and every write is mirrored to it.
//!
//! Nothing here blocks or fails. Overflowing either buffer silently drops the
//! excess (counted in [`StreamStats`]), the way a real UART drops bytes.

use std::borrow::Cow;
use std::time::Duration;

use astra_shared::SitlConnection;

use crate::config::StreamConfig;
use crate::hardware::socket::TcpSitlSocket;

/// Largest chunk pulled from the SITL connection per poll.
const POLL_CHUNK: usize = 256;

/// Builds the connection a stream owns once `connect_sitl` is called.
pub type SocketFactory = Box<dyn Fn() -> Box<dyn SitlConnection>>;

/// Byte counters for one stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamStats {
    pub bytes_written: u64,
    pub bytes_forwarded: u64,
    pub bytes_received: u64,
    pub loopback_dropped: u64,
    pub input_dropped: u64,
}

pub struct Stream {
    name: String,
    baud: Option<u32>,
    loopback: Vec<u8>,
    loopback_capacity: usize,
    input: Box<[u8]>,
    input_len: usize,
    input_cursor: usize,
    sitl: Option<Box<dyn SitlConnection>>,
    socket_factory: SocketFactory,
    stats: StreamStats,
}

impl Stream {
    /// A stream with default buffer sizes that connects over TCP.
    pub fn new(name: &str) -> Self {
        Self::with_config(name, &StreamConfig::default(), Duration::from_millis(1000))
    }

    pub fn with_config(name: &str, config: &StreamConfig, connect_timeout: Duration) -> Self {
        Self::with_socket_factory(
            name,
            config,
            Box::new(move || {
                Box::new(TcpSitlSocket::new(connect_timeout)) as Box<dyn SitlConnection>
            }),
        )
    }

    pub fn with_socket_factory(
        name: &str,
        config: &StreamConfig,
        socket_factory: SocketFactory,
    ) -> Self {
        Self {
            name: name.to_string(),
            baud: None,
            loopback: Vec::with_capacity(config.loopback_capacity),
            loopback_capacity: config.loopback_capacity,
            input: vec![0u8; config.input_capacity].into_boxed_slice(),
            input_len: 0,
            input_cursor: 0,
            sitl: None,
            socket_factory,
            stats: StreamStats::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn begin(&mut self, baud: u32) {
        tracing::debug!("{}: begin at {} baud", self.name, baud);
        self.baud = Some(baud);
    }

    pub fn end(&mut self) {
        self.disconnect_sitl();
    }

    /// Baud rate passed to the last `begin`, if any.
    pub fn baud(&self) -> Option<u32> {
        self.baud
    }

    pub fn input_capacity(&self) -> usize {
        self.input.len()
    }

    pub fn loopback_capacity(&self) -> usize {
        self.loopback_capacity
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    // -- SITL connection --

    /// Attach this stream to a SITL process, replacing any live connection.
    ///
    /// Returns `false` (and stays loopback-only) if the connection fails.
    pub fn connect_sitl(&mut self, host: &str, port: u16) -> bool {
        let socket = self.sitl.get_or_insert_with(|| (self.socket_factory)());
        if socket.is_connected() {
            socket.disconnect();
        }
        match socket.connect(host, port) {
            Ok(()) => {
                tracing::info!("{}: SITL connected to {}:{}", self.name, host, port);
                true
            }
            Err(e) => {
                tracing::warn!("{}: SITL connect failed: {}", self.name, e);
                self.sitl = None;
                false
            }
        }
    }

    pub fn disconnect_sitl(&mut self) {
        if let Some(mut socket) = self.sitl.take() {
            socket.disconnect();
            tracing::debug!("{}: SITL disconnected", self.name);
        }
    }

    pub fn is_sitl_connected(&self) -> bool {
        self.sitl.as_ref().is_some_and(|s| s.is_connected())
    }

    fn poll_sitl(&mut self) {
        let Some(socket) = self.sitl.as_mut() else {
            return;
        };
        if !socket.is_connected() {
            return;
        }

        if self.input_cursor >= self.input_len {
            self.input_cursor = 0;
            self.input_len = 0;
        }

        let room = self.input.len() - self.input_len;
        if room == 0 {
            return;
        }
        let end = self.input_len + room.min(POLL_CHUNK);
        let n = socket
            .read(&mut self.input[self.input_len..end])
            .min(end - self.input_len);
        self.input_len += n;
        self.stats.bytes_received += n as u64;
    }

    // -- Read path --

    /// Number of unread bytes.
    pub fn available(&mut self) -> usize {
        self.poll_sitl();
        self.input_len - self.input_cursor
    }

    pub fn read(&mut self) -> Option<u8> {
        self.poll_sitl();
        if self.input_cursor >= self.input_len {
            return None;
        }
        let b = self.input[self.input_cursor];
        self.input_cursor += 1;
        Some(b)
    }

    pub fn peek(&mut self) -> Option<u8> {
        self.poll_sitl();
        if self.input_cursor >= self.input_len {
            return None;
        }
        Some(self.input[self.input_cursor])
    }

    /// Read until `terminator` (consumed, not copied), a full `buf`, or no more input.
    pub fn read_bytes_until(&mut self, terminator: u8, buf: &mut [u8]) -> usize {
        let mut count = 0;
        while count < buf.len() {
            match self.read() {
                Some(b) if b == terminator => break,
                Some(b) => {
                    buf[count] = b;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    pub fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        let mut count = 0;
        while count < buf.len() {
            match self.read() {
                Some(b) => {
                    buf[count] = b;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Replace the input buffer with `data` (truncated to capacity).
    pub fn simulate_input(&mut self, data: impl AsRef<[u8]>) {
        let data = data.as_ref();
        let len = data.len().min(self.input.len());
        if len < data.len() {
            self.stats.input_dropped += (data.len() - len) as u64;
        }
        self.input[..len].copy_from_slice(&data[..len]);
        self.input_len = len;
        self.input_cursor = 0;
    }

    // -- Write path --

    pub fn write_byte(&mut self, b: u8) -> usize {
        self.write(&[b])
    }

    /// Record `data` in the loopback buffer and mirror it to SITL.
    ///
    /// Always reports the full length as accepted.
    pub fn write(&mut self, data: &[u8]) -> usize {
        if data.is_empty() {
            return 0;
        }
        let room = self.loopback_capacity - self.loopback.len();
        let kept = data.len().min(room);
        self.loopback.extend_from_slice(&data[..kept]);
        self.stats.loopback_dropped += (data.len() - kept) as u64;
        self.stats.bytes_written += data.len() as u64;

        if let Some(socket) = self.sitl.as_mut() {
            if socket.is_connected() {
                let sent = socket.write(data);
                self.stats.bytes_forwarded += sent as u64;
            }
        }
        data.len()
    }

    pub fn print(&mut self, text: &str) -> usize {
        self.write(text.as_bytes())
    }

    pub fn println(&mut self, text: &str) -> usize {
        self.print(text) + self.write(b"\r\n")
    }

    /// Everything written since the last `clear_buffer` that fit the loopback.
    pub fn loopback(&self) -> &[u8] {
        &self.loopback
    }

    pub fn loopback_str(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.loopback)
    }

    pub fn clear_buffer(&mut self) {
        self.loopback.clear();
        self.input_len = 0;
        self.input_cursor = 0;
    }
}

impl std::io::Write for Stream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        Ok(Stream::write(self, buf))
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Drop for Stream {
    fn drop(&mut self) {
        self.disconnect_sitl();
    }
}

impl std::fmt::Debug for Stream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stream")
            .field("name", &self.name)
            .field("baud", &self.baud)
            .field("unread", &(self.input_len - self.input_cursor))
            .field("loopback_len", &self.loopback.len())
            .field("sitl_connected", &self.is_sitl_connected())
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::scripted_socket::ScriptedPeer;
    use std::io::Write as _;

    fn small(input: usize, loopback: usize) -> StreamConfig {
        StreamConfig {
            input_capacity: input,
            loopback_capacity: loopback,
        }
    }

    fn scripted(peer: &ScriptedPeer, config: StreamConfig) -> Stream {
        Stream::with_socket_factory("Serial", &config, peer.factory())
    }

    #[test]
    fn test_simulated_input_reads_in_order() {
        let mut stream = Stream::new("Serial");
        stream.simulate_input("abc");
        assert_eq!(stream.available(), 3);
        assert_eq!(stream.read(), Some(b'a'));
        assert_eq!(stream.read(), Some(b'b'));
        assert_eq!(stream.read(), Some(b'c'));
        assert_eq!(stream.read(), None);
        assert_eq!(stream.available(), 0);
    }

    #[test]
    fn test_peek_does_not_advance() {
        let mut stream = Stream::new("Serial");
        stream.simulate_input("xy");
        assert_eq!(stream.peek(), Some(b'x'));
        assert_eq!(stream.peek(), Some(b'x'));
        assert_eq!(stream.read(), Some(b'x'));
        assert_eq!(stream.peek(), Some(b'y'));
        assert_eq!(stream.read(), Some(b'y'));
        assert_eq!(stream.peek(), None);
    }

    #[test]
    fn test_simulate_input_overwrites_and_truncates() {
        let mut stream = Stream::with_config("Serial", &small(4, 16), Duration::from_millis(10));
        stream.simulate_input("first");
        stream.read();
        stream.simulate_input("abcdefgh");
        let mut buf = [0u8; 8];
        assert_eq!(stream.read_bytes(&mut buf), 4);
        assert_eq!(&buf[..4], b"abcd");
        assert_eq!(stream.stats().input_dropped, 5);
    }

    #[test]
    fn test_read_bytes_until_excludes_terminator() {
        let mut stream = Stream::new("Serial");
        stream.simulate_input("PING\nPONG");
        let mut buf = [0u8; 16];
        let n = stream.read_bytes_until(b'\n', &mut buf);
        assert_eq!(n, 4);
        assert_eq!(&buf[..n], b"PING");
        let n = stream.read_bytes_until(b'\n', &mut buf);
        assert_eq!(&buf[..n], b"PONG");
    }

    #[test]
    fn test_read_bytes_until_stops_at_buffer_len() {
        let mut stream = Stream::new("Serial");
        stream.simulate_input("ABCDEF\n");
        let mut buf = [0u8; 3];
        assert_eq!(stream.read_bytes_until(b'\n', &mut buf), 3);
        assert_eq!(&buf, b"ABC");
        assert_eq!(stream.read(), Some(b'D'));
    }

    #[test]
    fn test_zero_length_requests_are_noops() {
        let mut stream = Stream::new("Serial");
        stream.simulate_input("Z");
        assert_eq!(stream.read_bytes_until(b'\n', &mut []), 0);
        assert_eq!(stream.read_bytes(&mut []), 0);
        assert_eq!(stream.write(&[]), 0);
        assert_eq!(stream.read(), Some(b'Z'));
        assert!(stream.loopback().is_empty());
    }

    #[test]
    fn test_loopback_truncates_but_reports_full_write() {
        let mut stream = Stream::with_config("Serial", &small(8, 4), Duration::from_millis(10));
        assert_eq!(stream.write(b"123456"), 6);
        assert_eq!(stream.write_byte(b'7'), 1);
        assert_eq!(stream.loopback(), b"1234");
        assert_eq!(stream.stats().loopback_dropped, 3);
        assert_eq!(stream.stats().bytes_written, 7);
    }

    #[test]
    fn test_println_and_io_write() {
        let mut stream = Stream::new("Serial");
        stream.println("hello");
        write!(stream, "t={}", 42).unwrap();
        assert_eq!(stream.loopback_str(), "hello\r\nt=42");
    }

    #[test]
    fn test_clear_buffer_resets_both_sides() {
        let mut stream = Stream::new("Serial");
        stream.print("out");
        stream.simulate_input("in");
        stream.clear_buffer();
        assert!(stream.loopback().is_empty());
        assert_eq!(stream.available(), 0);
        assert_eq!(stream.read(), None);
    }

    #[test]
    fn test_connect_and_forward_writes() {
        let peer = ScriptedPeer::new();
        let mut stream = scripted(&peer, StreamConfig::default());
        assert!(!stream.is_sitl_connected());
        assert!(stream.connect_sitl("127.0.0.1", 5555));
        assert!(stream.is_sitl_connected());
        assert_eq!(peer.endpoint(), Some(("127.0.0.1".to_string(), 5555)));

        stream.print("TELEM/1,2\n");
        assert_eq!(peer.take_received(), b"TELEM/1,2\n");
        assert_eq!(stream.loopback(), b"TELEM/1,2\n");
        assert_eq!(stream.stats().bytes_forwarded, 10);
    }

    #[test]
    fn test_polls_sitl_before_reading() {
        let peer = ScriptedPeer::new();
        let mut stream = scripted(&peer, StreamConfig::default());
        stream.connect_sitl("localhost", 5555);
        assert_eq!(stream.read(), None);

        peer.send(b"HITL/0.020,1\n");
        assert_eq!(stream.peek(), Some(b'H'));
        let mut line = [0u8; 32];
        let n = stream.read_bytes_until(b'\n', &mut line);
        assert_eq!(&line[..n], b"HITL/0.020,1");
        assert_eq!(stream.stats().bytes_received, 13);
    }

    #[test]
    fn test_drained_buffer_is_reused() {
        let peer = ScriptedPeer::new();
        let mut stream = scripted(&peer, small(8, 8));
        stream.connect_sitl("localhost", 5555);
        for round in 0..5u8 {
            peer.send(&[round; 6]);
            let mut buf = [0u8; 6];
            assert_eq!(stream.read_bytes(&mut buf), 6);
            assert_eq!(buf, [round; 6]);
        }
    }

    #[test]
    fn test_sitl_input_beyond_capacity_stays_queued() {
        let peer = ScriptedPeer::new();
        let mut stream = scripted(&peer, small(4, 8));
        stream.connect_sitl("localhost", 5555);
        peer.send(b"abcdefg");
        assert_eq!(stream.available(), 4);
        assert_eq!(peer.pending(), 3);

        let mut buf = [0u8; 7];
        assert_eq!(stream.read_bytes(&mut buf), 7);
        assert_eq!(&buf, b"abcdefg");
    }

    #[test]
    fn test_failed_connect_stays_loopback_only() {
        let peer = ScriptedPeer::refusing();
        let mut stream = scripted(&peer, StreamConfig::default());
        assert!(!stream.connect_sitl("10.255.255.1", 5555));
        assert!(!stream.is_sitl_connected());

        assert_eq!(stream.write(b"still works"), 11);
        assert_eq!(stream.loopback(), b"still works");
        assert!(peer.take_received().is_empty());
        stream.simulate_input("x");
        assert_eq!(stream.read(), Some(b'x'));
    }

    #[test]
    fn test_reconnect_tears_down_first() {
        let peer = ScriptedPeer::new();
        let mut stream = scripted(&peer, StreamConfig::default());
        assert!(stream.connect_sitl("localhost", 5555));
        assert!(stream.connect_sitl("localhost", 5556));
        assert_eq!(peer.connect_attempts(), 2);
        assert_eq!(peer.endpoint(), Some(("localhost".to_string(), 5556)));
        assert!(stream.is_sitl_connected());
    }

    #[test]
    fn test_disconnect_is_idempotent() {
        let peer = ScriptedPeer::new();
        let mut stream = scripted(&peer, StreamConfig::default());
        stream.disconnect_sitl();
        stream.connect_sitl("localhost", 5555);
        stream.disconnect_sitl();
        assert!(!peer.is_connected());
        stream.disconnect_sitl();
        assert!(!stream.is_sitl_connected());

        stream.print("after");
        assert!(peer.take_received().is_empty());
    }

    #[test]
    fn test_peer_close_reads_as_loopback_only() {
        let peer = ScriptedPeer::new();
        let mut stream = scripted(&peer, StreamConfig::default());
        stream.connect_sitl("localhost", 5555);
        peer.close();
        assert!(!stream.is_sitl_connected());
        peer.send(b"late");
        assert_eq!(stream.read(), None);
        assert_eq!(stream.write(b"x"), 1);
    }

    #[test]
    fn test_drop_and_end_release_connection() {
        let peer = ScriptedPeer::new();
        {
            let mut stream = scripted(&peer, StreamConfig::default());
            stream.connect_sitl("localhost", 5555);
            assert!(peer.is_connected());
        }
        assert!(!peer.is_connected());

        let mut stream = scripted(&peer, StreamConfig::default());
        stream.begin(115200);
        stream.connect_sitl("localhost", 5555);
        stream.end();
        assert!(!peer.is_connected());
        assert_eq!(stream.baud(), Some(115200));
    }
}
