// Stream <-> SITL simulator over a real TCP socket, with a tokio listener as the simulator

use std::time::Duration;

use astra_native::Stream;
use astra_native::config::StreamConfig;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Poll `available()` until `want` bytes are buffered or two seconds pass.
async fn wait_available(stream: &mut Stream, want: usize) -> usize {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        let n = stream.available();
        if n >= want || tokio::time::Instant::now() >= deadline {
            return n;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

async fn bind() -> (TcpListener, u16) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    (listener, port)
}

#[tokio::test]
async fn test_round_trip_through_simulator() {
    let (listener, port) = bind().await;
    let mut stream = Stream::new("Serial");
    assert!(stream.connect_sitl("127.0.0.1", port));
    let (mut sim, _) = listener.accept().await.unwrap();

    stream.println("TELEM/0.00,101325");
    let mut got = vec![0u8; 19];
    sim.read_exact(&mut got).await.unwrap();
    assert_eq!(got, b"TELEM/0.00,101325\r\n");

    sim.write_all(b"HITL/0.02,12.5\n").await.unwrap();
    assert_eq!(wait_available(&mut stream, 15).await, 15);
    let mut line = [0u8; 32];
    let n = stream.read_bytes_until(b'\n', &mut line);
    assert_eq!(&line[..n], b"HITL/0.02,12.5");
    assert_eq!(stream.stats().bytes_received, 15);
}

#[tokio::test]
async fn test_simulator_closing_disconnects_stream() {
    let (listener, port) = bind().await;
    let mut stream = Stream::new("Serial1");
    assert!(stream.connect_sitl("localhost", port));
    let (sim, _) = listener.accept().await.unwrap();
    drop(sim);

    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while stream.is_sitl_connected() && tokio::time::Instant::now() < deadline {
        stream.available();
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(!stream.is_sitl_connected());
    assert_eq!(stream.write(b"after"), 5);
    assert_eq!(stream.loopback(), b"after");
}

#[tokio::test]
async fn test_backlog_beyond_capacity_is_not_lost() {
    let (listener, port) = bind().await;
    let config = StreamConfig {
        input_capacity: 8,
        loopback_capacity: 8,
    };
    let mut stream = Stream::with_config("Serial", &config, Duration::from_millis(500));
    assert!(stream.connect_sitl("127.0.0.1", port));
    let (mut sim, _) = listener.accept().await.unwrap();

    let burst: Vec<u8> = (0u8..40).collect();
    sim.write_all(&burst).await.unwrap();
    assert_eq!(wait_available(&mut stream, 8).await, 8);

    let mut got = Vec::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while got.len() < burst.len() && tokio::time::Instant::now() < deadline {
        match stream.read() {
            Some(b) => got.push(b),
            None => tokio::time::sleep(Duration::from_millis(5)).await,
        }
    }
    assert_eq!(got, burst);
}

#[tokio::test]
async fn test_refused_connection() {
    let port = {
        let (listener, port) = bind().await;
        drop(listener);
        port
    };
    let mut stream = Stream::new("Serial");
    assert!(!stream.connect_sitl("127.0.0.1", port));
    assert!(!stream.is_sitl_connected());
    stream.disconnect_sitl();
}
