//! Arduino-style bootstrap: `setup()` once, then `loop()` until the firmware
//! asks to stop.

// src/runner.rs - Firmware entry point and crash reporting
use std::ops::ControlFlow;
use std::panic::PanicHookInfo;

use crate::config::HarnessConfig;
use crate::context::HarnessContext;
use crate::hardware::{SerialPorts, pins};

/// Exit status after a crash (SIGABRT).
pub const CRASH_EXIT_CODE: i32 = 6;

/// Firmware under test.
pub trait Firmware {
    fn setup(&mut self, board: &mut Board);
    fn loop_once(&mut self, board: &mut Board) -> ControlFlow<()>;
}

/// Everything the firmware can touch: time, ADC, and the serial ports.
#[derive(Debug)]
pub struct Board {
    pub ctx: HarnessContext,
    pub serial: SerialPorts,
    config: HarnessConfig,
}

impl Board {
    /// Board on the calling thread's shared context.
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_context(HarnessContext::current(), config)
    }

    pub fn with_context(ctx: HarnessContext, config: HarnessConfig) -> Self {
        let serial = SerialPorts::new(&config);
        Self {
            ctx,
            serial,
            config,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    pub fn millis(&self) -> u64 {
        self.ctx.millis()
    }

    pub fn micros(&self) -> u64 {
        self.ctx.micros()
    }

    pub fn delay(&self, ms: i64) {
        self.ctx.clock().delay(ms);
    }

    pub fn digital_write(&self, pin: i32, value: i32) {
        pins::digital_write(&self.ctx, pin, value);
    }

    pub fn analog_read(&self, pin: i32) -> i32 {
        pins::analog_read(&self.ctx, pin)
    }

    /// Attach `Serial` to the configured SITL endpoint.
    pub fn connect_sitl(&mut self) -> bool {
        let host = self.config.sitl.host.clone();
        let port = self.config.sitl.port;
        self.serial.serial.connect_sitl(&host, port)
    }
}

/// Run `setup` once and `loop_once` until it breaks; returns the loop count.
pub fn run<F: Firmware + ?Sized>(firmware: &mut F, board: &mut Board) -> u64 {
    tracing::info!("Firmware setup");
    if board.config.sitl.auto_connect
        && !board.serial.serial.is_sitl_connected()
        && !board.connect_sitl()
    {
        tracing::warn!("SITL auto-connect failed, running loopback only");
    }
    firmware.setup(board);

    let mut loops = 0u64;
    loop {
        loops += 1;
        if firmware.loop_once(board).is_break() {
            break;
        }
    }
    tracing::info!("Firmware stopped after {} loops", loops);
    loops
}

/// Report any panic as a crash and exit with [`CRASH_EXIT_CODE`].
pub fn install_crash_handler() {
    std::panic::set_hook(Box::new(|info| {
        let report = crash_report(&describe_panic(info));
        eprint!("{}", report);
        tracing::error!("crash: {}", describe_panic(info));
        std::process::exit(CRASH_EXIT_CODE);
    }));
    tracing::info!("Crash handler installed");
}

fn describe_panic(info: &PanicHookInfo<'_>) -> String {
    let payload = info
        .payload()
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| info.payload().downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    match info.location() {
        Some(loc) => format!("{} at {}:{}", payload, loc.file(), loc.line()),
        None => payload,
    }
}

pub fn crash_report(cause: &str) -> String {
    const RULE: &str = "========================================";
    let mut out = String::new();
    out.push_str("\n\n");
    out.push_str(RULE);
    out.push_str("\nCRASH DETECTED!\n");
    out.push_str(&format!("Cause: {}\n", cause));
    out.push_str(RULE);
    out.push_str("\nThe program crashed. Possible causes:\n");
    for cause in [
        "Null pointer dereference",
        "Buffer overflow",
        "Stack overflow",
        "Division by zero",
        "Invalid memory access",
    ] {
        out.push_str(&format!("  - {}\n", cause));
    }
    out.push_str(RULE);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blinker {
        setups: u32,
        toggles: u32,
        limit: u32,
    }

    impl Firmware for Blinker {
        fn setup(&mut self, board: &mut Board) {
            self.setups += 1;
            board.serial.serial.begin(115200);
            board.serial.serial.println("boot");
        }

        fn loop_once(&mut self, board: &mut Board) -> ControlFlow<()> {
            self.toggles += 1;
            board.ctx.clock().advance_millis(500);
            board.digital_write(13, (self.toggles % 2) as i32);
            if self.toggles >= self.limit {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    }

    #[test]
    fn test_setup_once_then_loop() {
        let ctx = HarnessContext::new();
        ctx.set_millis(0);
        let mut board = Board::with_context(ctx, HarnessConfig::default());
        let mut fw = Blinker {
            setups: 0,
            toggles: 0,
            limit: 4,
        };
        let loops = run(&mut fw, &mut board);
        assert_eq!(loops, 4);
        assert_eq!(fw.setups, 1);
        assert_eq!(board.millis(), 2000);
        assert_eq!(board.serial.serial.loopback_str(), "boot\r\n");
        assert_eq!(board.serial.serial.baud(), Some(115200));
    }

    #[test]
    fn test_board_analog_uses_context() {
        let ctx = HarnessContext::new();
        let board = Board::with_context(ctx.clone(), HarnessConfig::default());
        ctx.set_mock_analog_read(3, 42);
        assert_eq!(board.analog_read(3), 42);
        assert_eq!(board.analog_read(4), 512);
    }

    fn auto_connect_config(port: u16) -> HarnessConfig {
        let mut config = HarnessConfig::default();
        config.sitl.host = "127.0.0.1".to_string();
        config.sitl.port = port;
        config.sitl.auto_connect = true;
        config
    }

    #[test]
    fn test_auto_connect_attaches_serial_before_setup() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut board = Board::with_context(HarnessContext::new(), auto_connect_config(port));
        let mut fw = Blinker {
            setups: 0,
            toggles: 0,
            limit: 2,
        };
        assert_eq!(run(&mut fw, &mut board), 2);
        assert!(board.serial.serial.is_sitl_connected());
        drop(listener);
    }

    #[test]
    fn test_auto_connect_refused_runs_loopback_only() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let ctx = HarnessContext::new();
        ctx.set_millis(0);
        let mut board = Board::with_context(ctx, auto_connect_config(port));
        let mut fw = Blinker {
            setups: 0,
            toggles: 0,
            limit: 3,
        };
        assert_eq!(run(&mut fw, &mut board), 3);
        assert_eq!(fw.setups, 1);
        assert!(!board.serial.serial.is_sitl_connected());
        assert_eq!(board.serial.serial.loopback_str(), "boot\r\n");
        assert_eq!(board.millis(), 1500);
    }

    #[test]
    fn test_crash_report_banner() {
        let report = crash_report("index out of bounds at src/fc.rs:10");
        assert!(report.contains("CRASH DETECTED!"));
        assert!(report.contains("Cause: index out of bounds at src/fc.rs:10"));
        assert!(report.contains("  - Stack overflow\n"));
        assert!(report.ends_with("========================================\n"));
    }
}
