// src/echo.rs - Built-in firmware that echoes SITL lines back with a timestamp
use std::ops::ControlFlow;

use crate::runner::{Board, Firmware};

/// Longest line kept; longer input is split.
const MAX_LINE: usize = 256;

/// Echo every `\n`-terminated line received on `Serial` as `[<ms>] <line>`.
///
/// Stops once the SITL connection goes away.
#[derive(Debug, Default)]
pub struct EchoFirmware {
    line: Vec<u8>,
    echoed: u64,
}

impl EchoFirmware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines_echoed(&self) -> u64 {
        self.echoed
    }

    fn emit(&mut self, board: &mut Board) {
        let text = String::from_utf8_lossy(&self.line).trim_end_matches('\r').to_string();
        let reply = format!("[{}] {}", board.millis(), text);
        tracing::debug!("echo: {}", reply);
        board.serial.serial.println(&reply);
        self.line.clear();
        self.echoed += 1;
    }
}

impl Firmware for EchoFirmware {
    fn setup(&mut self, board: &mut Board) {
        board.serial.serial.begin(115200);
        board.serial.serial.println("astra-native echo ready");
    }

    fn loop_once(&mut self, board: &mut Board) -> ControlFlow<()> {
        while let Some(b) = board.serial.serial.read() {
            if b == b'\n' {
                self.emit(board);
                continue;
            }
            self.line.push(b);
            if self.line.len() >= MAX_LINE {
                self.emit(board);
            }
        }
        if !board.serial.serial.is_sitl_connected() {
            if !self.line.is_empty() {
                self.emit(board);
            }
            return ControlFlow::Break(());
        }
        board.delay(1);
        ControlFlow::Continue(())
    }
}
