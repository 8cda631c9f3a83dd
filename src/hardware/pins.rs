// src/hardware/pins.rs - GPIO and ADC mocks
use astra_shared::AnalogInput;

use crate::context::HarnessContext;

pub const LOW: i32 = 0;
pub const HIGH: i32 = 1;

pub const INPUT: i32 = 0;
pub const OUTPUT: i32 = 1;
pub const INPUT_PULLUP: i32 = 2;

/// Pin modes are not tracked.
pub fn pin_mode(pin: i32, mode: i32) {
    tracing::trace!("pinMode({}, {})", pin, mode);
}

/// Print a coloured `<seconds> - <pin> to <LOW|HIGH>` line to stdout.
pub fn digital_write(ctx: &HarnessContext, pin: i32, value: i32) {
    println!("{}", format_pin_write(ctx.millis(), pin, value));
    tracing::debug!(pin, value, "digitalWrite");
}

/// Always reads LOW.
pub fn digital_read(_pin: i32) -> i32 {
    LOW
}

pub fn analog_read(ctx: &HarnessContext, pin: i32) -> i32 {
    ctx.analog_read(pin)
}

/// ANSI colour for the board's LED pins, 0 (default) for anything else.
fn pin_color(pin: i32) -> u8 {
    match pin {
        13 => 36,
        33 => 33,
        32 => 95,
        _ => 0,
    }
}

pub(crate) fn format_pin_write(millis: u64, pin: i32, value: i32) -> String {
    let (level_color, level) = if value == LOW {
        (91, "LOW")
    } else {
        (92, "HIGH")
    };
    format!(
        "\x1B[{}m{:.3} - {} to \x1B[{}m{}\x1B[0m",
        pin_color(pin),
        millis as f64 / 1000.0,
        pin,
        level_color,
        level
    )
}
