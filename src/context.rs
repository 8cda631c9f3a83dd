//! Process-wide test context: the fake clock and the mock analog table.
//!
//! Firmware on the microcontroller reaches `millis()` and `analogRead()` from
//! anywhere. Here that state lives in one `HarnessContext` handed to every
//! mock that needs it. Handles are cheap clones of the same state.
//!
//! The context is `!Send` and `!Sync`: it models the single-core run loop
//! and nothing in it is synchronized. `current()` gives
//! each thread its own shared instance, so parallel test threads never see
//! each other's fake time or analog values.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use astra_shared::{AnalogInput, TimeSource};

use crate::clock::FakeClock;

/// Reading returned for pins no test has set (mid-range of a 10-bit ADC).
pub const DEFAULT_ANALOG_READING: i32 = 512;

/// Pin -> last injected ADC reading.
#[derive(Debug, Default)]
pub struct AnalogTable {
    values: RefCell<HashMap<i32, i32>>,
}

impl AnalogTable {
    pub fn set(&self, pin: i32, value: i32) {
        self.values.borrow_mut().insert(pin, value);
    }

    pub fn get(&self, pin: i32) -> i32 {
        self.values
            .borrow()
            .get(&pin)
            .copied()
            .unwrap_or(DEFAULT_ANALOG_READING)
    }

    pub fn clear(&self) {
        self.values.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.values.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.borrow().is_empty()
    }
}

#[derive(Debug, Default)]
struct ContextState {
    clock: FakeClock,
    analog: AnalogTable,
}

#[derive(Debug, Clone, Default)]
pub struct HarnessContext {
    state: Rc<ContextState>,
}

thread_local! {
    static CURRENT: HarnessContext = HarnessContext::new();
}

impl HarnessContext {
    /// A fresh, private context with its own clock origin.
    pub fn new() -> Self {
        Self::default()
    }

    /// The shared context of the calling thread.
    pub fn current() -> Self {
        CURRENT.with(|ctx| ctx.clone())
    }

    pub fn clock(&self) -> &FakeClock {
        &self.state.clock
    }

    pub fn analog(&self) -> &AnalogTable {
        &self.state.analog
    }

    pub fn millis(&self) -> u64 {
        self.state.clock.millis()
    }

    pub fn micros(&self) -> u64 {
        self.state.clock.micros()
    }

    pub fn set_millis(&self, ms: u64) {
        self.state.clock.set_millis(ms);
    }

    pub fn reset_millis(&self) {
        self.state.clock.reset();
    }

    pub fn set_mock_analog_read(&self, pin: i32, value: i32) {
        self.state.analog.set(pin, value);
    }

    pub fn clear_mock_analog_reads(&self) {
        self.state.analog.clear();
    }

    /// Whether two handles refer to the same underlying state.
    pub fn same_as(&self, other: &HarnessContext) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl AnalogInput for HarnessContext {
    fn analog_read(&self, pin: i32) -> i32 {
        self.state.analog.get(pin)
    }
}

impl TimeSource for HarnessContext {
    fn now_millis(&self) -> u64 {
        self.state.clock.millis()
    }

    fn now_micros(&self) -> u64 {
        self.state.clock.micros()
    }

    fn sleep_millis(&self, ms: u64) {
        self.state.clock.sleep_millis(ms);
    }

    fn sleep_micros(&self, us: u64) {
        self.state.clock.sleep_micros(us);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analog_default_and_override() {
        let ctx = HarnessContext::new();
        assert_eq!(ctx.analog_read(2), DEFAULT_ANALOG_READING);
        ctx.set_mock_analog_read(2, 777);
        assert_eq!(ctx.analog_read(2), 777);
        assert_eq!(ctx.analog_read(3), DEFAULT_ANALOG_READING);
        ctx.clear_mock_analog_reads();
        assert_eq!(ctx.analog_read(2), DEFAULT_ANALOG_READING);
        assert!(ctx.analog().is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let ctx = HarnessContext::new();
        ctx.set_mock_analog_read(7, 1);
        ctx.set_mock_analog_read(7, 1023);
        assert_eq!(ctx.analog_read(7), 1023);
        assert_eq!(ctx.analog().len(), 1);
    }

    #[test]
    fn test_clones_share_state() {
        let ctx = HarnessContext::new();
        let other = ctx.clone();
        other.set_millis(42);
        assert_eq!(ctx.millis(), 42);
        assert!(ctx.same_as(&other));
        assert!(!ctx.same_as(&HarnessContext::new()));
    }

    #[test]
    fn test_current_is_shared_within_thread() {
        let a = HarnessContext::current();
        let b = HarnessContext::current();
        assert!(a.same_as(&b));
    }

    #[test]
    fn test_current_differs_across_threads() {
        HarnessContext::current().set_mock_analog_read(9, 100);
        let seen = std::thread::spawn(|| HarnessContext::current().analog_read(9))
            .join()
            .unwrap();
        assert_eq!(seen, DEFAULT_ANALOG_READING);
    }
}
