//! Fake clock backing `millis()` / `micros()` for native builds.
//!
//! In real mode elapsed time tracks the monotonic clock from the moment the
//! clock was created. `set_millis` switches to fake mode where time is frozen
//! until a test moves it. Sleeping always spends real time and never advances
//! the fake value.

use std::cell::Cell;
use std::time::{Duration, Instant};

use astra_shared::TimeSource;

#[derive(Debug)]
pub struct FakeClock {
    origin: Instant,
    fake_millis: Cell<u64>,
    use_fake: Cell<bool>,
}

impl FakeClock {
    /// Capture the origin now; starts in real mode.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            fake_millis: Cell::new(0),
            use_fake: Cell::new(false),
        }
    }

    pub fn millis(&self) -> u64 {
        if self.use_fake.get() {
            return self.fake_millis.get();
        }
        self.origin.elapsed().as_millis() as u64
    }

    pub fn micros(&self) -> u64 {
        if self.use_fake.get() {
            return self.fake_millis.get().saturating_mul(1000);
        }
        self.origin.elapsed().as_micros() as u64
    }

    /// Enter fake mode with elapsed time pinned to `ms`.
    pub fn set_millis(&self, ms: u64) {
        self.fake_millis.set(ms);
        self.use_fake.set(true);
    }

    /// Move virtual time forward, entering fake mode at the current reading.
    pub fn advance_millis(&self, ms: u64) {
        let now = self.millis();
        self.set_millis(now.saturating_add(ms));
    }

    /// Leave fake mode and track real time from the original origin again.
    pub fn reset(&self) {
        self.fake_millis.set(0);
        self.use_fake.set(false);
    }

    pub fn is_fake(&self) -> bool {
        self.use_fake.get()
    }

    pub fn sleep_millis(&self, ms: u64) {
        spin_wait(Duration::from_millis(ms));
    }

    pub fn sleep_micros(&self, us: u64) {
        spin_wait(Duration::from_micros(us));
    }

    /// `delay(int)` flavour: non-positive durations return immediately.
    pub fn delay(&self, ms: i64) {
        if ms <= 0 {
            return;
        }
        self.sleep_millis(ms as u64);
    }

    /// Cooperative yield point; nothing to hand control to on the host.
    pub fn yield_now(&self) {}
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for FakeClock {
    fn now_millis(&self) -> u64 {
        self.millis()
    }

    fn now_micros(&self) -> u64 {
        self.micros()
    }

    fn sleep_millis(&self, ms: u64) {
        FakeClock::sleep_millis(self, ms);
    }

    fn sleep_micros(&self, us: u64) {
        FakeClock::sleep_micros(self, us);
    }
}

fn spin_wait(duration: Duration) {
    let start = Instant::now();
    while start.elapsed() < duration {
        std::hint::spin_loop();
    }
}
