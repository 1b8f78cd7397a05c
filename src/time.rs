use std::time::{Duration, Instant};

/// Wall clock for realtime hosts. Headless runs advance a simulated elapsed time instead.
pub struct Time {
    start: Instant,
    last: Instant,
    pub delta: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self { start: now, last: now, delta: Duration::ZERO }
    }

    pub fn tick(&mut self) {
        let now = Instant::now();
        self.delta = now - self.last;
        self.last = now;
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed(&self) -> Duration {
        self.last.duration_since(self.start)
    }
}

/// Fixed-cadence on/off toggle driven by wall-clock time, independent of frame rate.
#[derive(Debug, Clone)]
pub struct BlinkTimer {
    interval: Duration,
    fired: u64,
    lit: bool,
}

impl BlinkTimer {
    pub fn new(interval: Duration) -> Self {
        Self { interval, fired: 0, lit: false }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn lit(&self) -> bool {
        self.lit
    }

    pub fn reset(&mut self) {
        self.fired = 0;
        self.lit = false;
    }

    /// Catches up with `elapsed` (time since the timer was started or reset), flipping once
    /// per interval boundary crossed. Returns the number of flips applied.
    pub fn sync(&mut self, elapsed: Duration) -> u64 {
        if self.interval.is_zero() {
            return 0;
        }
        let due = (elapsed.as_nanos() / self.interval.as_nanos()) as u64;
        if due <= self.fired {
            return 0;
        }
        let flips = due - self.fired;
        self.fired = due;
        if flips % 2 == 1 {
            self.lit = !self.lit;
        }
        flips
    }
}
