use std::time::Duration;

/// Tracks simulation time: a monotonic tick counter and total elapsed time.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    tick: u64,
    elapsed: Duration,
}

impl SimClock {
    /// A clock at tick 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// A clock resumed from a saved tick count and elapsed time.
    pub fn resume(tick: u64, elapsed: Duration) -> Self {
        Self { tick, elapsed }
    }

    /// Advance by one tick of length `delta`. Returns the new tick number.
    pub fn advance(&mut self, delta: Duration) -> u64 {
        self.tick += 1;
        self.elapsed += delta;
        self.tick
    }

    /// The current tick number.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Total simulated time.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}
