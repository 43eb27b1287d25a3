use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ClockError {
    #[error("cannot move time backwards by {delta}")]
    NegativeTimeAdvance { delta: i64 },
}

pub trait Clock {
    fn now(&self) -> u64;

    /// Moves time forward by `delta` and returns the new reading. A negative
    /// delta fails and leaves time unchanged.
    fn advance(&mut self, delta: i64) -> Result<u64, ClockError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(now: u64) -> Self {
        Self { now }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now
    }

    fn advance(&mut self, delta: i64) -> Result<u64, ClockError> {
        if delta < 0 {
            return Err(ClockError::NegativeTimeAdvance { delta });
        }
        self.now = self.now.saturating_add(delta as u64);
        Ok(self.now)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: Instant,
    offset_ms: u64,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            offset_ms: 0,
        }
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> u64 {
        let elapsed = self.start.elapsed().as_millis().min(u64::MAX as u128) as u64;
        elapsed.saturating_add(self.offset_ms)
    }

    fn advance(&mut self, delta: i64) -> Result<u64, ClockError> {
        if delta < 0 {
            return Err(ClockError::NegativeTimeAdvance { delta });
        }
        self.offset_ms = self.offset_ms.saturating_add(delta as u64);
        Ok(self.now())
    }
}
