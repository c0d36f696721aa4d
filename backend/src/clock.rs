//! Logical simulation clock.
//!
//! The marketplace prefers a simulated "current time" over wall time so that
//! tests, the simulator, and an embedding application all observe the same
//! notion of "now" without depending on the system clock.

use serde::{Deserialize, Serialize};

/// A canonical start time: 2024-01-01T00:00:00Z, in seconds since the Unix epoch.
pub const CANONICAL_START: i64 = 1_704_067_200;

/// Logical clock tracking "current time" as seconds since the Unix epoch.
///
/// # Example
/// ```
/// use campus_market_core::Clock;
///
/// let mut clock = Clock::new();
/// let t0 = clock.now();
/// clock.advance_hour();
/// assert_eq!(clock.now(), t0 + 3600);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clock {
    now: i64,
}

impl Clock {
    /// Create a clock at the canonical start time.
    pub fn new() -> Self {
        Self { now: CANONICAL_START }
    }

    /// Create a clock at an arbitrary point in time.
    pub fn at(now: i64) -> Self {
        Self { now }
    }

    /// Current logical time, seconds since the Unix epoch.
    pub fn now(&self) -> i64 {
        self.now
    }

    /// Advance by one hour.
    pub fn advance_hour(&mut self) {
        self.now += 3600;
    }

    /// Advance by one day.
    pub fn advance_day(&mut self) {
        self.now += 86_400;
    }

    /// Advance by an arbitrary number of seconds (used by the simulator's
    /// compressed-time day loop).
    pub fn advance_seconds(&mut self, seconds: i64) {
        self.now += seconds;
    }

    /// Reset to the canonical start time.
    pub fn reset(&mut self) {
        self.now = CANONICAL_START;
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advances_by_day() {
        let mut clock = Clock::new();
        clock.advance_day();
        assert_eq!(clock.now(), CANONICAL_START + 86_400);
    }

    #[test]
    fn reset_restores_canonical_start() {
        let mut clock = Clock::new();
        clock.advance_day();
        clock.reset();
        assert_eq!(clock.now(), CANONICAL_START);
    }
}
