//! Wall-clock glue for the countdown.
//!
//! The session only understands discrete ticks. A front-end polls a
//! [`TickSource`] and forwards every due tick, so a late poll still delivers
//! each missed second.

use std::time::{Duration, Instant};

/// Countdown resolution
pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Converts elapsed wall-clock time into whole ticks
#[derive(Debug, Clone)]
pub struct TickSource {
    period: Duration,
    last: Instant,
}

impl TickSource {
    pub fn new(period: Duration, now: Instant) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            last: now,
        }
    }

    /// A 1 Hz source starting at `now`
    pub fn seconds(now: Instant) -> Self {
        Self::new(TICK_PERIOD, now)
    }

    /// Restart counting from `now`, dropping any partial period
    pub fn reset(&mut self, now: Instant) {
        self.last = now;
    }

    /// Ticks that have come due since the last call
    pub fn due(&mut self, now: Instant) -> u32 {
        let elapsed = now.saturating_duration_since(self.last);
        let ticks = (elapsed.as_nanos() / self.period.as_nanos()).min(u32::MAX as u128) as u32;
        self.last += self.period * ticks;
        ticks
    }
}

/// Format seconds as `M:SS`
pub fn format_time(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}
