//! Time source for the refresh scheduler.
//!
//! RULE: Nothing in the scheduler reads the system time directly.
//! All "now" values flow through a Clock so scheduling can be replayed
//! deterministically in tests.

use crate::types::Millis;
use chrono::{DateTime, TimeZone, Utc};
use std::cell::Cell;
use std::rc::Rc;

pub trait Clock {
    /// Current time in epoch milliseconds.
    fn now_ms(&self) -> Millis;

    fn now_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(self.now_ms())
            .single()
            .unwrap_or_default()
    }
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Millis {
        Utc::now().timestamp_millis()
    }
}

/// A hand-advanced clock. Clones share the same underlying time, so a test
/// can keep one handle while the scheduler owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Millis>>,
}

impl ManualClock {
    pub fn starting_at(now: Millis) -> Self {
        Self { now: Rc::new(Cell::new(now)) }
    }

    /// Move time forward. Returns the new time.
    pub fn advance(&self, by_ms: Millis) -> Millis {
        let next = self.now.get() + by_ms.max(0);
        self.now.set(next);
        next
    }

    pub fn set(&self, now: Millis) {
        self.now.set(now);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> Millis {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::starting_at(1_000);
        let handle = clock.clone();

        handle.advance(500);
        assert_eq!(clock.now_ms(), 1_500);

        // Time never moves backwards through advance().
        clock.advance(-10_000);
        assert_eq!(handle.now_ms(), 1_500);
    }

    #[test]
    fn now_utc_matches_millis() {
        let clock = ManualClock::starting_at(86_400_000);
        assert_eq!(clock.now_utc().to_rfc3339(), "1970-01-02T00:00:00+00:00");
    }
}
