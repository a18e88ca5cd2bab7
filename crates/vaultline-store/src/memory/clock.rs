//! Time sources for version timestamps.

use chrono::{DateTime, Duration, TimeZone, Utc};
use std::cell::Cell;
use std::fmt;

/// Source of `created_at` / `updated_at` timestamps
pub trait Clock: fmt::Debug {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Deterministic clock: every reading returns the current instant and then
/// advances it by `step`.
///
/// A zero step makes every write share one timestamp, which is how tests
/// produce timeline ties.
#[derive(Debug)]
pub struct SteppingClock {
    next: Cell<DateTime<Utc>>,
    step: Duration,
}

impl SteppingClock {
    pub fn new(start: DateTime<Utc>, step: Duration) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }

    /// The instant the next reading will return
    pub fn peek(&self) -> DateTime<Utc> {
        self.next.get()
    }
}

impl Default for SteppingClock {
    /// 2024-01-01T00:00:00Z, one second per reading
    fn default() -> Self {
        let start = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap_or_default();
        Self::new(start, Duration::seconds(1))
    }
}

impl Clock for SteppingClock {
    fn now(&self) -> DateTime<Utc> {
        let current = self.next.get();
        self.next.set(current + self.step);
        current
    }
}
