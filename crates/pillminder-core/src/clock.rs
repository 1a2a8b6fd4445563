//! Clock abstraction.
//!
//! The engine never reads the wall clock directly; a `Clock` is
//! injected so every temporal behavior (minute matching, cooldown
//! expiry, day rollover) is testable without timers.
//!
//! Timestamps are naive local time. Day and minute comparisons perform
//! no timezone normalization, matching the wall-clock semantics users
//! enter their `HH:MM` times in.

use std::sync::{Arc, Mutex};

use chrono::{Duration, Local, NaiveDateTime};

/// Source of "now" for the alarm engine.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// A settable clock for tests and simulations.
///
/// Clones share the same underlying instant, so a clone handed to an
/// engine can be advanced from the test body.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<NaiveDateTime>>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, now: NaiveDateTime) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn manual_clock_advances_shared_instant() {
        let clock = ManualClock::new(at(9, 0));
        let handle = clock.clone();
        handle.advance(Duration::seconds(90));
        assert_eq!(clock.now(), at(9, 1) + Duration::seconds(30));
    }

    #[test]
    fn manual_clock_set_overrides() {
        let clock = ManualClock::new(at(9, 0));
        clock.set(at(10, 30));
        assert_eq!(clock.now(), at(10, 30));
    }
}
