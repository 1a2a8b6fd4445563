//! Read-only access to the user's schedules.
//!
//! The engine never owns schedule data; it reads both lists from a
//! repository on every tick, so entries added or removed mid-session
//! take effect on the next tick.

use std::sync::Mutex;

use crate::alarm::{Reminder, TrackedExpiry};
use crate::error::StorageError;

pub trait ScheduleRepository {
    /// All reminders. Malformed entries are already skipped by the
    /// implementation.
    fn reminders(&self) -> Result<Vec<Reminder>, StorageError>;

    /// All tracked expiries.
    fn tracked_expiries(&self) -> Result<Vec<TrackedExpiry>, StorageError>;
}

/// Mutex-backed repository for tests and embedding. Lists can be
/// swapped between ticks.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    inner: Mutex<Lists>,
}

#[derive(Debug, Default)]
struct Lists {
    reminders: Vec<Reminder>,
    expiries: Vec<TrackedExpiry>,
}

impl InMemoryRepository {
    pub fn new(reminders: Vec<Reminder>, expiries: Vec<TrackedExpiry>) -> Self {
        Self {
            inner: Mutex::new(Lists {
                reminders,
                expiries,
            }),
        }
    }

    pub fn set_reminders(&self, reminders: Vec<Reminder>) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .reminders = reminders;
    }

    pub fn set_tracked_expiries(&self, expiries: Vec<TrackedExpiry>) {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .expiries = expiries;
    }
}

impl ScheduleRepository for InMemoryRepository {
    fn reminders(&self) -> Result<Vec<Reminder>, StorageError> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .reminders
            .clone())
    }

    fn tracked_expiries(&self) -> Result<Vec<TrackedExpiry>, StorageError> {
        Ok(self
            .inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .expiries
            .clone())
    }
}
