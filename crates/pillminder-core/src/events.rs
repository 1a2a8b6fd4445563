use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::alarm::{AlarmCategory, AlarmRef};

/// Every externally visible state change produces an Event.
/// The presentation layer consumes these from the poller's channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    /// New alarms entered the pending set. `alarms` is the full
    /// pending set for the category after admission.
    AlarmsDue {
        category: AlarmCategory,
        alarms: Vec<AlarmRef>,
        at: NaiveDateTime,
    },
    /// The user acknowledged alarms for their current occurrence.
    AlarmsConfirmed {
        category: AlarmCategory,
        alarms: Vec<AlarmRef>,
        at: NaiveDateTime,
    },
    /// The user closed the prompt without confirming; the category is
    /// suppressed until `retry_at`.
    AlarmsDismissed {
        category: AlarmCategory,
        retry_at: NaiveDateTime,
        at: NaiveDateTime,
    },
    /// Full snapshot of both pending sets.
    PendingSnapshot {
        medication: Vec<AlarmRef>,
        expiry: Vec<AlarmRef>,
        at: NaiveDateTime,
    },
}
