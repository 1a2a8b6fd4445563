//! Dismissal cooldowns.
//!
//! Closing an alarm prompt without confirming suppresses the whole
//! category for a fixed cooldown: 10 seconds for medication-time
//! alarms, 60 seconds for expiry alarms. Both values are product
//! decisions surfaced as configuration, not hardcoded.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::types::AlarmCategory;

/// Per-category cooldown durations, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnoozeConfig {
    #[serde(default = "default_medication_secs")]
    pub medication_secs: u64,
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,
}

fn default_medication_secs() -> u64 {
    10
}
fn default_expiry_secs() -> u64 {
    60
}

impl Default for SnoozeConfig {
    fn default() -> Self {
        Self {
            medication_secs: default_medication_secs(),
            expiry_secs: default_expiry_secs(),
        }
    }
}

impl SnoozeConfig {
    pub fn cooldown_for(&self, category: AlarmCategory) -> Duration {
        let secs = match category {
            AlarmCategory::Medication => self.medication_secs,
            AlarmCategory::Expiry => self.expiry_secs,
        };
        Duration::seconds(secs as i64)
    }
}

/// The timestamp before which a category must not re-admit alarms.
///
/// Serialized transparently, so an unarmed deadline persists as
/// `null` and an armed one as the plain timestamp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SnoozeDeadline(Option<NaiveDateTime>);

impl SnoozeDeadline {
    /// Arm the deadline at `now + cooldown` and return it.
    pub fn arm(&mut self, now: NaiveDateTime, cooldown: Duration) -> NaiveDateTime {
        let deadline = now + cooldown;
        self.0 = Some(deadline);
        deadline
    }

    /// True while `now` is strictly before the armed deadline.
    /// Admission resumes at the deadline itself.
    pub fn is_active(&self, now: NaiveDateTime) -> bool {
        matches!(self.0, Some(deadline) if now < deadline)
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    pub fn at(&self) -> Option<NaiveDateTime> {
        self.0
    }
}
