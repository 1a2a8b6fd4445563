//! Acknowledgement tracking.
//!
//! Owns the engine-side alarm state: per-category pending and
//! confirmed sets plus the snooze deadlines. `admit` is the single
//! entry point for newly due alarms; `confirm` and `dismiss` are the
//! two user actions. All methods are synchronous and mutate in place;
//! persistence is the caller's concern (see [`crate::alarm::AlarmEngine`]).

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::evaluator::DueAlarm;
use super::snooze::{SnoozeConfig, SnoozeDeadline};
use super::types::{AlarmCategory, AlarmRef, Occurrence};

/// Current version of the persisted state layout.
pub const STATE_VERSION: u32 = 1;

/// An alarm awaiting user acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAlarm {
    #[serde(flatten)]
    pub alarm: AlarmRef,
    pub occurrence: Occurrence,
}

/// An alarm the user acknowledged, valid for one occurrence only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmedAlarm {
    #[serde(flatten)]
    pub alarm: AlarmRef,
    pub occurrence: Occurrence,
}

/// The complete engine-owned state, as persisted.
///
/// The camelCase key names (`currentPillAlarms`, `nextPillAlarmTime`,
/// ...) match the layout the web client persists; each entry carries
/// the occurrence that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlarmState {
    pub version: u32,
    pub current_pill_alarms: Vec<PendingAlarm>,
    pub confirmed_pill_alarms: Vec<ConfirmedAlarm>,
    pub current_expired_alarms: Vec<PendingAlarm>,
    pub confirmed_expired_alarms: Vec<ConfirmedAlarm>,
    pub next_pill_alarm_time: SnoozeDeadline,
    pub next_expired_alarm_time: SnoozeDeadline,
}

impl Default for AlarmState {
    fn default() -> Self {
        Self {
            version: STATE_VERSION,
            current_pill_alarms: Vec::new(),
            confirmed_pill_alarms: Vec::new(),
            current_expired_alarms: Vec::new(),
            confirmed_expired_alarms: Vec::new(),
            next_pill_alarm_time: SnoozeDeadline::default(),
            next_expired_alarm_time: SnoozeDeadline::default(),
        }
    }
}

/// The acknowledgement state machine.
#[derive(Debug, Clone)]
pub struct AckTracker {
    state: AlarmState,
    snooze: SnoozeConfig,
}

impl AckTracker {
    pub fn new(snooze: SnoozeConfig) -> Self {
        Self::with_state(AlarmState::default(), snooze)
    }

    /// Resume from previously persisted state.
    pub fn with_state(state: AlarmState, snooze: SnoozeConfig) -> Self {
        Self { state, snooze }
    }

    pub fn state(&self) -> &AlarmState {
        &self.state
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The pending set for a category, as presentation-layer refs.
    pub fn pending(&self, category: AlarmCategory) -> Vec<AlarmRef> {
        self.pending_ref(category)
            .iter()
            .map(|entry| entry.alarm.clone())
            .collect()
    }

    pub fn pending_entries(&self, category: AlarmCategory) -> &[PendingAlarm] {
        self.pending_ref(category)
    }

    pub fn is_snoozed(&self, category: AlarmCategory, now: NaiveDateTime) -> bool {
        self.deadline_ref(category).is_active(now)
    }

    pub fn snooze_deadline(&self, category: AlarmCategory) -> SnoozeDeadline {
        *self.deadline_ref(category)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Admit newly due alarms into the pending set.
    ///
    /// An alarm is dropped when its id is already pending, when it was
    /// confirmed for the same occurrence, or when the category is
    /// snoozed. Returns the full updated pending set, so calling twice
    /// with the same input in the same tick is a no-op.
    pub fn admit(
        &mut self,
        now: NaiveDateTime,
        category: AlarmCategory,
        newly_due: &[DueAlarm],
    ) -> Vec<AlarmRef> {
        if !self.is_snoozed(category, now) {
            for due in newly_due {
                let already_pending = self
                    .pending_ref(category)
                    .iter()
                    .any(|entry| entry.alarm.id == due.alarm.id);
                let already_confirmed = self.confirmed_ref(category).iter().any(|entry| {
                    entry.alarm.id == due.alarm.id && entry.occurrence == due.occurrence
                });
                if !already_pending && !already_confirmed {
                    self.pending_mut(category).push(PendingAlarm {
                        alarm: due.alarm.clone(),
                        occurrence: due.occurrence,
                    });
                }
            }
        }
        self.pending(category)
    }

    /// Move the named ids from pending to confirmed, keeping their
    /// occurrence. Other pending ids are untouched. Returns the refs
    /// that were actually confirmed.
    pub fn confirm(&mut self, category: AlarmCategory, ids: &[String]) -> Vec<AlarmRef> {
        let pending = self.pending_mut(category);
        let (taken, kept): (Vec<_>, Vec<_>) = pending
            .drain(..)
            .partition(|entry| ids.contains(&entry.alarm.id));
        *pending = kept;

        let refs: Vec<AlarmRef> = taken.iter().map(|entry| entry.alarm.clone()).collect();
        self.confirmed_mut(category)
            .extend(taken.into_iter().map(|entry| ConfirmedAlarm {
                alarm: entry.alarm,
                occurrence: entry.occurrence,
            }));
        refs
    }

    /// Clear the category's entire pending set without confirming and
    /// arm the snooze deadline. Returns the deadline.
    pub fn dismiss(&mut self, now: NaiveDateTime, category: AlarmCategory) -> NaiveDateTime {
        self.pending_mut(category).clear();
        let cooldown = self.snooze.cooldown_for(category);
        self.deadline_mut(category).arm(now, cooldown)
    }

    /// Drop confirmations whose matching window has passed, so the
    /// next occurrence of the same id can trigger again.
    pub fn prune_stale_confirmations(&mut self, now: NaiveDateTime) {
        self.state
            .confirmed_pill_alarms
            .retain(|entry| entry.occurrence.is_current(now));
        self.state
            .confirmed_expired_alarms
            .retain(|entry| entry.occurrence.is_current(now));
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn pending_ref(&self, category: AlarmCategory) -> &Vec<PendingAlarm> {
        match category {
            AlarmCategory::Medication => &self.state.current_pill_alarms,
            AlarmCategory::Expiry => &self.state.current_expired_alarms,
        }
    }

    fn pending_mut(&mut self, category: AlarmCategory) -> &mut Vec<PendingAlarm> {
        match category {
            AlarmCategory::Medication => &mut self.state.current_pill_alarms,
            AlarmCategory::Expiry => &mut self.state.current_expired_alarms,
        }
    }

    fn confirmed_ref(&self, category: AlarmCategory) -> &Vec<ConfirmedAlarm> {
        match category {
            AlarmCategory::Medication => &self.state.confirmed_pill_alarms,
            AlarmCategory::Expiry => &self.state.confirmed_expired_alarms,
        }
    }

    fn confirmed_mut(&mut self, category: AlarmCategory) -> &mut Vec<ConfirmedAlarm> {
        match category {
            AlarmCategory::Medication => &mut self.state.confirmed_pill_alarms,
            AlarmCategory::Expiry => &mut self.state.confirmed_expired_alarms,
        }
    }

    fn deadline_ref(&self, category: AlarmCategory) -> &SnoozeDeadline {
        match category {
            AlarmCategory::Medication => &self.state.next_pill_alarm_time,
            AlarmCategory::Expiry => &self.state.next_expired_alarm_time,
        }
    }

    fn deadline_mut(&mut self, category: AlarmCategory) -> &mut SnoozeDeadline {
        match category {
            AlarmCategory::Medication => &mut self.state.next_pill_alarm_time,
            AlarmCategory::Expiry => &mut self.state.next_expired_alarm_time,
        }
    }
}
