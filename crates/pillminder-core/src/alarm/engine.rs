//! The alarm engine: clock, tracker and persisted state wired together.
//!
//! Caller-driven, no internal threads. The poller (or any host) calls
//! `tick()` with the current schedule lists; user actions arrive
//! through `confirm` and `dismiss`. Every mutation is persisted through
//! the injected store. Persistence is advisory: a failed read starts
//! the engine empty, a failed write is logged and the tick goes on.

use chrono::NaiveDateTime;

use super::evaluator;
use super::snooze::SnoozeConfig;
use super::tracker::{AckTracker, AlarmState};
use super::types::{AlarmCategory, AlarmRef, Reminder, TrackedExpiry};
use crate::clock::Clock;
use crate::events::Event;
use crate::storage::state_store::StateStore;

pub struct AlarmEngine<C, S> {
    clock: C,
    store: S,
    tracker: AckTracker,
}

impl<C: Clock, S: StateStore> AlarmEngine<C, S> {
    /// Build an engine, resuming from whatever state the store holds.
    pub fn new(clock: C, store: S, snooze: SnoozeConfig) -> Self {
        let state = match store.load() {
            Ok(state) => state,
            Err(e) => {
                log::warn!("alarm state unreadable, starting empty: {e}");
                AlarmState::default()
            }
        };
        Self {
            clock,
            store,
            tracker: AckTracker::with_state(state, snooze),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn pending(&self, category: AlarmCategory) -> Vec<AlarmRef> {
        self.tracker.pending(category)
    }

    pub fn is_snoozed(&self, category: AlarmCategory) -> bool {
        self.tracker.is_snoozed(category, self.clock.now())
    }

    pub fn state(&self) -> &AlarmState {
        self.tracker.state()
    }

    /// Full snapshot of both pending sets.
    pub fn snapshot(&self) -> Event {
        Event::PendingSnapshot {
            medication: self.tracker.pending(AlarmCategory::Medication),
            expiry: self.tracker.pending(AlarmCategory::Expiry),
            at: self.clock.now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Run one evaluation pass over the given schedule lists.
    ///
    /// Emits one `AlarmsDue` per category whose pending set grew.
    /// The lists may differ from tick to tick; the engine holds no
    /// schedule state of its own.
    pub fn tick(&mut self, reminders: &[Reminder], expiries: &[TrackedExpiry]) -> Vec<Event> {
        let now = self.clock.now();
        self.tracker.prune_stale_confirmations(now);

        let mut events = Vec::new();
        let due = evaluator::due_reminders(now, reminders);
        if let Some(event) = self.admit(now, AlarmCategory::Medication, &due) {
            events.push(event);
        }
        let due = evaluator::due_expiries(now, expiries);
        if let Some(event) = self.admit(now, AlarmCategory::Expiry, &due) {
            events.push(event);
        }

        if !events.is_empty() {
            self.persist();
        }
        events
    }

    /// Acknowledge pending alarms by id. Returns `None` when none of
    /// the ids were pending.
    pub fn confirm(&mut self, category: AlarmCategory, ids: &[String]) -> Option<Event> {
        let now = self.clock.now();
        let confirmed = self.tracker.confirm(category, ids);
        if confirmed.is_empty() {
            return None;
        }
        self.persist();
        Some(Event::AlarmsConfirmed {
            category,
            alarms: confirmed,
            at: now,
        })
    }

    /// Close the category's prompt without confirming. Arms the snooze
    /// deadline. No-op when nothing is pending.
    pub fn dismiss(&mut self, category: AlarmCategory) -> Option<Event> {
        if self.tracker.pending_entries(category).is_empty() {
            return None;
        }
        let now = self.clock.now();
        let retry_at = self.tracker.dismiss(now, category);
        self.persist();
        Some(Event::AlarmsDismissed {
            category,
            retry_at,
            at: now,
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn admit(
        &mut self,
        now: NaiveDateTime,
        category: AlarmCategory,
        due: &[evaluator::DueAlarm],
    ) -> Option<Event> {
        let before = self.tracker.pending_entries(category).len();
        let pending = self.tracker.admit(now, category, due);
        if pending.len() > before {
            Some(Event::AlarmsDue {
                category,
                alarms: pending,
                at: now,
            })
        } else {
            None
        }
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(self.tracker.state()) {
            log::warn!("failed to persist alarm state: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::StateError;
    use crate::storage::state_store::MemoryStateStore;
    use chrono::{Duration, NaiveDateTime};

    fn at(s: &str) -> NaiveDateTime {
        s.parse().unwrap()
    }

    fn reminder(id: &str, time: &str) -> Reminder {
        Reminder {
            id: id.into(),
            name: format!("med {id}"),
            times: vec![time.into()],
            enabled: true,
            start_date: None,
            end_date: None,
        }
    }

    fn engine_at(start: &str) -> (AlarmEngine<ManualClock, MemoryStateStore>, ManualClock) {
        let clock = ManualClock::new(at(start));
        let engine = AlarmEngine::new(
            clock.clone(),
            MemoryStateStore::default(),
            SnoozeConfig::default(),
        );
        (engine, clock)
    }

    #[test]
    fn tick_emits_once_per_window() {
        let (mut engine, clock) = engine_at("2024-01-15T09:00:00");
        let reminders = [reminder("r1", "09:00")];

        let events = engine.tick(&reminders, &[]);
        assert_eq!(events.len(), 1);

        // Re-polling inside the same minute adds nothing.
        clock.advance(Duration::seconds(20));
        assert!(engine.tick(&reminders, &[]).is_empty());
    }

    #[test]
    fn tick_outside_the_window_is_quiet() {
        let (mut engine, _clock) = engine_at("2024-01-15T08:59:00");
        assert!(engine.tick(&[reminder("r1", "09:00")], &[]).is_empty());
    }

    #[test]
    fn confirm_unknown_id_is_none() {
        let (mut engine, _clock) = engine_at("2024-01-15T09:00:00");
        engine.tick(&[reminder("r1", "09:00")], &[]);
        assert!(engine
            .confirm(AlarmCategory::Medication, &["nope".to_string()])
            .is_none());
        assert_eq!(engine.pending(AlarmCategory::Medication).len(), 1);
    }

    #[test]
    fn dismiss_without_pending_is_none() {
        let (mut engine, _clock) = engine_at("2024-01-15T09:00:00");
        assert!(engine.dismiss(AlarmCategory::Medication).is_none());
        assert!(!engine.is_snoozed(AlarmCategory::Medication));
    }

    #[test]
    fn state_survives_an_engine_restart() {
        let store = MemoryStateStore::default();
        let clock = ManualClock::new(at("2024-01-15T09:00:00"));
        let mut engine = AlarmEngine::new(clock.clone(), store.clone(), SnoozeConfig::default());
        engine.tick(&[reminder("r1", "09:00")], &[]);
        engine.dismiss(AlarmCategory::Medication);
        drop(engine);

        // Same store, new engine: the cooldown is still armed.
        let engine = AlarmEngine::new(clock, store, SnoozeConfig::default());
        assert!(engine.is_snoozed(AlarmCategory::Medication));
    }

    #[test]
    fn failing_store_degrades_to_empty_state() {
        struct FailingStore;
        impl StateStore for FailingStore {
            fn load(&self) -> Result<AlarmState, StateError> {
                Err(StateError::ParseFailed("boom".into()))
            }
            fn save(&self, _state: &AlarmState) -> Result<(), StateError> {
                Err(StateError::ParseFailed("boom".into()))
            }
        }

        let clock = ManualClock::new(at("2024-01-15T09:00:00"));
        let mut engine = AlarmEngine::new(clock, FailingStore, SnoozeConfig::default());
        // Ticks still work; the write failure is advisory.
        let events = engine.tick(&[reminder("r1", "09:00")], &[]);
        assert_eq!(events.len(), 1);
        assert_eq!(engine.pending(AlarmCategory::Medication).len(), 1);
    }
}
