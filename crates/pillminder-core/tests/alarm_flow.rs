//! Integration tests for the alarm engine's end-to-end behavior:
//! date-range boundaries, dismiss/cooldown timing, per-occurrence
//! recurrence, restart persistence, and malformed-entry tolerance.

use chrono::{Duration, NaiveDateTime};
use pillminder_core::{
    AlarmCategory, AlarmEngine, Event, JsonStateStore, ManualClock, MemoryStateStore, Reminder,
    ScheduleDb, ScheduleRepository, SnoozeConfig, TrackedExpiry,
};

use AlarmCategory::{Expiry, Medication};

fn at(s: &str) -> NaiveDateTime {
    s.parse().unwrap()
}

fn reminder(id: &str, times: &[&str], start: Option<&str>, end: Option<&str>) -> Reminder {
    Reminder {
        id: id.into(),
        name: format!("med {id}"),
        times: times.iter().map(|t| t.to_string()).collect(),
        enabled: true,
        start_date: start.map(|s| s.parse().unwrap()),
        end_date: end.map(|s| s.parse().unwrap()),
    }
}

fn pill(id: &str, expiry: &str) -> TrackedExpiry {
    TrackedExpiry {
        id: id.into(),
        name: format!("pill {id}"),
        expiry_date: expiry.parse().unwrap(),
        enabled: true,
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
fn reminder_fires_inside_its_date_range_only() {
    let reminders = [reminder(
        "r1",
        &["09:00"],
        Some("2024-01-01"),
        Some("2024-01-31"),
    )];

    let (mut engine, _clock) = engine_at("2024-01-15T09:00:00");
    assert_eq!(engine.tick(&reminders, &[]).len(), 1);
    assert_eq!(engine.pending(Medication).len(), 1);

    let (mut engine, _clock) = engine_at("2024-02-01T09:00:00");
    assert!(engine.tick(&reminders, &[]).is_empty());
    assert!(engine.pending(Medication).is_empty());
}

#[test]
fn expiry_dismiss_suppresses_until_the_cooldown_elapses() {
    let pills = [pill("e1", "2024-03-10")];
    let (mut engine, clock) = engine_at("2024-03-10T08:00:00");

    assert_eq!(engine.tick(&[], &pills).len(), 1);

    // Dismiss at 08:01 with the default 60-second expiry cooldown.
    clock.set(at("2024-03-10T08:01:00"));
    let dismissed = engine.dismiss(Expiry).expect("had pending alarms");
    match dismissed {
        Event::AlarmsDismissed { retry_at, .. } => {
            assert_eq!(retry_at, at("2024-03-10T08:02:00"));
        }
        other => panic!("unexpected event: {other:?}"),
    }

    // 08:01:30 is still inside the cooldown.
    clock.set(at("2024-03-10T08:01:30"));
    assert!(engine.tick(&[], &pills).is_empty());

    // 08:02:01 is past it; the unconfirmed expiry returns.
    clock.set(at("2024-03-10T08:02:01"));
    assert_eq!(engine.tick(&[], &pills).len(), 1);
    assert_eq!(engine.pending(Expiry).len(), 1);
}

#[test]
fn confirmed_reminder_fires_again_the_next_day() {
    let reminders = [reminder("r1", &["09:00"], None, None)];
    let (mut engine, clock) = engine_at("2024-01-15T09:00:00");

    engine.tick(&reminders, &[]);
    engine
        .confirm(Medication, &["r1".to_string()])
        .expect("confirmed");
    assert!(engine.pending(Medication).is_empty());

    // Confirmed occurrence blocks the rest of the minute.
    clock.set(at("2024-01-15T09:00:40"));
    assert!(engine.tick(&reminders, &[]).is_empty());

    // Day D+1, same time of day: a new occurrence fires.
    clock.set(at("2024-01-16T09:00:00"));
    assert_eq!(engine.tick(&reminders, &[]).len(), 1);
}

#[test]
fn two_reminders_sharing_a_time_are_both_pending_after_one_tick() {
    let reminders = [
        reminder("r1", &["09:00"], None, None),
        reminder("r2", &["09:00"], None, None),
    ];
    let (mut engine, _clock) = engine_at("2024-01-15T09:00:00");

    let events = engine.tick(&reminders, &[]);
    assert_eq!(events.len(), 1);
    assert_eq!(engine.pending(Medication).len(), 2);
}

#[test]
fn confirming_one_reminder_leaves_the_other_pending() {
    let reminders = [
        reminder("r1", &["09:00"], None, None),
        reminder("r2", &["09:00"], None, None),
    ];
    let (mut engine, _clock) = engine_at("2024-01-15T09:00:00");
    engine.tick(&reminders, &[]);

    engine
        .confirm(Medication, &["r1".to_string()])
        .expect("confirmed");
    let remaining = engine.pending(Medication);
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "r2");
}

#[test]
fn categories_do_not_cross_suppress() {
    let reminders = [reminder("r1", &["08:00"], None, None)];
    let pills = [pill("e1", "2024-03-10")];
    let (mut engine, _clock) = engine_at("2024-03-10T08:00:00");

    let events = engine.tick(&reminders, &pills);
    assert_eq!(events.len(), 2);

    engine.dismiss(Medication).expect("had pending");
    // The expiry category is untouched by the medication snooze.
    assert_eq!(engine.pending(Expiry).len(), 1);
    assert!(!engine.is_snoozed(Expiry));
}

#[test]
fn schedule_changes_between_ticks_take_effect() {
    let (mut engine, clock) = engine_at("2024-01-15T09:00:00");
    assert!(engine.tick(&[], &[]).is_empty());

    // The user adds a reminder mid-session.
    clock.set(at("2024-01-15T09:05:00"));
    let added = [reminder("new", &["09:05"], None, None)];
    assert_eq!(engine.tick(&added, &[]).len(), 1);
}

#[test]
fn dismissed_state_survives_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alarm_state.json");
    let clock = ManualClock::new(at("2024-03-10T08:00:00"));
    let pills = [pill("e1", "2024-03-10")];

    let mut engine = AlarmEngine::new(
        clock.clone(),
        JsonStateStore::with_path(path.clone()),
        SnoozeConfig::default(),
    );
    engine.tick(&[], &pills);
    engine.dismiss(Expiry).expect("had pending");
    drop(engine);

    // Reload: still snoozed, nothing re-admitted before the deadline.
    clock.set(at("2024-03-10T08:00:30"));
    let mut engine = AlarmEngine::new(
        clock.clone(),
        JsonStateStore::with_path(path),
        SnoozeConfig::default(),
    );
    assert!(engine.is_snoozed(Expiry));
    assert!(engine.tick(&[], &pills).is_empty());

    // Past the deadline the expiry fires again.
    clock.set(at("2024-03-10T08:01:01"));
    assert_eq!(engine.tick(&[], &pills).len(), 1);
}

#[test]
fn pending_alarms_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alarm_state.json");
    let clock = ManualClock::new(at("2024-01-15T09:00:00"));
    let reminders = [reminder("r1", &["09:00"], None, None)];

    let mut engine = AlarmEngine::new(
        clock.clone(),
        JsonStateStore::with_path(path.clone()),
        SnoozeConfig::default(),
    );
    engine.tick(&reminders, &[]);
    drop(engine);

    let engine = AlarmEngine::new(clock, JsonStateStore::with_path(path), SnoozeConfig::default());
    assert_eq!(engine.pending(Medication).len(), 1);
}

#[test]
fn corrupt_state_file_starts_the_engine_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alarm_state.json");
    std::fs::write(&path, "{definitely not json").unwrap();

    let clock = ManualClock::new(at("2024-01-15T09:00:00"));
    let mut engine = AlarmEngine::new(
        clock,
        JsonStateStore::with_path(path),
        SnoozeConfig::default(),
    );
    assert!(engine.pending(Medication).is_empty());

    // The engine still alarms normally afterwards.
    let reminders = [reminder("r1", &["09:00"], None, None)];
    assert_eq!(engine.tick(&reminders, &[]).len(), 1);
}

#[test]
fn custom_cooldowns_are_honored() {
    let snooze = SnoozeConfig {
        medication_secs: 120,
        expiry_secs: 5,
    };
    let clock = ManualClock::new(at("2024-01-15T09:00:00"));
    let mut engine = AlarmEngine::new(clock.clone(), MemoryStateStore::default(), snooze);

    let reminders = [reminder("r1", &["09:00", "09:01", "09:03"], None, None)];
    engine.tick(&reminders, &[]);
    engine.dismiss(Medication).expect("had pending");

    // Still suppressed where the default 10-second cooldown would
    // already have expired.
    clock.advance(Duration::seconds(30));
    assert!(engine.tick(&reminders, &[]).is_empty());

    // 09:01 matches but the two-minute cooldown is still armed.
    clock.set(at("2024-01-15T09:01:00"));
    assert!(engine.tick(&reminders, &[]).is_empty());

    // A listed minute past the cooldown fires again.
    clock.set(at("2024-01-15T09:03:00"));
    assert_eq!(engine.tick(&reminders, &[]).len(), 1);
}

#[test]
fn sqlite_repository_feeds_the_engine() {
    let db = ScheduleDb::open_memory().unwrap();
    db.upsert_reminder(&reminder("r1", &["09:00"], None, None))
        .unwrap();
    db.upsert_pill(&pill("e1", "2024-01-15")).unwrap();

    let (mut engine, _clock) = engine_at("2024-01-15T09:00:00");
    let events = engine.tick(&db.reminders().unwrap(), &db.tracked_expiries().unwrap());
    assert_eq!(events.len(), 2);
    assert_eq!(engine.pending(Medication).len(), 1);
    assert_eq!(engine.pending(Expiry).len(), 1);
}

#[test]
fn a_reminder_with_a_bad_time_entry_still_fires_its_good_ones() {
    let reminders = [reminder("r1", &["garbage", "09:00"], None, None)];
    let (mut engine, _clock) = engine_at("2024-01-15T09:00:00");
    assert_eq!(engine.tick(&reminders, &[]).len(), 1);
}
