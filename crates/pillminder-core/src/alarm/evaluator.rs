//! Due-now matching.
//!
//! Pure functions of `(now, schedule data)`: no side effects, no
//! internal state. This is what keeps the engine testable without
//! timers.
//!
//! Reminders match at minute granularity: `now` formatted as `HH:MM`
//! equals one of the reminder's times, so a match holds for the whole
//! 60-second window the poller samples inside. Expiries match at day
//! granularity.

use chrono::NaiveDateTime;

use super::types::{minute_of, parse_time, AlarmRef, Occurrence, Reminder, TrackedExpiry};

/// A matched alarm together with the occurrence that triggered it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DueAlarm {
    pub alarm: AlarmRef,
    pub occurrence: Occurrence,
}

/// Reminders due at `now`: enabled, active window contains `now`'s
/// date, and some entry of `times` equals `now`'s minute.
///
/// Unparsable time entries are skipped with a warning; one bad entry
/// never suppresses the rest of the schedule.
pub fn due_reminders(now: NaiveDateTime, reminders: &[Reminder]) -> Vec<DueAlarm> {
    let date = now.date();
    let minute = minute_of(now);

    let mut due = Vec::new();
    for reminder in reminders {
        if !reminder.enabled || !reminder.active_on(date) {
            continue;
        }
        let matched = reminder.times.iter().find_map(|raw| match parse_time(raw) {
            Ok(slot) if slot == minute => Some(slot),
            Ok(_) => None,
            Err(_) => {
                log::warn!(
                    "reminder {}: skipping unparsable time entry {raw:?}",
                    reminder.id
                );
                None
            }
        });
        if let Some(slot) = matched {
            due.push(DueAlarm {
                alarm: AlarmRef {
                    id: reminder.id.clone(),
                    name: reminder.name.clone(),
                },
                occurrence: Occurrence::medication(date, slot),
            });
        }
    }
    due
}

/// Tracked expiries due at `now`: enabled and expiring today.
pub fn due_expiries(now: NaiveDateTime, expiries: &[TrackedExpiry]) -> Vec<DueAlarm> {
    let date = now.date();
    expiries
        .iter()
        .filter(|pill| pill.enabled && pill.expiry_date == date)
        .map(|pill| DueAlarm {
            alarm: AlarmRef {
                id: pill.id.clone(),
                name: pill.name.clone(),
            },
            occurrence: Occurrence::expiry(date),
        })
        .collect()
}

/// Union of both categories, for callers that want a single set.
pub fn evaluate(
    now: NaiveDateTime,
    reminders: &[Reminder],
    expiries: &[TrackedExpiry],
) -> Vec<DueAlarm> {
    let mut due = due_reminders(now, reminders);
    due.extend(due_expiries(now, expiries));
    due
}
