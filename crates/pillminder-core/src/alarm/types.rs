//! Alarm data model.
//!
//! `Reminder` and `TrackedExpiry` are owned by the schedule store; the
//! engine only reads them. `AlarmRef` and `Occurrence` are the
//! engine-side identifiers for a due alarm and its trigger episode.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The two independent alarm kinds. Each has its own pending set,
/// confirmed set, and snooze deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlarmCategory {
    /// Time-of-day medication reminders.
    Medication,
    /// Medication expiry-date alarms.
    Expiry,
}

impl AlarmCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlarmCategory::Medication => "medication",
            AlarmCategory::Expiry => "expiry",
        }
    }
}

impl std::fmt::Display for AlarmCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recurring time-of-day alarm bound to an optional active date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    /// Display label, e.g. the medication name.
    pub name: String,
    /// Times of day in `HH:MM`, 24-hour, no seconds.
    pub times: Vec<String>,
    pub enabled: bool,
    /// First active date (inclusive). Absent = unbounded.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last active date (inclusive). Absent = unbounded.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Reminder {
    /// Check the reminder invariants: an enabled reminder has at least
    /// one time, every time parses as `HH:MM`, and the date range is
    /// not inverted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.enabled && self.times.is_empty() {
            return Err(ValidationError::EmptyTimes {
                id: self.id.clone(),
            });
        }
        for raw in &self.times {
            parse_time(raw)?;
        }
        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ValidationError::InvalidDateRange { start, end });
            }
        }
        Ok(())
    }

    /// Whether `date` falls inside the active window. A missing bound
    /// is unbounded on that side.
    pub fn active_on(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start_date {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if date > end {
                return false;
            }
        }
        true
    }
}

/// A one-shot-per-day alarm tied to a medication's expiration date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedExpiry {
    pub id: String,
    pub name: String,
    pub expiry_date: NaiveDate,
    pub enabled: bool,
}

/// The `{id, name}` pair surfaced to the presentation layer for a due
/// alarm. Pending sets are keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlarmRef {
    pub id: String,
    pub name: String,
}

/// Identity of a single trigger episode: the triggering calendar date
/// plus, for reminders, the matched time slot.
///
/// Confirmation is keyed by occurrence rather than bare id so that the
/// same reminder can trigger again tomorrow, or an expiry cannot
/// re-fire on the same day once acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occurrence {
    pub date: NaiveDate,
    /// The matched `HH:MM` slot. `None` for expiry alarms, which are
    /// day-granular.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot: Option<NaiveTime>,
}

impl Occurrence {
    pub fn medication(date: NaiveDate, slot: NaiveTime) -> Self {
        Self {
            date,
            slot: Some(slot),
        }
    }

    pub fn expiry(date: NaiveDate) -> Self {
        Self { date, slot: None }
    }

    /// True while `now` is still inside this occurrence's matching
    /// window: the same day for expiries, the same minute for
    /// reminders.
    pub fn is_current(&self, now: NaiveDateTime) -> bool {
        if self.date != now.date() {
            return false;
        }
        match self.slot {
            Some(slot) => slot == minute_of(now),
            None => true,
        }
    }
}

/// Parse an `HH:MM` time-of-day entry.
pub(crate) fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    NaiveTime::parse_from_str(value, "%H:%M").map_err(|_| ValidationError::InvalidTime {
        value: value.to_string(),
    })
}

/// Truncate a timestamp to its minute, the granularity alarms match at.
pub(crate) fn minute_of(now: NaiveDateTime) -> NaiveTime {
    NaiveTime::from_hms_opt(now.hour(), now.minute(), 0).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(start: Option<&str>, end: Option<&str>) -> Reminder {
        Reminder {
            id: "r1".into(),
            name: "Aspirin".into(),
            times: vec!["09:00".into()],
            enabled: true,
            start_date: start.map(|s| s.parse().unwrap()),
            end_date: end.map(|s| s.parse().unwrap()),
        }
    }

    #[test]
    fn validate_rejects_enabled_without_times() {
        let mut r = reminder(None, None);
        r.times.clear();
        assert!(matches!(
            r.validate(),
            Err(ValidationError::EmptyTimes { .. })
        ));
    }

    #[test]
    fn validate_rejects_unparsable_time() {
        let mut r = reminder(None, None);
        r.times.push("25:99".into());
        assert!(matches!(
            r.validate(),
            Err(ValidationError::InvalidTime { .. })
        ));
    }

    #[test]
    fn validate_rejects_inverted_range() {
        let r = reminder(Some("2024-02-01"), Some("2024-01-01"));
        assert!(matches!(
            r.validate(),
            Err(ValidationError::InvalidDateRange { .. })
        ));
    }

    #[test]
    fn validate_accepts_disabled_without_times() {
        let mut r = reminder(None, None);
        r.times.clear();
        r.enabled = false;
        assert!(r.validate().is_ok());
    }

    #[test]
    fn active_window_is_inclusive_on_both_ends() {
        let r = reminder(Some("2024-01-01"), Some("2024-01-31"));
        assert!(r.active_on("2024-01-01".parse().unwrap()));
        assert!(r.active_on("2024-01-31".parse().unwrap()));
        assert!(!r.active_on("2023-12-31".parse().unwrap()));
        assert!(!r.active_on("2024-02-01".parse().unwrap()));
    }

    #[test]
    fn missing_bounds_are_unbounded() {
        let r = reminder(None, None);
        assert!(r.active_on("1999-01-01".parse().unwrap()));
        assert!(r.active_on("2099-12-31".parse().unwrap()));
    }

    #[test]
    fn occurrence_window_ignores_seconds() {
        let occ = Occurrence::medication(
            "2024-01-15".parse().unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
        );
        assert!(occ.is_current("2024-01-15T09:00:59".parse().unwrap()));
        assert!(!occ.is_current("2024-01-15T09:01:00".parse().unwrap()));
    }

    #[test]
    fn expiry_occurrence_spans_the_whole_day() {
        let occ = Occurrence::expiry("2024-03-10".parse().unwrap());
        assert!(occ.is_current("2024-03-10T00:00:00".parse().unwrap()));
        assert!(occ.is_current("2024-03-10T23:59:59".parse().unwrap()));
        assert!(!occ.is_current("2024-03-11T00:00:00".parse().unwrap()));
    }
}
