//! SQLite-backed schedule storage.
//!
//! CRUD for reminders and tracked pills, plus the read-only
//! [`ScheduleRepository`] view the engine polls. The `times` column
//! holds a JSON array of `HH:MM` strings. Malformed rows are skipped
//! with a warning when listing: one bad entry must not silence the
//! rest of the schedule.

use chrono::NaiveDate;
use rusqlite::{params, Connection};

use crate::alarm::{Reminder, TrackedExpiry};
use crate::error::StorageError;
use crate::repository::ScheduleRepository;

use super::data_dir;

/// SQLite database for the user's schedules.
pub struct ScheduleDb {
    conn: Connection,
}

impl ScheduleDb {
    /// Open the database at `<data_dir>/pillminder.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> crate::error::Result<Self> {
        let path = data_dir()?.join("pillminder.db");
        let conn =
            Connection::open(&path).map_err(|source| StorageError::OpenFailed { path, source })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests, throwaway sessions).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> crate::error::Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), StorageError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS reminders (
                    id          TEXT PRIMARY KEY,
                    name        TEXT NOT NULL,
                    times       TEXT NOT NULL,
                    enabled     INTEGER NOT NULL DEFAULT 1,
                    start_date  TEXT,
                    end_date    TEXT
                );

                CREATE TABLE IF NOT EXISTS tracked_pills (
                    id          TEXT PRIMARY KEY,
                    name        TEXT NOT NULL,
                    expiry_date TEXT NOT NULL,
                    enabled     INTEGER NOT NULL DEFAULT 1
                );",
            )
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))
    }

    // ── Reminders ────────────────────────────────────────────────────

    /// Insert or replace a reminder.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn upsert_reminder(&self, reminder: &Reminder) -> Result<(), StorageError> {
        let times = serde_json::to_string(&reminder.times)
            .map_err(|e| StorageError::QueryFailed(e.to_string()))?;
        self.conn.execute(
            "INSERT INTO reminders (id, name, times, enabled, start_date, end_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 times = excluded.times,
                 enabled = excluded.enabled,
                 start_date = excluded.start_date,
                 end_date = excluded.end_date",
            params![
                reminder.id,
                reminder.name,
                times,
                reminder.enabled,
                reminder.start_date.map(|d| d.to_string()),
                reminder.end_date.map(|d| d.to_string()),
            ],
        )?;
        Ok(())
    }

    /// All reminders, malformed rows skipped.
    ///
    /// # Errors
    /// Returns an error if the query itself fails.
    pub fn list_reminders(&self) -> Result<Vec<Reminder>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, times, enabled, start_date, end_date FROM reminders ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, Option<String>>(4)?,
                row.get::<_, Option<String>>(5)?,
            ))
        })?;

        let mut reminders = Vec::new();
        for row in rows {
            let (id, name, times_json, enabled, start, end) = row?;
            let times: Vec<String> = match serde_json::from_str(&times_json) {
                Ok(times) => times,
                Err(e) => {
                    log::warn!("reminder {id}: skipping row with malformed times column: {e}");
                    continue;
                }
            };
            let Some(start_date) = parse_date_column(&id, "start_date", start) else {
                continue;
            };
            let Some(end_date) = parse_date_column(&id, "end_date", end) else {
                continue;
            };
            reminders.push(Reminder {
                id,
                name,
                times,
                enabled,
                start_date,
                end_date,
            });
        }
        Ok(reminders)
    }

    /// Remove a reminder. Returns whether a row was deleted.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn remove_reminder(&self, id: &str) -> Result<bool, StorageError> {
        let deleted = self
            .conn
            .execute("DELETE FROM reminders WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    /// Toggle a reminder. Returns whether a row was updated.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub fn set_reminder_enabled(
        &self,
        id: &str,
        enabled: bool,
    ) -> Result<bool, StorageError> {
        let updated = self.conn.execute(
            "UPDATE reminders SET enabled = ?2 WHERE id = ?1",
            params![id, enabled],
        )?;
        Ok(updated > 0)
    }

    // ── Tracked pills ────────────────────────────────────────────────

    /// Insert or replace a tracked pill.
    ///
    /// # Errors
    /// Returns an error if the write fails.
    pub fn upsert_pill(&self, pill: &TrackedExpiry) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO tracked_pills (id, name, expiry_date, enabled)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name,
                 expiry_date = excluded.expiry_date,
                 enabled = excluded.enabled",
            params![pill.id, pill.name, pill.expiry_date.to_string(), pill.enabled],
        )?;
        Ok(())
    }

    /// All tracked pills, malformed rows skipped.
    ///
    /// # Errors
    /// Returns an error if the query itself fails.
    pub fn list_pills(&self) -> Result<Vec<TrackedExpiry>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, expiry_date, enabled FROM tracked_pills ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
            ))
        })?;

        let mut pills = Vec::new();
        for row in rows {
            let (id, name, expiry, enabled) = row?;
            let expiry_date: NaiveDate = match expiry.parse() {
                Ok(date) => date,
                Err(_) => {
                    log::warn!("pill {id}: skipping row with malformed expiry_date {expiry:?}");
                    continue;
                }
            };
            pills.push(TrackedExpiry {
                id,
                name,
                expiry_date,
                enabled,
            });
        }
        Ok(pills)
    }

    /// Remove a tracked pill. Returns whether a row was deleted.
    ///
    /// # Errors
    /// Returns an error if the delete fails.
    pub fn remove_pill(&self, id: &str) -> Result<bool, StorageError> {
        let deleted = self
            .conn
            .execute("DELETE FROM tracked_pills WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }
}

impl ScheduleRepository for ScheduleDb {
    fn reminders(&self) -> Result<Vec<Reminder>, StorageError> {
        self.list_reminders()
    }

    fn tracked_expiries(&self) -> Result<Vec<TrackedExpiry>, StorageError> {
        self.list_pills()
    }
}

/// Decode an optional ISO date column, logging and flagging bad rows.
fn parse_date_column(id: &str, column: &str, raw: Option<String>) -> Option<Option<NaiveDate>> {
    match raw {
        None => Some(None),
        Some(value) => match value.parse() {
            Ok(date) => Some(Some(date)),
            Err(_) => {
                log::warn!("reminder {id}: skipping row with malformed {column} {value:?}");
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reminder(id: &str) -> Reminder {
        Reminder {
            id: id.into(),
            name: format!("med {id}"),
            times: vec!["09:00".into(), "21:00".into()],
            enabled: true,
            start_date: Some("2024-01-01".parse().unwrap()),
            end_date: Some("2024-01-31".parse().unwrap()),
        }
    }

    #[test]
    fn reminder_crud_roundtrip() {
        let db = ScheduleDb::open_memory().unwrap();
        db.upsert_reminder(&reminder("r1")).unwrap();

        let listed = db.list_reminders().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0], reminder("r1"));

        assert!(db.set_reminder_enabled("r1", false).unwrap());
        assert!(!db.list_reminders().unwrap()[0].enabled);

        assert!(db.remove_reminder("r1").unwrap());
        assert!(!db.remove_reminder("r1").unwrap());
        assert!(db.list_reminders().unwrap().is_empty());
    }

    #[test]
    fn upsert_replaces_existing_reminder() {
        let db = ScheduleDb::open_memory().unwrap();
        db.upsert_reminder(&reminder("r1")).unwrap();

        let mut updated = reminder("r1");
        updated.times = vec!["12:00".into()];
        db.upsert_reminder(&updated).unwrap();

        let listed = db.list_reminders().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].times, vec!["12:00".to_string()]);
    }

    #[test]
    fn pill_crud_roundtrip() {
        let db = ScheduleDb::open_memory().unwrap();
        let pill = TrackedExpiry {
            id: "e1".into(),
            name: "Ibuprofen".into(),
            expiry_date: "2024-03-10".parse().unwrap(),
            enabled: true,
        };
        db.upsert_pill(&pill).unwrap();
        assert_eq!(db.list_pills().unwrap(), vec![pill]);

        assert!(db.remove_pill("e1").unwrap());
        assert!(db.list_pills().unwrap().is_empty());
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let db = ScheduleDb::open_memory().unwrap();
        db.upsert_reminder(&reminder("good")).unwrap();
        db.conn
            .execute(
                "INSERT INTO reminders (id, name, times, enabled) VALUES ('bad', 'x', 'not json', 1)",
                [],
            )
            .unwrap();
        db.conn
            .execute(
                "INSERT INTO reminders (id, name, times, enabled, start_date)
                 VALUES ('bad2', 'x', '[\"09:00\"]', 1, 'not-a-date')",
                [],
            )
            .unwrap();

        let listed = db.list_reminders().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, "good");
    }

    #[test]
    fn repository_view_matches_crud() {
        let db = ScheduleDb::open_memory().unwrap();
        db.upsert_reminder(&reminder("r1")).unwrap();
        let via_trait: &dyn ScheduleRepository = &db;
        assert_eq!(via_trait.reminders().unwrap().len(), 1);
        assert!(via_trait.tracked_expiries().unwrap().is_empty());
    }
}
