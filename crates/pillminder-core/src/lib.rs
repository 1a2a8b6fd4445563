//! # Pillminder Core Library
//!
//! This library provides the alarm engine for Pillminder, a personal
//! medicine-reminder application. The engine decides which reminders
//! are due right now, surfaces each one exactly once until the user
//! acknowledges it, and suppresses re-triggering for a cooldown after
//! a dismissal. UI layers are thin adapters over this crate.
//!
//! ## Architecture
//!
//! - **Match Evaluator**: pure due-now matching over reminder and
//!   expiry lists; minute-granular for reminders, day-granular for
//!   expiries
//! - **Acknowledgement Tracker**: per-category pending/confirmed sets
//!   with occurrence-keyed confirmation and per-category snooze
//! - **Alarm Engine**: clock, tracker and persisted state wired
//!   together behind a caller-driven `tick()`
//! - **Poller**: tokio task driving `tick()` on a fixed interval with
//!   an idempotent start/stop lifecycle
//! - **Storage**: SQLite schedule store, JSON engine-state store, and
//!   TOML configuration
//!
//! ## Key Components
//!
//! - [`AlarmEngine`]: the state machine hosts drive
//! - [`Poller`]: periodic driver emitting [`Event`]s
//! - [`ScheduleDb`]: reminder and tracked-pill storage
//! - [`Config`]: application configuration management

pub mod alarm;
pub mod clock;
pub mod error;
pub mod events;
pub mod poller;
pub mod repository;
pub mod storage;

pub use alarm::{
    AckTracker, AlarmCategory, AlarmEngine, AlarmRef, AlarmState, DueAlarm, Occurrence,
    PendingAlarm, Reminder, SnoozeConfig, TrackedExpiry,
};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, StateError, StorageError, ValidationError};
pub use events::Event;
pub use poller::Poller;
pub use repository::{InMemoryRepository, ScheduleRepository};
pub use storage::{Config, JsonStateStore, MemoryStateStore, ScheduleDb, StateStore};
