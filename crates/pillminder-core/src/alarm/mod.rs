mod engine;
mod evaluator;
mod snooze;
mod tracker;
mod types;

pub use engine::AlarmEngine;
pub use evaluator::{due_expiries, due_reminders, evaluate, DueAlarm};
pub use snooze::{SnoozeConfig, SnoozeDeadline};
pub use tracker::{AckTracker, AlarmState, ConfirmedAlarm, PendingAlarm, STATE_VERSION};
pub use types::{AlarmCategory, AlarmRef, Occurrence, Reminder, TrackedExpiry};
