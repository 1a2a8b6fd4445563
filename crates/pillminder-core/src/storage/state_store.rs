//! Persistence of the engine-owned alarm state.
//!
//! The state survives a process restart so a dismissed alarm stays
//! snoozed across a relaunch. Persistence is advisory: callers fall
//! back to an empty state when the file is missing or unreadable.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::alarm::{AlarmState, STATE_VERSION};
use crate::error::StateError;
use crate::storage::data_dir;

/// Where the engine keeps its pending/confirmed/snooze state.
pub trait StateStore {
    fn load(&self) -> Result<AlarmState, StateError>;
    fn save(&self, state: &AlarmState) -> Result<(), StateError>;
}

/// JSON file store at `<data_dir>/alarm_state.json`.
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    /// Open the store at the default location.
    ///
    /// # Errors
    /// Returns an error if the data directory cannot be created.
    pub fn open() -> std::io::Result<Self> {
        Ok(Self {
            path: data_dir()?.join("alarm_state.json"),
        })
    }

    /// Open the store at a custom path.
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl StateStore for JsonStateStore {
    fn load(&self) -> Result<AlarmState, StateError> {
        if !self.path.exists() {
            return Ok(AlarmState::default());
        }
        let content =
            std::fs::read_to_string(&self.path).map_err(|e| StateError::ReadFailed {
                path: self.path.clone(),
                message: e.to_string(),
            })?;
        let state: AlarmState =
            serde_json::from_str(&content).map_err(|e| StateError::ParseFailed(e.to_string()))?;
        if state.version > STATE_VERSION {
            return Err(StateError::UnsupportedVersion(state.version));
        }
        Ok(state)
    }

    fn save(&self, state: &AlarmState) -> Result<(), StateError> {
        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StateError::ParseFailed(e.to_string()))?;
        std::fs::write(&self.path, content).map_err(|e| StateError::WriteFailed {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }
}

/// In-memory store for tests and embedding.
///
/// Clones share the same state, so handing a clone to an engine and
/// keeping one lets a test simulate a restart on the same "disk".
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    state: Arc<Mutex<AlarmState>>,
}

impl StateStore for MemoryStateStore {
    fn load(&self) -> Result<AlarmState, StateError> {
        Ok(self
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone())
    }

    fn save(&self, state: &AlarmState) -> Result<(), StateError> {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state.clone();
        Ok(())
    }
}
