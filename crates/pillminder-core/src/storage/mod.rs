mod config;
pub mod schedule_db;
pub mod state_store;

pub use config::Config;
pub use schedule_db::ScheduleDb;
pub use state_store::{JsonStateStore, MemoryStateStore, StateStore};

use std::path::PathBuf;

/// Returns `~/.config/pillminder[-dev]/` based on PILLMINDER_ENV.
///
/// Set PILLMINDER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("PILLMINDER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("pillminder-dev")
    } else {
        base_dir.join("pillminder")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
