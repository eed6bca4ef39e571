//! Collaborators the engine relies on but never calls itself.
//!
//! The caller loads settings before building an engine, saves them after a
//! successful `apply_settings`, and forwards every completed phase to an
//! [`AnalyticsSink`].

mod config;
pub mod database;
mod memory;

pub use config::{Config, FileSettingsStore, NotificationsConfig};
pub use database::{Database, SessionRecord, Stats};
pub use memory::{MemoryAnalytics, MemorySettingsStore};

use std::path::PathBuf;

use crate::error::{ConfigError, Result};
use crate::timer::{CompletedPhase, TimerSettings};

/// Persistence for the committed timer settings.
pub trait SettingsStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&self) -> Result<Option<TimerSettings>>;
    fn save(&mut self, settings: &TimerSettings) -> Result<()>;

    /// Saved settings, or the built-in defaults when absent.
    fn load_or_default(&self) -> Result<TimerSettings> {
        Ok(self.load()?.unwrap_or_default())
    }
}

/// Observer notified once per completed phase.
pub trait AnalyticsSink {
    fn record(&mut self, completed: &CompletedPhase);
}

/// Returns `~/.config/pomocycle[-dev]/` based on POMOCYCLE_ENV.
///
/// POMOCYCLE_HOME overrides the location entirely.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let dir = match std::env::var_os("POMOCYCLE_HOME") {
        Some(home) => PathBuf::from(home),
        None => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("POMOCYCLE_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("pomocycle-dev")
            } else {
                base_dir.join("pomocycle")
            }
        }
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
