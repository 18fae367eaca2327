mod config;
pub mod database;
pub mod kv;
pub mod session_store;

pub use config::{CategoriesConfig, Config, TimerConfig};
pub use database::Database;
pub use kv::{KeyValueStore, MemoryStore};
pub use session_store::{load_sessions, SessionStore, SESSIONS_KEY};

use std::path::PathBuf;

use crate::error::StorageError;

/// Resolves the data directory.
///
/// `FOCUSWARD_DATA_DIR` wins when set. Otherwise `~/.config/focusward[-dev]/`,
/// where `FOCUSWARD_ENV=dev` selects the development directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let dir = match std::env::var_os("FOCUSWARD_DATA_DIR") {
        Some(explicit) if !explicit.is_empty() => PathBuf::from(explicit),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");

            let env = std::env::var("FOCUSWARD_ENV").unwrap_or_else(|_| "production".to_string());

            if env == "dev" {
                base_dir.join("focusward-dev")
            } else {
                base_dir.join("focusward")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
