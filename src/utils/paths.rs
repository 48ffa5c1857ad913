//! Cross-Platform Path Utilities
//!
//! Functions for resolving application directories across platforms.
//! All persisted state lives under ~/.reportdeck/ unless the data
//! directory is overridden.

use std::path::{Path, PathBuf};

use crate::utils::error::{AppError, AppResult};

/// Get the user's home directory
pub fn home_dir() -> AppResult<PathBuf> {
    dirs::home_dir().ok_or_else(|| AppError::config("Could not determine home directory"))
}

/// Get the Reportdeck directory (~/.reportdeck/)
pub fn reportdeck_dir() -> AppResult<PathBuf> {
    Ok(home_dir()?.join(".reportdeck"))
}

/// Get the config file path (~/.reportdeck/config.json)
pub fn config_path() -> AppResult<PathBuf> {
    Ok(reportdeck_dir()?.join("config.json"))
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> AppResult<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Get the Reportdeck directory, creating if it doesn't exist
pub fn ensure_reportdeck_dir() -> AppResult<PathBuf> {
    let path = reportdeck_dir()?;
    ensure_dir(&path)?;
    Ok(path)
}
