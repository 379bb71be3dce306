//! Centralized path utilities for the application.

use std::fs;
use std::path::PathBuf;

use crate::error::{AppError, Result};

/// Get the root data directory for the application (~/.mchost).
///
/// Falls back to the working directory when no home directory is known.
pub fn get_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mchost")
}

/// Get the path to the config file.
pub fn config_path() -> PathBuf {
    get_data_dir().join("config.toml")
}

/// Ensure the data directory exists.
pub fn ensure_data_dirs() -> Result<()> {
    fs::create_dir_all(get_data_dir()).map_err(|e| AppError::io(e.to_string()))
}
