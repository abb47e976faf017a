//! Settings persistence at the application boundary.
//!
//! The solver itself does no file I/O; this crate turns JSON settings
//! payloads (the same shape the control panel emits) into
//! [`flowlines_sim::Settings`] and back.

use std::fs;
use std::path::Path;

use flowlines_sim::Settings;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Parses a settings payload from JSON text.
pub fn parse_settings(json: &str) -> Result<Settings, SettingsError> {
    Ok(serde_json::from_str(json)?)
}

/// Reads settings from a JSON file.
pub fn load_settings(path: impl AsRef<Path>) -> Result<Settings, SettingsError> {
    parse_settings(&fs::read_to_string(path)?)
}

/// Writes settings to a JSON file, pretty-printed.
pub fn save_settings(path: impl AsRef<Path>, settings: &Settings) -> Result<(), SettingsError> {
    let json = serde_json::to_string_pretty(settings)?;
    fs::write(path, json)?;
    Ok(())
}
