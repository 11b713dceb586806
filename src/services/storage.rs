//! Settings persistence on disk
//!
//! Settings live in one pretty-printed JSON file. Loading never fails: a
//! missing or unreadable file yields the defaults with a logged warning, and
//! writes are fire-and-forget so a full disk cannot break the timer itself.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::{info, warn};

use crate::state::TimerSettings;

/// Owns the current settings and their backing file
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    current: Mutex<TimerSettings>,
}

impl SettingsStore {
    /// Load settings from `path`, falling back to defaults on any problem
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = match read_settings_file(&path) {
            Ok(Some(settings)) => {
                info!("Loaded settings from {}", path.display());
                settings
            }
            Ok(None) => {
                info!("No settings file at {}, using defaults", path.display());
                TimerSettings::default()
            }
            Err(e) => {
                warn!("Ignoring unreadable settings file {}: {}", path.display(), e);
                TimerSettings::default()
            }
        };

        Self {
            path,
            current: Mutex::new(current),
        }
    }

    /// Get the current clamped settings
    pub fn read(&self) -> Result<TimerSettings, String> {
        self.current
            .lock()
            .map(|current| current.clone())
            .map_err(|e| format!("Failed to lock settings: {}", e))
    }

    /// Clamp and store new settings, then write them through to disk.
    /// Returns the clamped values. Disk failures are logged, not returned.
    pub fn persist(&self, settings: TimerSettings) -> Result<TimerSettings, String> {
        let settings = settings.clamped();

        let mut current = self
            .current
            .lock()
            .map_err(|e| format!("Failed to lock settings: {}", e))?;
        *current = settings.clone();
        drop(current);

        if let Err(e) = write_settings_file(&self.path, &settings) {
            warn!("Failed to write settings to {}: {}", self.path.display(), e);
        }
        Ok(settings)
    }
}

fn read_settings_file(path: &Path) -> Result<Option<TimerSettings>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
    let parsed: TimerSettings = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
    Ok(Some(parsed.clamped()))
}

fn write_settings_file(path: &Path, settings: &TimerSettings) -> Result<(), String> {
    let formatted = serde_json::to_string_pretty(settings).map_err(|e| e.to_string())?;
    fs::write(path, format!("{formatted}\n")).map_err(|e| e.to_string())
}
