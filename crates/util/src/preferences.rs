//! Sidebar preference persistence.
//!
//! A tiny JSON-backed store recording whether the sidebar is pinned open. The
//! file lives in the standard configuration directory
//! (`~/.config/navtree/preferences.json` on most platforms) and is safe to
//! read/write from multiple threads thanks to the internal `Mutex`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::expand_tilde;

/// Environment variable allowing callers to override the preferences file path.
pub const PREFERENCES_PATH_ENV: &str = "NAVTREE_PREFERENCES_PATH";

/// Default filename for the JSON payload.
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Error surfaced when reading or writing preferences fails.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// I/O failure (for example, permissions or missing directory).
    #[error("preferences I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("preferences serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Persisted preference values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferencesPayload {
    /// Whether the sidebar stays expanded instead of collapsing to icons.
    #[serde(default = "default_pinned")]
    pub sidebar_pinned: bool,
}

impl Default for PreferencesPayload {
    fn default() -> Self {
        Self {
            sidebar_pinned: default_pinned(),
        }
    }
}

fn default_pinned() -> bool {
    true
}

/// Thread-safe preferences store backed by a JSON file.
#[derive(Debug)]
pub struct SidebarPreferences {
    path: PathBuf,
    payload: Mutex<PreferencesPayload>,
    persist_to_disk: bool,
}

impl SidebarPreferences {
    /// Open the store at the default location, honoring
    /// [`PREFERENCES_PATH_ENV`].
    pub fn new() -> Result<Self, PreferencesError> {
        Self::at_path(default_preferences_path())
    }

    /// Open the store backed by `path`.
    pub fn at_path(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
        let path = path.into();
        let payload = load_payload(&path)?;
        Ok(Self {
            path,
            payload: Mutex::new(payload),
            persist_to_disk: true,
        })
    }

    /// Build an in-memory store used as a fallback when the config directory cannot be accessed.
    pub fn ephemeral() -> Self {
        Self {
            path: PathBuf::new(),
            payload: Mutex::new(PreferencesPayload::default()),
            persist_to_disk: false,
        }
    }

    /// Path to the underlying JSON file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_pinned(&self) -> bool {
        self.payload.lock().expect("preferences lock poisoned").sidebar_pinned
    }

    /// Persist a new pin state.
    pub fn set_pinned(&self, pinned: bool) -> Result<(), PreferencesError> {
        let mut payload = self.payload.lock().expect("preferences lock poisoned");
        payload.sidebar_pinned = pinned;
        if self.persist_to_disk {
            self.save_locked(&payload)?;
        }
        Ok(())
    }

    /// Flip the pin state and return the new value.
    pub fn toggle_pinned(&self) -> Result<bool, PreferencesError> {
        let mut payload = self.payload.lock().expect("preferences lock poisoned");
        payload.sidebar_pinned = !payload.sidebar_pinned;
        if self.persist_to_disk {
            self.save_locked(&payload)?;
        }
        Ok(payload.sidebar_pinned)
    }

    fn save_locked(&self, payload: &PreferencesPayload) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(payload)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

fn default_preferences_path() -> PathBuf {
    if let Ok(path) = env::var(PREFERENCES_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("navtree")
        .join(PREFERENCES_FILE_NAME)
}

fn load_payload(path: &Path) -> Result<PreferencesPayload, PreferencesError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(payload) => Ok(payload),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse preferences file; using defaults"
                );
                Ok(PreferencesPayload::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(PreferencesPayload::default()),
        Err(error) => Err(PreferencesError::Io(error)),
    }
}
