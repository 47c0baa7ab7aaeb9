//! Process-wide theme preference
//!
//! The dark/light choice is read once from a small key-value file at
//! startup and written back on every toggle. It is injected into the view
//! layer and has no interaction with gateway state.

use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    // Anything unrecognized falls back to light.
    fn parse(value: &str) -> Self {
        if value.trim() == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

pub struct ThemeStore {
    path: PathBuf,
    current: Mutex<Theme>,
}

impl ThemeStore {
    /// Reads the persisted choice, defaulting to light when the file is
    /// missing or unreadable.
    pub fn init(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let current = fs::read_to_string(&path)
            .map(|raw| Theme::parse(&raw))
            .unwrap_or(Theme::Light);
        ThemeStore { path, current: Mutex::new(current) }
    }

    pub fn current(&self) -> Theme {
        *self.current.lock().unwrap()
    }

    /// Flips the theme, persists it, and returns the new value. A write
    /// failure keeps the in-memory choice and is only logged.
    pub fn toggle(&self) -> Theme {
        let mut current = self.current.lock().unwrap();
        *current = current.toggled();
        if let Err(err) = fs::write(&self.path, current.as_str()) {
            tracing::warn!(error = %err, path = %self.path.display(), "failed to persist theme");
        }
        *current
    }
}
