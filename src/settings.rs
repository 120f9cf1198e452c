use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, sync::RwLock};

use crate::models::ActiveSessionPointer;

/// The subset of user settings the session core reads and writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub save_private_windows: bool,
    pub compress_favicons: bool,
    pub save_tab_groups: bool,
    pub track_active_session: bool,
    pub save_device_name: bool,
    pub device_name: String,
    pub ignore_urls: Vec<String>,
    pub active_session: Option<ActiveSessionPointer>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            save_private_windows: false,
            compress_favicons: false,
            save_tab_groups: true,
            track_active_session: false,
            save_device_name: false,
            device_name: String::new(),
            ignore_urls: Vec::new(),
            active_session: None,
        }
    }
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<Settings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_default()
        } else {
            Settings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    /// Cloned value for passing explicit configuration into capture/save calls.
    pub fn snapshot(&self) -> Settings {
        self.data.read().unwrap().clone()
    }

    pub fn active_session(&self) -> Option<ActiveSessionPointer> {
        self.data.read().unwrap().active_session.clone()
    }

    pub fn set_active_session(&self, pointer: Option<ActiveSessionPointer>) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        guard.active_session = pointer;
        self.persist(&guard)
    }

    pub fn update(&self, settings: Settings) -> Result<()> {
        let mut guard = self.data.write().unwrap();
        *guard = settings;
        self.persist(&guard)
    }

    pub fn reload(&self) -> Result<()> {
        let contents = fs::read_to_string(&self.path)?;
        let data: Settings = serde_json::from_str(&contents)?;
        let mut guard = self.data.write().unwrap();
        *guard = data;
        Ok(())
    }

    fn persist(&self, data: &Settings) -> Result<()> {
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}
