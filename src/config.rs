//! View configuration persistence
//!
//! Stores user preferences in `~/.config/hexpane/config.yaml`

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config_paths::ConfigPaths;
use crate::model::options::DisplayOptions;
use crate::model::view::ViewTiming;

/// View configuration that persists across sessions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    pub display: DisplayOptions,
    /// Cursor blink half-period in milliseconds
    #[serde(default = "default_cursor_blink_ms")]
    pub cursor_blink_ms: u64,
    /// Drag-select sampling period in milliseconds
    #[serde(default = "default_select_tick_ms")]
    pub select_tick_ms: u64,
    /// Lines scrolled per mouse wheel notch
    #[serde(default = "default_wheel_lines")]
    pub wheel_lines: u32,
}

fn default_cursor_blink_ms() -> u64 {
    500
}

fn default_select_tick_ms() -> u64 {
    100
}

fn default_wheel_lines() -> u32 {
    3
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            display: DisplayOptions::default(),
            cursor_blink_ms: default_cursor_blink_ms(),
            select_tick_ms: default_select_tick_ms(),
            wheel_lines: default_wheel_lines(),
        }
    }
}

impl ViewConfig {
    /// Load config from disk, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = ConfigPaths::discover().map(|paths| paths.config_file()) else {
            tracing::debug!("No config directory available, using defaults");
            return Self::default();
        };
        Self::load_from(&path)
    }

    /// Load config from `path`. Missing or unreadable files give defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            tracing::debug!(
                "Config file not found at {}, using defaults",
                path.display()
            );
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_yaml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config at {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config at {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save config to disk
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> Result<(), String> {
        let path = ConfigPaths::discover()
            .map(|paths| paths.config_file())
            .ok_or_else(|| "No config directory available".to_string())?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create config directory: {}", e))?;
        }

        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        std::fs::write(path, content)
            .map_err(|e| format!("Failed to write config to {}: {}", path.display(), e))?;

        tracing::info!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn timing(&self) -> ViewTiming {
        ViewTiming {
            cursor_blink: Duration::from_millis(self.cursor_blink_ms.max(1)),
            select_tick: Duration::from_millis(self.select_tick_ms.max(1)),
            wheel_lines: self.wheel_lines.max(1),
        }
    }
}
