//! Where hexpane keeps its config file and logs
//!
//! The root directory is:
//! - `$XDG_CONFIG_HOME/hexpane` or `~/.config/hexpane` on Unix/macOS
//! - `%APPDATA%\hexpane` on Windows
//!
//! Everything else hangs off a [`ConfigPaths`], which can also be rooted
//! anywhere else.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const APP_DIR: &str = "hexpane";

/// Prefix of the daily-rotated log files
pub const LOG_FILE_PREFIX: &str = "hexpane.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    root: PathBuf,
}

impl ConfigPaths {
    /// Paths under the platform config directory, if there is one
    pub fn discover() -> Option<Self> {
        platform_config_home().map(|home| Self::at(home.join(APP_DIR)))
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Newest rotated log (`hexpane.log.YYYY-MM-DD`), or where the first
    /// one will be written when none exist yet
    pub fn log_file(&self) -> PathBuf {
        let logs = self.logs_dir();
        // Date suffixes sort naturally
        let newest = fs::read_dir(&logs)
            .into_iter()
            .flatten()
            .filter_map(|entry| entry.ok()?.file_name().into_string().ok())
            .filter(|name| name.starts_with(LOG_FILE_PREFIX))
            .max();
        logs.join(newest.as_deref().unwrap_or(LOG_FILE_PREFIX))
    }

    /// Create the logs directory if needed and return it
    pub fn ensure_logs_dir(&self) -> Result<PathBuf> {
        let logs = self.logs_dir();
        fs::create_dir_all(&logs)
            .with_context(|| format!("Failed to create directory {}", logs.display()))?;
        Ok(logs)
    }
}

#[cfg(target_os = "windows")]
fn platform_config_home() -> Option<PathBuf> {
    env::var_os("APPDATA").map(PathBuf::from)
}

#[cfg(not(target_os = "windows"))]
fn platform_config_home() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
}
