//! Configuration types for Storyloom.
//!
//! This module provides the [`Config`] struct which stores the backend
//! location, the active project and local cache settings. Configuration is
//! persisted as TOML (typically at `~/.config/storyloom/config.toml` on Unix
//! systems).
//!
//! # Key Configuration Fields
//!
//! - `backend_url`: Base URL of the remote backend; unset means local-only
//! - `project_id`: Project (workspace) the scene builder works on
//! - `cache_dir`: Directory for the local JSON cache
//! - `save_delay_ms`: Debounce delay before remote scene writes
//!
//! # Example
//!
//! ```ignore
//! use storyloom_core::config::Config;
//!
//! let mut config = Config::load()?;
//! config.backend_url = Some("http://localhost:8000/api".into());
//! config.save()?;
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::backend::DEFAULT_PROJECT_ID;
use crate::error::{Result, StoryloomError};
use crate::scheduler::DEFAULT_SAVE_DELAY;

/// User configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL (e.g., "http://localhost:8000/api")
    /// Scenes are kept in the local cache only when not set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_url: Option<String>,

    /// Active project id
    #[serde(default = "default_project_id")]
    pub project_id: String,

    /// Cache directory override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,

    /// Delay between the last edit and the remote scene write, in milliseconds
    #[serde(default = "default_save_delay_ms")]
    pub save_delay_ms: u64,
}

fn default_project_id() -> String {
    DEFAULT_PROJECT_ID.to_string()
}

fn default_save_delay_ms() -> u64 {
    DEFAULT_SAVE_DELAY.as_millis() as u64
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: None,
            project_id: default_project_id(),
            cache_dir: None,
            save_delay_ms: default_save_delay_ms(),
        }
    }
}

impl Config {
    /// Whether a remote backend is configured.
    pub fn has_backend(&self) -> bool {
        self.backend_url
            .as_deref()
            .is_some_and(|url| !url.trim().is_empty())
    }

    /// Debounce delay for remote scene writes.
    pub fn save_delay(&self) -> Duration {
        Duration::from_millis(self.save_delay_ms)
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| StoryloomError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save config to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create parent directory if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents).map_err(|e| StoryloomError::FileWrite {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(())
    }

    /// Load config from a path, returning default if it is missing or invalid.
    pub fn load_from_or_default(path: &Path) -> Self {
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                if path.exists() {
                    log::warn!("[Config] Ignoring unreadable config {:?}: {}", path, e);
                }
                Self::default()
            }
        }
    }
}

// ============================================================================
// Native-only implementation (not available in WASM)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
impl Config {
    /// Get the config file path (~/.config/storyloom/config.toml)
    /// Only available on native platforms
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("storyloom").join("config.toml"))
    }

    /// Load config from default location, or return default if file doesn't exist
    /// Only available on native platforms
    pub fn load() -> Result<Self> {
        if let Some(path) = Self::config_path()
            && path.exists()
        {
            return Self::load_from(&path);
        }

        Ok(Config::default())
    }

    /// Save config to default location
    /// Only available on native platforms
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().ok_or(StoryloomError::NoConfigDir)?;
        self.save_to(&path)
    }

    /// Directory of the local JSON cache.
    ///
    /// Uses `cache_dir` when set, otherwise `<data dir>/storyloom/cache`.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("storyloom").join("cache"))
            .ok_or(StoryloomError::NoConfigDir)
    }
}
