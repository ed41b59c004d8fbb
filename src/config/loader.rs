//! Configuration Loader
//!
//! Reads the optional JSON layers and merges them over the defaults:
//! 1. Built-in defaults (host/port seeded from `IP`/`PORT`)
//! 2. User config (`~/.alive-server.json`)
//! 3. Project config (`./.alive-server.json`)
//!
//! A missing file is an empty layer; an unreadable or malformed one aborts.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::debug;

use super::layer::{ConfigLayer, EnvDefaults};
use crate::constants::config as config_constants;
use crate::types::{AliveError, Result};

/// Configuration loader
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    home: Option<PathBuf>,
    cwd: PathBuf,
}

impl ConfigLoader {
    /// Loader rooted at explicit home and working directories
    pub fn new(home: Option<PathBuf>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            home,
            cwd: cwd.into(),
        }
    }

    /// Merge defaults → user file → project file
    pub fn load(&self, env: &EnvDefaults) -> Result<ConfigLayer> {
        let mut merged = ConfigLayer::defaults(env);

        if let Some(user_path) = self.user_config_path()
            && let Some(layer) = Self::read_layer(&user_path)?
        {
            debug!("Loaded user config from: {}", user_path.display());
            merged = merged.overlay(layer);
        }

        let project_path = self.project_config_path();
        if let Some(layer) = Self::read_layer(&project_path)? {
            debug!("Loaded project config from: {}", project_path.display());
            merged = merged.overlay(layer);
        }

        Ok(merged)
    }

    /// Read one layer; `None` when the file does not exist
    pub fn read_layer(path: &Path) -> Result<Option<ConfigLayer>> {
        if !path.is_file() {
            return Ok(None);
        }
        let content = fs::read_to_string(path).map_err(|source| AliveError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        let layer = ConfigLayer::from_json(&content).map_err(|source| AliveError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Some(layer))
    }

    // =========================================================================
    // Path Management
    // =========================================================================

    /// Home directory of the invoking user (`HOME`, or the profile folder on Windows)
    pub fn home_dir() -> Option<PathBuf> {
        BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
    }

    /// Path to the user config file
    pub fn user_config_path(&self) -> Option<PathBuf> {
        self.home
            .as_ref()
            .map(|home| home.join(config_constants::FILE_NAME))
    }

    /// Path to the project config file
    pub fn project_config_path(&self) -> PathBuf {
        self.cwd.join(config_constants::FILE_NAME)
    }
}
