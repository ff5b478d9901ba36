//! `config.json` store.

use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::debug;

use super::{read_json, write_json};
use crate::error::{PurcError, Result};
use crate::models::config::Config;

/// Reads and overwrites the singleton config file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the config, or built-in defaults when the file is absent.
    pub fn load(&self) -> Result<Config> {
        let config = read_json::<Config>(&self.path)?.unwrap_or_else(|| {
            debug!("No config at {}, using defaults", self.path.display());
            Config::default()
        });
        Ok(config)
    }

    /// Overwrite the config file.
    pub fn save(&self, config: &Config) -> Result<()> {
        write_json(&self.path, config)?;
        debug!("Saved config to {}", self.path.display());
        Ok(())
    }

    /// Apply a top-level JSON object patch and save the result.
    ///
    /// Each key of `patch` replaces the same key of the stored config as a
    /// whole, so `{"auth": {"username": "x"}}` resets the password to its
    /// default.
    pub fn merge(&self, patch: &Value) -> Result<Config> {
        let patch = patch
            .as_object()
            .ok_or_else(|| PurcError::Config("config patch must be a JSON object".to_string()))?;

        let mut current = serde_json::to_value(self.load()?)
            .map_err(|e| PurcError::Config(e.to_string()))?;

        if let Some(obj) = current.as_object_mut() {
            for (key, value) in patch {
                obj.insert(key.clone(), value.clone());
            }
        }

        let config: Config =
            serde_json::from_value(current).map_err(|e| PurcError::Config(e.to_string()))?;
        self.save(&config)?;

        Ok(config)
    }
}
