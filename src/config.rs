//! Whole-swarm configuration and its JSON form.
//!
//! A [`SystemConfig`] is everything needed to reproduce a run: slot count,
//! seed, emitter and parameters. Every field has a default, so a file only
//! needs to name what it changes:
//!
//! ```json
//! {
//!   "count": 4096,
//!   "params": { "gravity": [0.0, -1.622, 0.0], "visuals": { "color_in": "#7ae4ff" } }
//! }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::emitter::EmitterState;
use crate::error::ConfigError;
use crate::params::SimParams;

/// Reproducible description of a swarm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    /// Number of particle slots.
    pub count: u32,
    /// Seed for the respawn and per-instance hashes.
    pub seed: u32,
    pub emitter: EmitterState,
    pub params: SimParams,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            count: 1000,
            seed: 0,
            emitter: EmitterState::default(),
            params: SimParams::default(),
        }
    }
}

impl SystemConfig {
    /// Pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Save the configuration to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }
}
