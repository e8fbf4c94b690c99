//! Planner policy constants.
//!
//! Every threshold the greedy planner uses lives here so it can be tuned in
//! the arena without touching the algorithm. Values load from a JSON file
//! named by `CELLWAR_CONFIG`, or can be overridden one at a time through
//! `set_option`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::MAX_PRODUCTION;

/// Environment variable naming an optional JSON config file.
pub const CONFIG_ENV_VAR: &str = "CELLWAR_CONFIG";

/// Errors raised while loading or overriding configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown option '{0}'")]
    UnknownOption(String),

    #[error("invalid value '{value}' for option '{name}'")]
    InvalidValue { name: String, value: String },
}

/// Tunable constants of the greedy planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Factories at this production level are never upgraded.
    pub max_production: u8,
    /// Cyborgs spent on one production upgrade; also the minimum garrison to try one.
    pub upgrade_cost: u32,
    /// Extra cyborgs sent on top of the projected defence to win ties.
    pub capture_margin: u32,
    /// Turns of enemy production to account for beyond the travel time.
    pub arrival_lookahead: u32,
    /// Factories producing less than this are not attacked.
    pub min_target_production: u8,
    /// Cap on attacks launched from one factory per turn; `None` means no cap.
    pub max_attacks_per_factory: Option<usize>,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        PlannerConfig {
            max_production: MAX_PRODUCTION,
            upgrade_cost: 10,
            capture_margin: 1,
            arrival_lookahead: 1,
            min_target_production: 1,
            max_attacks_per_factory: None,
        }
    }
}

impl PlannerConfig {
    /// Parses a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Loads a config from a JSON file.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Loads the file named by `CELLWAR_CONFIG`, or the defaults if unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => Self::from_path(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// Overrides a single field by name.
    ///
    /// Names match the JSON keys. `max_attacks_per_factory` accepts `none`
    /// to remove the cap.
    pub fn set_option(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        match name {
            "max_production" => self.max_production = value.parse().map_err(|_| invalid())?,
            "upgrade_cost" => self.upgrade_cost = value.parse().map_err(|_| invalid())?,
            "capture_margin" => self.capture_margin = value.parse().map_err(|_| invalid())?,
            "arrival_lookahead" => self.arrival_lookahead = value.parse().map_err(|_| invalid())?,
            "min_target_production" => {
                self.min_target_production = value.parse().map_err(|_| invalid())?
            }
            "max_attacks_per_factory" => {
                self.max_attacks_per_factory = if value.eq_ignore_ascii_case("none") {
                    None
                } else {
                    Some(value.parse().map_err(|_| invalid())?)
                }
            }
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
        Ok(())
    }
}
