//! Driver configuration
//!
//! Optional JSON file holding the default init parameters. When present
//! in the working directory, the driver brings the engine up with these
//! values before the first command arrives; an explicit `in` command
//! always replaces that instance. Load failures fall back to the
//! defaults and are logged, never fatal.

use std::fs;
use std::path::Path;

use log::{info, warn};
use serde::Deserialize;

pub const CONFIG_FILENAME: &str = "engine.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub total_nodes: i64,
    pub total_moves: i64,
    pub thread_count: i64,
    pub seed_reps: i64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            total_nodes: 10_000_000,
            total_moves: 400_000_000,
            thread_count: 10,
            seed_reps: 500,
        }
    }
}

impl EngineConfig {
    /// Load from `path`, falling back to defaults on any error.
    /// Returns the config and whether the file was actually read.
    pub fn load(path: &Path) -> (EngineConfig, bool) {
        if !path.exists() {
            info!("no config at {}, waiting for an init command", path.display());
            return (EngineConfig::default(), false);
        }
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<EngineConfig>(&contents) {
                Ok(config) => {
                    info!("loaded config from {}: {:?}", path.display(), config);
                    (config, true)
                }
                Err(err) => {
                    warn!("failed to parse {}: {}. Using defaults.", path.display(), err);
                    (EngineConfig::default(), false)
                }
            },
            Err(err) => {
                warn!("failed to read {}: {}. Using defaults.", path.display(), err);
                (EngineConfig::default(), false)
            }
        }
    }
}
