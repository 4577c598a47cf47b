use eyre::{Context, Result};
use std::fs;

use serde::{Deserialize, Serialize};

use crate::cache::{Geometry, ReplacementPolicy};

/// the config for one simulation run
///
/// ```toml
/// cache_size = 1024
/// block_size = 32
/// associativity = 2
/// policy = "LRU"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// total bytes
    pub cache_size: u64,
    /// bytes per block
    pub block_size: u64,
    /// blocks per set
    pub associativity: u64,
    pub policy: ReplacementPolicy,
    /// only used by the `Random` policy, unseeded runs are not reproducible
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            cache_size: 1024,
            block_size: 16,
            associativity: 2,
            policy: ReplacementPolicy::Lru,
            seed: None,
        }
    }
}

impl Config {
    pub fn from_config_file(config_file: &str) -> Result<Config> {
        let config_file = fs::read_to_string(config_file).wrap_err("cannot read config file")?;
        let config: Config =
            toml::from_str(&config_file).wrap_err("cannot deserialize to Config")?;
        Ok(config)
    }

    /// validate the sizes, fails with [`crate::error::ConfigError`]
    pub fn geometry(&self) -> Result<Geometry> {
        let geometry = Geometry::new(self.cache_size, self.block_size, self.associativity)?;
        Ok(geometry)
    }

    pub fn show_config(&self) -> Result<String> {
        serde_json::to_string_pretty(self).wrap_err("cannot serialize Config")
    }
}
