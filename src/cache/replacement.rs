use std::{fmt, str::FromStr};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

use super::block::Block;

/// how a victim is picked when every way of a set is valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ReplacementPolicy {
    #[serde(rename = "LRU", alias = "lru", alias = "Lru")]
    Lru,
    #[serde(rename = "FIFO", alias = "fifo", alias = "Fifo")]
    Fifo,
    #[serde(rename = "Random", alias = "random", alias = "RANDOM")]
    Random,
}

impl Default for ReplacementPolicy {
    fn default() -> Self {
        ReplacementPolicy::Lru
    }
}

impl ReplacementPolicy {
    /// return the way to evict, `blocks` must be a full set.
    /// LRU and FIFO take the first way holding the smallest timestamp.
    pub fn choose_victim<R: Rng>(&self, blocks: &[Block], rng: &mut R) -> usize {
        match self {
            ReplacementPolicy::Lru => oldest_by(blocks, |block| block.last_used_time),
            ReplacementPolicy::Fifo => oldest_by(blocks, |block| block.arrival_time),
            ReplacementPolicy::Random => rng.gen_range(0..blocks.len()),
        }
    }
}

fn oldest_by(blocks: &[Block], time: impl Fn(&Block) -> u64) -> usize {
    // min_by_key keeps the first of equal minimums
    blocks
        .iter()
        .enumerate()
        .min_by_key(|(_, block)| time(block))
        .map(|(way, _)| way)
        .unwrap_or(0)
}

impl FromStr for ReplacementPolicy {
    type Err = ConfigError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(ReplacementPolicy::Lru),
            "fifo" => Ok(ReplacementPolicy::Fifo),
            "random" => Ok(ReplacementPolicy::Random),
            _ => Err(ConfigError::UnknownPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReplacementPolicy::Lru => "LRU",
            ReplacementPolicy::Fifo => "FIFO",
            ReplacementPolicy::Random => "Random",
        };
        f.write_str(name)
    }
}
