use std::{fmt, fs::File};

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{cache::AccessResult, trace::Operation};

/// cycles charged for a hit
pub const HIT_CYCLES: u64 = 1;
/// cycles charged for a miss, one memory round trip
pub const MISS_CYCLES: u64 = 100;

#[derive(Debug, Serialize, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
pub struct SimulationResult {
    pub load_count: u64,
    pub load_misses: u64,
    pub store_count: u64,
    pub store_misses: u64,
    pub total_cycles: u64,
}

impl SimulationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&mut self, op: Operation, result: &AccessResult) {
        let miss = result.as_miss().is_some();
        match op {
            Operation::Load => {
                self.load_count += 1;
                self.load_misses += miss as u64;
            }
            Operation::Store => {
                self.store_count += 1;
                self.store_misses += miss as u64;
            }
        }
        self.total_cycles += if miss { MISS_CYCLES } else { HIT_CYCLES };
    }

    pub fn total_accesses(&self) -> u64 {
        self.load_count + self.store_count
    }
    pub fn misses(&self) -> u64 {
        self.load_misses + self.store_misses
    }
    pub fn hits(&self) -> u64 {
        self.total_accesses() - self.misses()
    }

    /// 0 when nothing was accessed
    pub fn hit_rate(&self) -> f64 {
        match self.total_accesses() {
            0 => 0.0,
            total => self.hits() as f64 / total as f64,
        }
    }
    pub fn miss_rate(&self) -> f64 {
        match self.total_accesses() {
            0 => 0.0,
            total => self.misses() as f64 / total as f64,
        }
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let file = File::create(path).wrap_err_with(|| format!("cannot create {path}"))?;
        serde_json::to_writer_pretty(file, self).wrap_err("cannot write statistics")?;
        Ok(())
    }
}

impl fmt::Display for SimulationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Simulation Results:")?;
        writeln!(f, "Load Count: {}", self.load_count)?;
        writeln!(f, "Load Miss: {}", self.load_misses)?;
        writeln!(f, "Store Count: {}", self.store_count)?;
        writeln!(f, "Store Miss: {}", self.store_misses)?;
        write!(f, "Total Cycles: {}", self.total_cycles)
    }
}
