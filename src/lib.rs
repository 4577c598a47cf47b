//! Set-associative cache simulator.
//!
//! Replays a trace of loads and stores against one cache level and counts
//! hits, misses and an estimated cycle cost (1 per hit, 100 per miss).
//!
//! ```
//! use cachesim::{config::Config, sim, trace::Instruction};
//!
//! let config = Config {
//!     cache_size: 1024,
//!     block_size: 32,
//!     associativity: 2,
//!     ..Config::default()
//! };
//! let trace = vec![Instruction::load(0), Instruction::load(0), Instruction::load(32768)];
//! let result = sim::run(&config, trace).unwrap();
//! assert_eq!(result.load_misses, 2);
//! assert_eq!(result.total_cycles, 201);
//! ```
pub mod cache;
pub mod config;
pub mod error;
pub mod sim;
pub mod statistics;
pub(self) mod test_utils;
pub mod trace;

pub use cache::{AccessResult, Cache, Geometry, ReplacementPolicy};
pub use config::Config;
pub use statistics::SimulationResult;
pub use trace::{Instruction, Operation};
