use std::fmt;

/// the cache cannot be built from the given parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// one of the geometry parameters is zero
    NonPositive { field: &'static str },
    /// `cache_size` is not a multiple of `block_size * associativity`
    UnevenGeometry {
        cache_size: u64,
        block_size: u64,
        associativity: u64,
    },
    /// `num_sets * associativity` blocks cannot be allocated
    TooLarge { num_sets: u64, associativity: u64 },
    UnknownPolicy(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NonPositive { field } => write!(f, "{field} must be positive"),
            ConfigError::UnevenGeometry {
                cache_size,
                block_size,
                associativity,
            } => write!(
                f,
                "cache size {cache_size} is not a multiple of block size {block_size} x associativity {associativity}"
            ),
            ConfigError::TooLarge {
                num_sets,
                associativity,
            } => write!(
                f,
                "{num_sets} sets x {associativity} ways is more blocks than the simulator can hold"
            ),
            ConfigError::UnknownPolicy(policy) => {
                write!(f, "unknown replacement policy `{policy}`, expect LRU, FIFO or Random")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// a trace line that cannot be turned into an instruction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedInstructionError {
    MissingOperation,
    UnknownOperation(String),
    InvalidAddress(String),
    MissingAddress,
    TrailingTokens(String),
}

impl fmt::Display for MalformedInstructionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedInstructionError::MissingOperation => write!(f, "missing operation"),
            MalformedInstructionError::UnknownOperation(op) => {
                write!(f, "unknown operation `{op}`, expect L or S")
            }
            MalformedInstructionError::InvalidAddress(addr) => {
                write!(f, "`{addr}` is not a non-negative address")
            }
            MalformedInstructionError::MissingAddress => write!(f, "missing address"),
            MalformedInstructionError::TrailingTokens(rest) => {
                write!(f, "unexpected tokens after address: `{rest}`")
            }
        }
    }
}

impl std::error::Error for MalformedInstructionError {}
