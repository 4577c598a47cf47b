//! Cache simulator CLI.
//!
//! Reads the cache config from a TOML file (or flags), the trace from a file
//! or stdin (`L 100` / `S 200` per line, `exit` to stop), and prints the result.

use std::io;

use cachesim::{config::Config, sim, trace, ReplacementPolicy};
use clap::Parser;
use eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Set-associative cache simulator")]
struct Args {
    /// toml config, flags below override it
    #[arg(short, long)]
    config: Option<String>,

    /// trace file, read stdin when missing
    #[arg(short, long)]
    trace: Option<String>,

    #[arg(long)]
    cache_size: Option<u64>,

    #[arg(long)]
    block_size: Option<u64>,

    #[arg(long)]
    associativity: Option<u64>,

    /// LRU, FIFO or Random
    #[arg(long)]
    policy: Option<ReplacementPolicy>,

    /// seed for the Random policy
    #[arg(long)]
    seed: Option<u64>,

    /// also save the result as json
    #[arg(short, long)]
    output: Option<String>,
}

impl Args {
    fn load_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_config_file(path)
                .wrap_err_with(|| format!("cannot load config from {path}"))?,
            None => Config::default(),
        };
        if let Some(cache_size) = self.cache_size {
            config.cache_size = cache_size;
        }
        if let Some(block_size) = self.block_size {
            config.block_size = block_size;
        }
        if let Some(associativity) = self.associativity {
            config.associativity = associativity;
        }
        if let Some(policy) = self.policy {
            config.policy = policy;
        }
        if self.seed.is_some() {
            config.seed = self.seed;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let config = args.load_config()?;
    tracing::info!("config: {}", config.show_config()?);
    // reject the geometry before waiting on the trace
    config.geometry()?;

    let trace = match &args.trace {
        Some(path) => trace::trace_from_file(path)?,
        None => trace::parse_trace(io::stdin().lock())?,
    };

    let result = sim::run(&config, trace)?;
    println!("{result}");
    println!(
        "Hit Rate: {:.2}%, Miss Rate: {:.2}%",
        result.hit_rate() * 100.0,
        result.miss_rate() * 100.0
    );
    if let Some(path) = &args.output {
        result.save(path)?;
    }
    Ok(())
}
