use std::collections::VecDeque;

use rand::Rng;

use crate::{
    cache::Cache,
    config::Config,
    statistics::SimulationResult,
    trace::Instruction,
};

pub trait SimComponent {
    type SharedStatus;
    /// update the component, return(busy, updated)
    fn update(
        &mut self,
        shared_status: &mut Self::SharedStatus,
        current_cycle: usize,
    ) -> (bool, bool);
}

#[derive(Debug)]
pub struct SimRunner<T, S> {
    sim: T,
    shared_status: S,
    current_cycle: usize,
}
impl<T, S> SimRunner<T, S>
where
    T: SimComponent<SharedStatus = S>,
{
    pub fn new(sim: T, shared_status: S) -> SimRunner<T, S> {
        SimRunner {
            sim,
            current_cycle: 0,
            shared_status,
        }
    }
    pub fn get_sim(&self) -> &T {
        &self.sim
    }
    pub fn get_shared_status(&self) -> &S {
        &self.shared_status
    }
    pub fn run(&mut self) -> eyre::Result<()> {
        loop {
            let result = self.sim.update(&mut self.shared_status, self.current_cycle);
            match result {
                (true, true) => {
                    self.current_cycle += 1;
                }
                (true, false) => {
                    tracing::error!(
                        "simulation is busy but not updated at cycle {}",
                        self.current_cycle
                    );
                    return Err(eyre::eyre!(
                        "simulation is busy but not updated at cycle {}",
                        self.current_cycle
                    ));
                }
                (false, _) => {
                    // not busy, so we are done
                    break;
                }
            }
        }
        Ok(())
    }
    pub fn get_current_cycle(&self) -> usize {
        self.current_cycle
    }
    pub fn into_inner(self) -> (T, S, usize) {
        (self.sim, self.shared_status, self.current_cycle)
    }
}

/// feed one instruction per step to the cache
pub struct TraceReplayer<R> {
    cache: Cache<R>,
    trace: VecDeque<Instruction>,
}

impl<R: Rng> TraceReplayer<R> {
    pub fn new(cache: Cache<R>, trace: impl IntoIterator<Item = Instruction>) -> Self {
        Self {
            cache,
            trace: trace.into_iter().collect(),
        }
    }
    pub fn cache(&self) -> &Cache<R> {
        &self.cache
    }
    pub fn remaining(&self) -> usize {
        self.trace.len()
    }
}

impl<R: Rng> SimComponent for TraceReplayer<R> {
    type SharedStatus = SimulationResult;
    fn update(
        &mut self,
        shared_status: &mut Self::SharedStatus,
        _current_cycle: usize,
    ) -> (bool, bool) {
        match self.trace.pop_front() {
            Some(Instruction { op, addr }) => {
                let result = self.cache.access(addr, op);
                shared_status.update(op, &result);
                (true, true)
            }
            None => (false, false),
        }
    }
}

/// replay the whole trace against `cache`
pub fn simulate<R: Rng>(
    cache: Cache<R>,
    trace: impl IntoIterator<Item = Instruction>,
) -> eyre::Result<SimulationResult> {
    let replayer = TraceReplayer::new(cache, trace);
    tracing::info!(
        accesses = replayer.remaining(),
        num_sets = replayer.cache().geometry().num_sets(),
        associativity = replayer.cache().geometry().associativity(),
        policy = %replayer.cache().policy(),
        "start simulation"
    );
    let mut sim_runner = SimRunner::new(replayer, SimulationResult::new());
    sim_runner.run()?;
    let (_, result, steps) = sim_runner.into_inner();
    tracing::info!(
        steps,
        load_count = result.load_count,
        load_misses = result.load_misses,
        store_count = result.store_count,
        store_misses = result.store_misses,
        total_cycles = result.total_cycles,
        "simulation done"
    );
    Ok(result)
}

/// build a fresh cache from `config` and replay `trace`,
/// a bad geometry fails before any access
pub fn run(
    config: &Config,
    trace: impl IntoIterator<Item = Instruction>,
) -> eyre::Result<SimulationResult> {
    let geometry = config.geometry()?;
    let cache = match config.seed {
        Some(seed) => Cache::with_seed(geometry, config.policy, seed),
        None => Cache::new(geometry, config.policy),
    };
    simulate(cache, trace)
}
