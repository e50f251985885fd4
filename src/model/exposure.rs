use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::math::dual::Dual;
use crate::model::graph::ContactGraph;
use crate::model::kernel::InfectiousnessKernel;
use crate::model::params::ModelConfig;
use crate::model::population::{AgentProfile, PopulationState};
use crate::model::stage::Stage;

/// Result of one agent's exposure evaluation for the current tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ExposureOutcome {
    pub exposed: bool,
    /// `sum_k (1 / p_k) * prod_j p_j` over the accepted trial(s) k, with the product
    /// running over every trial the agent evaluated. Zero when not exposed.
    pub derivative: Dual,
}

/// Tick-scoped exposure slots, one per agent.
#[derive(Debug, Clone)]
pub struct ExposureBuffer {
    slots: Vec<ExposureOutcome>,
}

impl ExposureBuffer {
    pub fn new(population: usize) -> Self {
        Self { slots: vec![ExposureOutcome::default(); population] }
    }

    pub fn clear(&mut self) {
        self.slots.fill(ExposureOutcome::default());
    }

    pub fn is_exposed(&self, index: usize) -> bool {
        self.slots[index].exposed
    }

    pub fn slots(&self) -> &[ExposureOutcome] {
        &self.slots
    }

    pub fn slots_mut(&mut self) -> &mut [ExposureOutcome] {
        &mut self.slots
    }

    pub fn exposed_count(&self) -> usize {
        self.slots.iter().filter(|s| s.exposed).count()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Read-only inputs shared by every agent during the exposure phase.
pub struct ExposureContext<'a> {
    pub graph: &'a ContactGraph,
    pub profiles: &'a [AgentProfile],
    pub kernel: &'a InfectiousnessKernel,
    pub cfg: &'a ModelConfig,
    pub r0: Dual,
}

impl ExposureContext<'_> {
    /// Transmission probability along the edge from `neighbor` to `agent`.
    pub fn edge_probability(&self, state: &PopulationState, agent: usize, neighbor: usize, tick: u64) -> Dual {
        let profile = &self.profiles[agent];
        let infector = self.cfg.infector_weight(state.stages[neighbor]);
        let elapsed = (tick as i64 - state.infected_time[neighbor]).unsigned_abs();
        let integral = self.kernel.weight(elapsed);
        self.r0 * (profile.susceptibility * infector * self.cfg.edge_attribute * integral
            / f64::from(profile.mean_interactions))
    }

    /// Evaluate one agent. Only susceptible agents are considered; the scan stops at
    /// the first successful trial.
    pub fn evaluate_agent<R: Rng + ?Sized>(
        &self,
        state: &PopulationState,
        agent: usize,
        tick: u64,
        rng: &mut R,
    ) -> ExposureOutcome {
        if state.stages[agent] != Stage::Susceptible {
            return ExposureOutcome::default();
        }
        let mut product = Dual::ONE;
        for &neighbor in self.graph.neighbors(agent) {
            if !state.stages[neighbor].is_infectious() {
                continue;
            }
            let p = self.edge_probability(state, agent, neighbor, tick);
            product *= p;
            if rng.gen::<f64>() < p.re {
                return ExposureOutcome {
                    exposed: true,
                    derivative: product / p,
                };
            }
        }
        ExposureOutcome::default()
    }

    /// Evaluate every agent, each writing only its own slot. Agent `i` draws from
    /// stream `i` of a generator seeded with `tick_seed`, so the outcome does not
    /// depend on how the work is split across threads. Without a pool the phase runs
    /// on the calling thread.
    pub fn run_phase(
        &self,
        state: &PopulationState,
        tick: u64,
        tick_seed: u64,
        buffer: &mut ExposureBuffer,
        pool: Option<&rayon::ThreadPool>,
    ) {
        let eval = |(i, slot): (usize, &mut ExposureOutcome)| {
            let mut rng = agent_rng(tick_seed, i);
            *slot = self.evaluate_agent(state, i, tick, &mut rng);
        };
        match pool {
            Some(pool) => pool.install(|| buffer.slots_mut().par_iter_mut().enumerate().for_each(eval)),
            None => buffer.slots_mut().iter_mut().enumerate().for_each(eval),
        }
    }
}

pub fn agent_rng(tick_seed: u64, agent: usize) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(tick_seed);
    rng.set_stream(agent as u64);
    rng
}
