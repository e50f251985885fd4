use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::math::dual::Dual;
use crate::math::gumbel::RelaxedCategorical;
use crate::model::params::{ModelConfig, ParamDuals};
use crate::model::stage::{Stage, StageCounts};

/// Per-agent constants derived once from the age group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentProfile {
    pub age_group: u8,
    pub mean_interactions: u32,
    pub susceptibility: f64,
}

impl AgentProfile {
    pub fn from_age_group(cfg: &ModelConfig, age_group: u8) -> anyhow::Result<Self> {
        let mean_interactions = cfg.mean_interactions_for(age_group);
        anyhow::ensure!(mean_interactions > 0, "age group {} has zero mean interactions", age_group);
        Ok(Self {
            age_group,
            mean_interactions,
            susceptibility: cfg.susceptibility_for(age_group)?,
        })
    }
}

/// Build one profile per agent; agent `i` gets `age_groups[i]`.
pub fn build_profiles(cfg: &ModelConfig, age_groups: &[u8]) -> anyhow::Result<Vec<AgentProfile>> {
    anyhow::ensure!(!age_groups.is_empty(), "population is empty");
    age_groups
        .iter()
        .enumerate()
        .map(|(i, &g)| {
            AgentProfile::from_age_group(cfg, g).map_err(|e| e.context(format!("agent {}", i)))
        })
        .collect()
}

/// Structure-of-arrays state of the whole population.
///
/// Only Exposed and Infected agents hold a scheduled tick in `next_transition`;
/// every other agent holds the `infinity` sentinel (`steps + 1`). A scheduled tick
/// past the last step simply never fires.
#[derive(Debug, Clone)]
pub struct PopulationState {
    pub stages: Vec<Stage>,
    pub next_transition: Vec<u64>,
    /// Tick of exposure; seeds that start infectious sit before tick 0.
    pub infected_time: Vec<i64>,
    /// Straight-through surrogate per agent (value 1). Deaths are weighted by it.
    pub weights: Vec<Dual>,
    infinity: u64,
}

impl PopulationState {
    /// Explicitly seeded stages. Timestamps follow the seeding convention: Exposed
    /// leaves at `E2I + 1`, Infected at `I2R + 1`.
    pub fn from_stages(stages: Vec<Stage>, steps: u32, cfg: &ModelConfig) -> anyhow::Result<Self> {
        anyhow::ensure!(!stages.is_empty(), "population is empty");
        let infinity = infinity_for(steps);
        let next_transition = stages
            .iter()
            .map(|s| initial_transition(*s, cfg, infinity))
            .collect();
        let infected_time = stages
            .iter()
            .map(|s| initial_infected_time(*s, cfg, infinity))
            .collect();
        let weights = vec![Dual::ONE; stages.len()];
        Ok(Self { stages, next_transition, infected_time, weights, infinity })
    }

    /// Draw each agent's initial stage with the relaxed sampler: with probability
    /// `initial_infection_rate` the agent starts Infected, otherwise Susceptible.
    /// Infected seeds keep the straight-through component of their draw as weight.
    pub fn seed_relaxed<R: Rng + ?Sized>(
        population: usize,
        steps: u32,
        cfg: &ModelConfig,
        params: &ParamDuals,
        sampler: &RelaxedCategorical,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        anyhow::ensure!(population > 0, "population is empty");
        let mut stages = Vec::with_capacity(population);
        let mut seed_weights = Vec::with_capacity(population);
        for _ in 0..population {
            let (infected, w, _) = sampler.bernoulli(params.initial_infection_rate, rng);
            if infected {
                stages.push(Stage::Infected);
                seed_weights.push(w);
            } else {
                stages.push(Stage::Susceptible);
                seed_weights.push(Dual::ONE);
            }
        }
        let mut state = Self::from_stages(stages, steps, cfg)?;
        state.weights = seed_weights;
        Ok(state)
    }

    /// Fully explicit construction. Exposed and Infected agents need a scheduled tick,
    /// every other stage must hold the `infinity` sentinel.
    pub fn from_parts(
        stages: Vec<Stage>,
        next_transition: Vec<u64>,
        infected_time: Vec<i64>,
        steps: u32,
    ) -> anyhow::Result<Self> {
        let n = stages.len();
        anyhow::ensure!(n > 0, "population is empty");
        anyhow::ensure!(
            next_transition.len() == n && infected_time.len() == n,
            "array length mismatch: stages={}, next_transition={}, infected_time={}",
            n,
            next_transition.len(),
            infected_time.len()
        );
        let infinity = infinity_for(steps);
        for (i, (s, t)) in stages.iter().zip(&next_transition).enumerate() {
            anyhow::ensure!(
                s.is_timed() == (*t != infinity),
                "agent {}: stage {:?} inconsistent with transition time {}",
                i,
                s,
                t
            );
        }
        Ok(Self {
            stages,
            next_transition,
            infected_time,
            weights: vec![Dual::ONE; n],
            infinity,
        })
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn infinity(&self) -> u64 {
        self.infinity
    }

    pub fn counts(&self) -> StageCounts {
        StageCounts::tally(&self.stages)
    }
}

pub fn infinity_for(steps: u32) -> u64 {
    u64::from(steps) + 1
}

fn initial_transition(stage: Stage, cfg: &ModelConfig, infinity: u64) -> u64 {
    match stage {
        Stage::Exposed => u64::from(cfg.exposed_to_infected_time) + 1,
        Stage::Infected => u64::from(cfg.infected_to_recovered_time) + 1,
        Stage::Susceptible | Stage::Recovered | Stage::Mortality => infinity,
    }
}

fn initial_infected_time(stage: Stage, cfg: &ModelConfig, infinity: u64) -> i64 {
    match stage {
        Stage::Exposed => 0,
        Stage::Infected => 1 - i64::from(cfg.exposed_to_infected_time),
        Stage::Susceptible | Stage::Recovered | Stage::Mortality => infinity as i64,
    }
}
