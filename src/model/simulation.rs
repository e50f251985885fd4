use anyhow::Context;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::math::dual::Dual;
use crate::math::gumbel::RelaxedCategorical;
use crate::model::engine::StageEngine;
use crate::model::exposure::{ExposureBuffer, ExposureContext};
use crate::model::graph::ContactGraph;
use crate::model::kernel::InfectiousnessKernel;
use crate::model::params::{ModelConfig, SharedParameters};
use crate::model::population::{build_profiles, AgentProfile, PopulationState};
use crate::model::stage::{Stage, StageCounts};

/// Run-level knobs that are not part of the epidemiological model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    pub steps: u32,
    pub seed: Option<u64>,
    pub worker_threads: usize,
    pub temperature: f64,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            steps: 100,
            seed: None,
            worker_threads: 1,
            temperature: 1.0,
        }
    }
}

/// How the initial stages are chosen.
#[derive(Debug, Clone)]
pub enum Seeding {
    /// Relaxed draw with the initial infection rate.
    Relaxed,
    /// Caller-provided state.
    Explicit(PopulationState),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickSummary {
    pub tick: u64,
    pub counts: StageCounts,
    pub newly_exposed: usize,
    pub newly_infected: usize,
    pub newly_recovered: usize,
    pub newly_dead: usize,
    pub deaths: f64,
}

/// Everything a finished run hands back to the caller.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub deaths: Dual,
    pub stages: Vec<Stage>,
    pub next_transition: Vec<u64>,
    pub exposure_derivatives: Vec<Dual>,
    pub timeline: Vec<TickSummary>,
}

/// Drives the two-phase tick: a data-parallel exposure phase over all agents,
/// then a single whole-population stage update.
pub struct Simulation<'p> {
    cfg: ModelConfig,
    params: &'p SharedParameters,
    graph: ContactGraph,
    profiles: Vec<AgentProfile>,
    kernel: InfectiousnessKernel,
    sampler: RelaxedCategorical,
    state: PopulationState,
    exposure: ExposureBuffer,
    exposure_derivatives: Vec<Dual>,
    deaths: Dual,
    steps: u32,
    tick: u64,
    rng: ChaCha8Rng,
    pool: Option<rayon::ThreadPool>,
}

impl<'p> Simulation<'p> {
    pub fn new(
        cfg: ModelConfig,
        params: &'p SharedParameters,
        graph: ContactGraph,
        age_groups: &[u8],
        settings: &RunSettings,
        seeding: Seeding,
    ) -> anyhow::Result<Self> {
        cfg.check()?;
        params.check()?;
        let population = age_groups.len();
        anyhow::ensure!(population > 0, "population is empty");
        anyhow::ensure!(
            graph.population() == population,
            "contact graph sized for {} agents, population has {}",
            graph.population(),
            population
        );

        let profiles = build_profiles(&cfg, age_groups)?;
        let kernel = InfectiousnessKernel::new(&cfg, settings.steps)?;
        let sampler = RelaxedCategorical::new(settings.temperature)?;
        let seed = match settings.seed {
            Some(seed) => seed,
            None => {
                let seed = rand::random::<u64>();
                debug!(seed, "no seed configured, drew one");
                seed
            }
        };
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let state = match seeding {
            Seeding::Relaxed => PopulationState::seed_relaxed(
                population,
                settings.steps,
                &cfg,
                &params.as_duals(),
                &sampler,
                &mut rng,
            )?,
            Seeding::Explicit(state) => {
                anyhow::ensure!(
                    state.len() == population,
                    "seeded state holds {} agents, population has {}",
                    state.len(),
                    population
                );
                anyhow::ensure!(
                    state.infinity() == crate::model::population::infinity_for(settings.steps),
                    "seeded state was built for a different step count"
                );
                state
            }
        };

        let pool = if settings.worker_threads > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(settings.worker_threads)
                .build()
                .context("build exposure thread pool")?;
            Some(pool)
        } else {
            None
        };

        let counts = state.counts();
        debug!(
            population,
            infected = counts.get(Stage::Infected),
            edges = graph.edge_count(),
            "simulation initialised"
        );

        Ok(Self {
            cfg,
            params,
            graph,
            profiles,
            kernel,
            sampler,
            exposure: ExposureBuffer::new(population),
            exposure_derivatives: vec![Dual::ZERO; population],
            state,
            deaths: Dual::ZERO,
            steps: settings.steps,
            tick: 0,
            rng,
            pool,
        })
    }

    /// Run one tick. Returns `None` once all steps are done.
    pub fn step(&mut self) -> anyhow::Result<Option<TickSummary>> {
        if self.tick >= u64::from(self.steps) {
            return Ok(None);
        }
        let tick = self.tick + 1;
        let duals = self.params.as_duals();

        // Phase 1: every agent reads the committed arrays, writes its own slot.
        let tick_seed: u64 = self.rng.gen();
        let ctx = ExposureContext {
            graph: &self.graph,
            profiles: &self.profiles,
            kernel: &self.kernel,
            cfg: &self.cfg,
            r0: duals.r0,
        };
        self.exposure.clear();
        ctx.run_phase(&self.state, tick, tick_seed, &mut self.exposure, self.pool.as_ref());
        for (d, slot) in self.exposure_derivatives.iter_mut().zip(self.exposure.slots()) {
            if slot.exposed {
                *d = slot.derivative;
            }
        }

        // Phase 2: one authoritative update over the whole population.
        let engine = StageEngine::new(&self.cfg, self.sampler);
        let update = engine.advance(
            &mut self.state,
            &mut self.exposure,
            tick,
            duals.mortality_rate,
            &mut self.deaths,
            &mut self.rng,
        )?;
        self.tick = tick;

        let summary = TickSummary {
            tick,
            counts: self.state.counts(),
            newly_exposed: update.newly_exposed,
            newly_infected: update.newly_infected,
            newly_recovered: update.newly_recovered,
            newly_dead: update.newly_dead,
            deaths: self.deaths.re,
        };
        debug!(
            tick,
            exposed = summary.newly_exposed,
            infected = summary.newly_infected,
            recovered = summary.newly_recovered,
            dead = summary.newly_dead,
            deaths = summary.deaths,
            "tick committed"
        );
        Ok(Some(summary))
    }

    /// Run the remaining ticks and hand back the results.
    pub fn run(mut self) -> anyhow::Result<RunOutcome> {
        let mut timeline = Vec::with_capacity(self.steps as usize);
        while let Some(summary) = self.step()? {
            timeline.push(summary);
        }
        let counts = self.state.counts();
        info!(
            ticks = self.tick,
            deaths = self.deaths.re,
            recovered = counts.get(Stage::Recovered),
            mortality = counts.get(Stage::Mortality),
            "run complete"
        );
        Ok(RunOutcome {
            deaths: self.deaths,
            stages: self.state.stages,
            next_transition: self.state.next_transition,
            exposure_derivatives: self.exposure_derivatives,
            timeline,
        })
    }

    pub fn state(&self) -> &PopulationState {
        &self.state
    }

    pub fn deaths(&self) -> Dual {
        self.deaths
    }

    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    pub fn graph(&self) -> &ContactGraph {
        &self.graph
    }

    pub fn kernel(&self) -> &InfectiousnessKernel {
        &self.kernel
    }

    pub fn profiles(&self) -> &[AgentProfile] {
        &self.profiles
    }
}
