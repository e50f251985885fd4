use serde::{Deserialize, Serialize};

use crate::io::optimized_params::OptimizedParameters;
use crate::math::dual::{Dual, ParamIndex};
use crate::model::graph::ContactGraph;
use crate::model::params::{ModelConfig, SharedParameters};
use crate::model::simulation::{RunSettings, Seeding, Simulation};

/// Box the calibration network's [0, 1] outputs are mapped into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub initial_infection_rate: (f64, f64),
    pub mortality_rate: (f64, f64),
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            initial_infection_rate: (0.001, 0.9),
            mortality_rate: (0.01, 0.9),
        }
    }
}

impl ParameterBounds {
    /// `lower + (upper - lower) * raw`, with `raw` clamped to [0, 1].
    pub fn map(&self, raw: [f64; 2]) -> [f64; 2] {
        let lerp = |(lo, hi): (f64, f64), x: f64| lo + (hi - lo) * x.clamp(0.0, 1.0);
        [
            lerp(self.initial_infection_rate, raw[0]),
            lerp(self.mortality_rate, raw[1]),
        ]
    }

    /// d(bounded)/d(raw) per output; the harness chains this into its own backward pass.
    pub fn jacobian_diag(&self) -> [f64; 2] {
        [
            self.initial_infection_rate.1 - self.initial_infection_rate.0,
            self.mortality_rate.1 - self.mortality_rate.0,
        ]
    }

    pub fn apply(&self, raw: [f64; 2], params: &mut SharedParameters) {
        let [iir, mr] = self.map(raw);
        params.initial_infection_rate = iir;
        params.mortality_rate = mr;
    }
}

/// Squared error of one observation against the simulated deaths.
pub fn squared_error(target: f64, predicted: Dual) -> Dual {
    let diff = predicted - target;
    diff * diff
}

#[derive(Debug, Clone, Copy)]
pub struct CandidateEvaluation {
    pub deaths: Dual,
    pub loss: Dual,
}

impl CandidateEvaluation {
    /// Loss gradient with respect to the two calibrated parameters.
    pub fn loss_gradient(&self) -> [f64; 2] {
        [
            self.loss.grad(ParamIndex::InitialInfectionRate),
            self.loss.grad(ParamIndex::MortalityRate),
        ]
    }

    pub fn to_optimized(&self, params: &SharedParameters) -> OptimizedParameters {
        OptimizedParameters {
            initial_infection_rate: params.initial_infection_rate,
            mortality_rate: params.mortality_rate,
            loss: self.loss.re,
        }
    }
}

/// Run one simulation for the current contents of `params` and score it.
pub fn evaluate_candidate(
    cfg: &ModelConfig,
    params: &SharedParameters,
    graph: &ContactGraph,
    age_groups: &[u8],
    settings: &RunSettings,
    target_deaths: f64,
) -> anyhow::Result<CandidateEvaluation> {
    let sim = Simulation::new(
        cfg.clone(),
        params,
        graph.clone(),
        age_groups,
        settings,
        Seeding::Relaxed,
    )?;
    let outcome = sim.run()?;
    Ok(CandidateEvaluation {
        deaths: outcome.deaths,
        loss: squared_error(target_deaths, outcome.deaths),
    })
}
