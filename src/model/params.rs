use serde::{Deserialize, Serialize};

use crate::math::dual::{Dual, ParamIndex};
use crate::model::stage::Stage;

/// Fixed epidemiological constants of the model. These are not calibrated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    // Age buckets: group <= child_upper_index is a child, <= adult_upper_index an adult,
    // everything above an elder.
    pub child_upper_index: u8,
    pub adult_upper_index: u8,
    pub mean_interactions: [u32; 3], // child, adult, elder

    pub susceptibility: Vec<f64>, // by age group
    pub infector: [f64; 5],       // by stage ordinal

    pub edge_attribute: f64,

    // Durations (ticks)
    pub exposed_to_infected_time: u32,
    pub infected_to_recovered_time: u32,

    // Latency distribution used by the infectiousness kernel
    pub latency_scale: f64,
    pub latency_rate: f64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            child_upper_index: 1,
            adult_upper_index: 6,
            mean_interactions: [2, 4, 3],
            susceptibility: vec![0.35, 0.69, 1.03, 1.03, 1.03, 1.03, 1.27, 1.52],
            infector: [0.0, 0.33, 0.72, 0.0, 0.0],
            edge_attribute: 1.0,
            exposed_to_infected_time: 3,
            infected_to_recovered_time: 5,
            latency_scale: 5.15,
            latency_rate: 2.14,
        }
    }
}

impl ModelConfig {
    pub fn check(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.child_upper_index <= self.adult_upper_index,
            "child_upper_index must be <= adult_upper_index"
        );
        anyhow::ensure!(
            self.mean_interactions.iter().all(|&m| m > 0),
            "mean_interactions must be > 0 for every age bucket"
        );
        anyhow::ensure!(!self.susceptibility.is_empty(), "susceptibility table is empty");
        anyhow::ensure!(
            self.susceptibility.iter().all(|s| s.is_finite() && *s >= 0.0),
            "susceptibility must be finite and >= 0"
        );
        anyhow::ensure!(
            self.infector.iter().all(|w| w.is_finite() && *w >= 0.0),
            "infector weights must be finite and >= 0"
        );
        anyhow::ensure!(
            self.edge_attribute.is_finite() && self.edge_attribute >= 0.0,
            "edge_attribute must be finite and >= 0"
        );
        anyhow::ensure!(self.infected_to_recovered_time >= 1, "infected_to_recovered_time must be >= 1");
        anyhow::ensure!(
            self.latency_scale > 0.0 && self.latency_rate > 0.0,
            "latency_scale and latency_rate must be > 0"
        );
        Ok(())
    }

    pub fn mean_interactions_for(&self, age_group: u8) -> u32 {
        if age_group <= self.child_upper_index {
            self.mean_interactions[0]
        } else if age_group <= self.adult_upper_index {
            self.mean_interactions[1]
        } else {
            self.mean_interactions[2]
        }
    }

    pub fn susceptibility_for(&self, age_group: u8) -> anyhow::Result<f64> {
        self.susceptibility.get(age_group as usize).copied().ok_or_else(|| {
            anyhow::anyhow!(
                "age group {} has no susceptibility entry (table has {})",
                age_group,
                self.susceptibility.len()
            )
        })
    }

    pub fn infector_weight(&self, stage: Stage) -> f64 {
        self.infector[stage.ordinal()]
    }
}

/// The calibrated parameters. Owned by the caller and lent to a simulation for the
/// duration of one run; the simulation only reads them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SharedParameters {
    pub initial_infection_rate: f64,
    pub mortality_rate: f64,
    pub r0: f64,
}

impl Default for SharedParameters {
    fn default() -> Self {
        Self {
            initial_infection_rate: 0.05,
            mortality_rate: 0.1,
            r0: 5.18,
        }
    }
}

impl SharedParameters {
    pub fn check(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.initial_infection_rate),
            "initial_infection_rate must be in [0, 1] (got {})",
            self.initial_infection_rate
        );
        anyhow::ensure!(
            (0.0..=1.0).contains(&self.mortality_rate),
            "mortality_rate must be in [0, 1] (got {})",
            self.mortality_rate
        );
        anyhow::ensure!(self.r0.is_finite() && self.r0 >= 0.0, "r0 must be finite and >= 0");
        Ok(())
    }

    /// Parameters seeded as differentiation inputs, one tangent slot each.
    pub fn as_duals(&self) -> ParamDuals {
        ParamDuals {
            initial_infection_rate: Dual::variable(self.initial_infection_rate, ParamIndex::InitialInfectionRate),
            mortality_rate: Dual::variable(self.mortality_rate, ParamIndex::MortalityRate),
            r0: Dual::variable(self.r0, ParamIndex::R0),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParamDuals {
    pub initial_infection_rate: Dual,
    pub mortality_rate: Dual,
    pub r0: Dual,
}
