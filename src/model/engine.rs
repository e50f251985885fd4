use rand::Rng;

use crate::math::dual::Dual;
use crate::math::gumbel::RelaxedCategorical;
use crate::model::exposure::ExposureBuffer;
use crate::model::params::ModelConfig;
use crate::model::population::PopulationState;
use crate::model::stage::Stage;

/// Offset subtracted from the Exposed -> Infected delay of freshly exposed agents.
/// Fresh exposures become infectious at `tick + 1 + E2I - FRESH_EXPOSURE_OFFSET`.
pub const FRESH_EXPOSURE_OFFSET: u64 = 0;

/// What one global update produced.
#[derive(Debug, Clone, Copy, Default)]
pub struct StageUpdate {
    pub deaths: Dual,
    pub newly_exposed: usize,
    pub newly_infected: usize,
    pub newly_recovered: usize,
    pub newly_dead: usize,
}

/// Whole-population stage advance. Reads only the previous arrays and the exposure
/// buffer, then commits the next arrays in one swap.
pub struct StageEngine<'a> {
    cfg: &'a ModelConfig,
    sampler: RelaxedCategorical,
}

impl<'a> StageEngine<'a> {
    pub fn new(cfg: &'a ModelConfig, sampler: RelaxedCategorical) -> Self {
        Self { cfg, sampler }
    }

    /// Advance every agent by one tick and add this tick's expected deaths to
    /// `deaths`. Clears `exposure` on return.
    pub fn advance<R: Rng + ?Sized>(
        &self,
        state: &mut PopulationState,
        exposure: &mut ExposureBuffer,
        tick: u64,
        mortality_rate: Dual,
        deaths: &mut Dual,
        rng: &mut R,
    ) -> anyhow::Result<StageUpdate> {
        let n = state.len();
        anyhow::ensure!(
            exposure.len() == n,
            "exposure buffer holds {} slots for {} agents",
            exposure.len(),
            n
        );

        let infinity = state.infinity();
        let i2r = u64::from(self.cfg.infected_to_recovered_time);
        let fresh_time = tick + 1 + u64::from(self.cfg.exposed_to_infected_time) - FRESH_EXPOSURE_OFFSET;

        let mut next_stages = Vec::with_capacity(n);
        let mut next_times = Vec::with_capacity(n);
        let mut next_weights = Vec::with_capacity(n);
        let mut update = StageUpdate::default();
        let mut tick_deaths = Dual::ZERO;

        for i in 0..n {
            let stage = state.stages[i];
            let due = state.next_transition[i] <= tick;
            let weight = state.weights[i];

            let (mut stage_next, mut time_next, mut weight_next) = match stage {
                Stage::Susceptible | Stage::Recovered | Stage::Mortality => {
                    (stage, state.next_transition[i], weight)
                }
                Stage::Exposed if due => {
                    update.newly_infected += 1;
                    (Stage::Infected, tick + i2r, weight)
                }
                Stage::Exposed => (Stage::Exposed, state.next_transition[i], weight),
                // Deaths are the expected toll of the elapsed infection; the relaxed
                // draw only picks the terminal stage. Terminal agents keep their weight.
                Stage::Infected if due => {
                    tick_deaths += weight * mortality_rate;
                    let (dies, _, _) = self.sampler.bernoulli(mortality_rate, rng);
                    if dies {
                        update.newly_dead += 1;
                        (Stage::Mortality, infinity, weight)
                    } else {
                        update.newly_recovered += 1;
                        (Stage::Recovered, infinity, weight)
                    }
                }
                Stage::Infected => (Stage::Infected, state.next_transition[i], weight),
            };

            if exposure.is_exposed(i) {
                update.newly_exposed += 1;
                stage_next = Stage::Exposed;
                time_next = fresh_time;
                weight_next = Dual::ONE;
                state.infected_time[i] = tick as i64;
            }

            next_stages.push(stage_next);
            next_times.push(time_next);
            next_weights.push(weight_next);
        }

        state.stages = next_stages;
        state.next_transition = next_times;
        state.weights = next_weights;
        *deaths += tick_deaths;
        exposure.clear();

        update.deaths = tick_deaths;
        Ok(update)
    }
}
