use serde::{Deserialize, Serialize};

/// Disease stage of one agent. The discriminants are the ordinals used by the
/// numeric stage encoding (0..=4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Susceptible = 0,
    Exposed = 1,
    Infected = 2,
    Recovered = 3,
    Mortality = 4,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Susceptible,
        Stage::Exposed,
        Stage::Infected,
        Stage::Recovered,
        Stage::Mortality,
    ];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    pub fn from_ordinal(ordinal: usize) -> Option<Stage> {
        Stage::ALL.get(ordinal).copied()
    }

    /// Recovered and Mortality never change again.
    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Recovered | Stage::Mortality)
    }

    /// Stages whose members can transmit to susceptible neighbours.
    pub fn is_infectious(self) -> bool {
        matches!(self, Stage::Exposed | Stage::Infected)
    }

    /// Stages that carry a finite scheduled transition time.
    pub fn is_timed(self) -> bool {
        self.is_infectious()
    }
}

/// Per-stage head count, indexed by ordinal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCounts(pub [usize; 5]);

impl StageCounts {
    pub fn tally(stages: &[Stage]) -> Self {
        let mut counts = [0usize; 5];
        for s in stages {
            counts[s.ordinal()] += 1;
        }
        Self(counts)
    }

    pub fn get(&self, stage: Stage) -> usize {
        self.0[stage.ordinal()]
    }

    pub fn total(&self) -> usize {
        self.0.iter().sum()
    }
}
