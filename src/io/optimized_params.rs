use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::model::params::SharedParameters;

/// Best parameters found by the calibration harness, with the loss they achieved.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OptimizedParameters {
    #[serde(rename = "InitialInfectionRate")]
    pub initial_infection_rate: f64,
    #[serde(rename = "MortalityRate")]
    pub mortality_rate: f64,
    #[serde(rename = "Loss")]
    pub loss: f64,
}

impl OptimizedParameters {
    /// Strictly lower loss than what is stored.
    pub fn improves_on(&self, previous: Option<&OptimizedParameters>) -> bool {
        previous.map_or(true, |p| self.loss < p.loss)
    }

    /// Overwrite the calibrated fields of `params`, leaving R0 as is.
    pub fn apply_to(&self, params: &mut SharedParameters) {
        params.initial_infection_rate = self.initial_infection_rate;
        params.mortality_rate = self.mortality_rate;
    }
}

/// Read the `;`-separated file (one header line, one data line).
pub fn read_optimized_parameters(path: impl AsRef<std::path::Path>) -> anyhow::Result<OptimizedParameters> {
    let path = path.as_ref();
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("Failed to open optimized parameters: {:?}", path))?;
    let row = rdr
        .deserialize::<OptimizedParameters>()
        .next()
        .with_context(|| format!("optimized parameters file {:?} has no data line", path))?
        .with_context(|| format!("optimized parameters file {:?} is malformed", path))?;
    Ok(row)
}

/// `Ok(None)` when the file does not exist yet.
pub fn read_optimized_parameters_opt(path: impl AsRef<std::path::Path>) -> anyhow::Result<Option<OptimizedParameters>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }
    read_optimized_parameters(path).map(Some)
}

pub fn write_optimized_parameters(path: impl AsRef<std::path::Path>, best: &OptimizedParameters) -> anyhow::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("create dir failed: {:?}", parent))?;
    }
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .with_context(|| format!("Failed to create optimized parameters: {:?}", path))?;
    wtr.serialize(best)?;
    wtr.flush()?;
    Ok(())
}
