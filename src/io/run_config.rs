use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::model::params::{ModelConfig, SharedParameters};
use crate::model::simulation::RunSettings;

/// Top-level JSON run configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub agent_count: usize,
    #[serde(flatten)]
    pub run: RunSettings,

    pub contact_edges_path: String,
    #[serde(default)]
    pub age_groups_path: Option<String>,
    #[serde(default)]
    pub optimized_parameters_path: Option<String>,

    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub parameters: SharedParameters,
}

impl RunConfig {
    pub fn check(&self) -> anyhow::Result<()> {
        anyhow::ensure!(self.agent_count > 0, "agent_count must be > 0");
        anyhow::ensure!(
            self.run.temperature.is_finite() && self.run.temperature > 0.0,
            "temperature must be finite and > 0"
        );
        self.model.check().context("invalid model config")?;
        self.parameters.check().context("invalid parameters")?;
        Ok(())
    }
}

pub fn load_run_config(path: &str) -> anyhow::Result<RunConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read run config: {}", path))?;
    let cfg: RunConfig = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse run config: {}", path))?;
    cfg.check()?;
    Ok(cfg)
}
