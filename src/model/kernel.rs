use statrs::distribution::{ContinuousCDF, Gamma};

use crate::model::params::ModelConfig;

/// Extra entries past the run length so lookups for seeds that became infectious
/// before tick 0 stay in range.
pub const KERNEL_PADDING: usize = 10;

/// Probability mass of the latency distribution per elapsed tick.
///
/// Entry `k` holds `CDF(k + 1) - CDF(k)` of a gamma distribution derived from the
/// configured latency scale and rate.
#[derive(Debug, Clone)]
pub struct InfectiousnessKernel {
    table: Vec<f64>,
}

impl InfectiousnessKernel {
    pub fn new(cfg: &ModelConfig, steps: u32) -> anyhow::Result<Self> {
        // Moment-style reparametrisation: b = rate^2 / scale, a = scale / b.
        let b = cfg.latency_rate * cfg.latency_rate / cfg.latency_scale;
        let a = cfg.latency_scale / b;
        let gamma = Gamma::new(a, b)
            .map_err(|e| anyhow::anyhow!("invalid latency distribution (shape={a}, rate={b}): {e}"))?;

        let len = steps as usize + KERNEL_PADDING;
        let table = (1..=len)
            .map(|t| gamma.cdf(t as f64) - gamma.cdf((t - 1) as f64))
            .collect();
        Ok(Self { table })
    }

    /// Weight for `elapsed` ticks since the neighbour's infection timestamp.
    /// Out-of-range lookups weigh zero.
    pub fn weight(&self, elapsed: u64) -> f64 {
        usize::try_from(elapsed)
            .ok()
            .and_then(|i| self.table.get(i).copied())
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.table
    }
}
