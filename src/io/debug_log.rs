use anyhow::Context;

use crate::model::simulation::TickSummary;
use crate::model::stage::Stage;

/// Write a `key=value` header followed by the per-tick CSV timeline.
pub fn write_run_log(
    out_dir: impl AsRef<std::path::Path>,
    run_id: &str,
    agent_count: usize,
    steps: u32,
    initial_infection_rate: f64,
    mortality_rate: f64,
    r0: f64,
    timeline: &[TickSummary],
) -> anyhow::Result<std::path::PathBuf> {
    use std::io::Write;

    std::fs::create_dir_all(out_dir.as_ref()).context("create logs dir failed")?;
    let path = out_dir.as_ref().join(format!("episim_{}.txt", run_id));
    let mut f = std::fs::File::create(&path)
        .with_context(|| format!("create run log file failed (path={:?})", path))?;

    writeln!(f, "run_id={}", run_id)?;
    writeln!(f, "agent_count={}", agent_count)?;
    writeln!(f, "steps={}", steps)?;
    writeln!(f, "initial_infection_rate={:.6}", initial_infection_rate)?;
    writeln!(f, "mortality_rate={:.6}", mortality_rate)?;
    writeln!(f, "r0={:.6}", r0)?;
    writeln!(f)?;
    writeln!(f, "tick,susceptible,exposed,infected,recovered,mortality,deaths")?;

    let mut last_deaths = 0.0;
    for s in timeline {
        anyhow::ensure!(s.deaths >= last_deaths, "deaths decreased at tick {}", s.tick);
        last_deaths = s.deaths;
        writeln!(
            f,
            "{},{},{},{},{},{},{:.6}",
            s.tick,
            s.counts.get(Stage::Susceptible),
            s.counts.get(Stage::Exposed),
            s.counts.get(Stage::Infected),
            s.counts.get(Stage::Recovered),
            s.counts.get(Stage::Mortality),
            s.deaths
        )?;
    }

    Ok(path)
}
