use std::time::Instant;

use episim::io::contact_synth::{synthetic_age_groups, synthetic_contact_edges};
use episim::{ContactGraph, ModelConfig, RunSettings, Seeding, SharedParameters, Simulation};

fn run(n: usize, threads: usize) -> anyhow::Result<(f64, f64)> {
    let mut graph = ContactGraph::with_agents(n);
    graph.build_from_edges(synthetic_contact_edges(n, 5));
    let age_groups = synthetic_age_groups(n, 8);
    let params = SharedParameters::default();
    let settings = RunSettings {
        steps: 50,
        seed: Some(1),
        worker_threads: threads,
        temperature: 1.0,
    };

    let t_start = Instant::now();
    let sim = Simulation::new(ModelConfig::default(), &params, graph, &age_groups, &settings, Seeding::Relaxed)?;
    let outcome = sim.run()?;
    Ok((t_start.elapsed().as_secs_f64() * 1000.0, outcome.deaths.re))
}

fn main() -> anyhow::Result<()> {
    // Larger population to make the exposure phase dominate
    let n = 200_000;

    let (single_ms, d1) = run(n, 1)?;
    let (multi_ms, d4) = run(n, 4)?;
    anyhow::ensure!(d1 == d4, "thread count changed the result ({} vs {})", d1, d4);

    println!("single_ms,parallel_ms,speedup_x");
    println!("{:.3},{:.3},{:.2}", single_ms, multi_ms, single_ms.max(1e-9) / multi_ms.max(1e-9));
    Ok(())
}
