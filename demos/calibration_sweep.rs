use episim::calibration::{evaluate_candidate, ParameterBounds};
use episim::io::contact_synth::{synthetic_age_groups, synthetic_contact_edges};
use episim::{ContactGraph, ModelConfig, RunSettings, SharedParameters};

fn main() -> anyhow::Result<()> {
    let n = 1_000;
    let mut graph = ContactGraph::with_agents(n);
    graph.build_from_edges(synthetic_contact_edges(n, 2));
    let age_groups = synthetic_age_groups(n, 8);
    let cfg = ModelConfig::default();
    let settings = RunSettings {
        steps: 40,
        seed: Some(11),
        ..RunSettings::default()
    };

    let bounds = ParameterBounds::default();
    let target_deaths = 25.0;
    let mut params = SharedParameters::default();

    // Coarse grid over the raw outputs a calibration network would emit.
    println!("initial_infection_rate,mortality_rate,deaths,loss,dloss_dinitial,dloss_dmortality");
    for i in 0..=4 {
        for j in 0..=4 {
            bounds.apply([i as f64 / 4.0, j as f64 / 4.0], &mut params);
            let eval = evaluate_candidate(&cfg, &params, &graph, &age_groups, &settings, target_deaths)?;
            let [g0, g1] = eval.loss_gradient();
            println!(
                "{:.4},{:.4},{:.3},{:.3},{:.3},{:.3}",
                params.initial_infection_rate, params.mortality_rate, eval.deaths.re, eval.loss.re, g0, g1
            );
        }
    }
    Ok(())
}
