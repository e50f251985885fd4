use episim::io::contact_synth::{synthetic_age_groups, synthetic_contact_edges};
use episim::model::stage::Stage;
use episim::{ContactGraph, ModelConfig, ParamIndex, RunSettings, Seeding, SharedParameters, Simulation};

fn main() -> anyhow::Result<()> {
    // Toy ring population; swap in load_contact_graph for a real edge file.
    let n = 2_000;
    let mut graph = ContactGraph::with_agents(n);
    graph.build_from_edges(synthetic_contact_edges(n, 3));
    let age_groups = synthetic_age_groups(n, 8);

    let params = SharedParameters::default();
    let settings = RunSettings {
        steps: 60,
        seed: Some(7),
        worker_threads: 4,
        temperature: 1.0,
    };

    let sim = Simulation::new(ModelConfig::default(), &params, graph, &age_groups, &settings, Seeding::Relaxed)?;
    let outcome = sim.run()?;

    println!("tick,S,E,I,R,M,deaths");
    for s in &outcome.timeline {
        println!(
            "{},{},{},{},{},{},{:.3}",
            s.tick,
            s.counts.get(Stage::Susceptible),
            s.counts.get(Stage::Exposed),
            s.counts.get(Stage::Infected),
            s.counts.get(Stage::Recovered),
            s.counts.get(Stage::Mortality),
            s.deaths
        );
    }
    println!(
        "deaths={:.3} d/d_initial={:.3} d/d_mortality={:.3}",
        outcome.deaths.re,
        outcome.deaths.grad(ParamIndex::InitialInfectionRate),
        outcome.deaths.grad(ParamIndex::MortalityRate)
    );
    Ok(())
}
