use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};

use episim::io::contact::load_contact_graph;
use episim::io::debug_log::write_run_log;
use episim::io::optimized_params::read_optimized_parameters_opt;
use episim::io::population::{fit_age_groups, load_age_groups_csv};
use episim::io::run_config::load_run_config;
use episim::model::simulation::{Seeding, Simulation};
use episim::ParamIndex;

// Age group used when no per-agent file is configured.
const DEFAULT_AGE_GROUP: u8 = 2;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run one differentiable epidemic simulation")]
struct Args {
    /// JSON run configuration
    #[arg(long, default_value = "config.json")]
    config: String,

    /// Override the RNG seed from the config
    #[arg(long)]
    seed: Option<u64>,

    /// Override the number of ticks
    #[arg(long)]
    steps: Option<u32>,

    /// Worker threads for the exposure phase
    #[arg(long)]
    threads: Option<usize>,

    /// Ignore a stored optimized-parameter file
    #[arg(long, default_value_t = false)]
    ignore_optimized: bool,

    /// Directory for the per-tick run log
    #[arg(long)]
    log_dir: Option<String>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let mut cfg = load_run_config(&args.config)?;
    if let Some(seed) = args.seed {
        cfg.run.seed = Some(seed);
    }
    if let Some(steps) = args.steps {
        cfg.run.steps = steps;
    }
    if let Some(threads) = args.threads {
        cfg.run.worker_threads = threads;
    }

    let mut params = cfg.parameters;
    if !args.ignore_optimized {
        if let Some(path) = &cfg.optimized_parameters_path {
            match read_optimized_parameters_opt(path)? {
                Some(best) => {
                    info!(path = %path, loss = best.loss, "using optimized parameters");
                    best.apply_to(&mut params);
                }
                None => warn!(path = %path, "optimized parameter file not found, using config values"),
            }
        }
    }

    let graph = load_contact_graph(&cfg.contact_edges_path, cfg.agent_count)?;
    let age_groups = match &cfg.age_groups_path {
        Some(path) => fit_age_groups(&load_age_groups_csv(path)?, cfg.agent_count)?,
        None => vec![DEFAULT_AGE_GROUP; cfg.agent_count],
    };
    info!(
        agents = cfg.agent_count,
        edges = graph.edge_count(),
        steps = cfg.run.steps,
        "starting run"
    );

    let sim = Simulation::new(
        cfg.model.clone(),
        &params,
        graph,
        &age_groups,
        &cfg.run,
        Seeding::Relaxed,
    )?;
    let outcome = sim.run().context("simulation failed")?;

    if let Some(dir) = &args.log_dir {
        let run_id = format!("{}-{}", cfg.agent_count, chronoish_now_millis());
        let path = write_run_log(
            dir,
            &run_id,
            cfg.agent_count,
            cfg.run.steps,
            params.initial_infection_rate,
            params.mortality_rate,
            params.r0,
            &outcome.timeline,
        )?;
        info!(path = %path.display(), "run log written");
    }

    println!("deaths={:.6}", outcome.deaths.re);
    println!(
        "d_deaths/d_initial_infection_rate={:.6}",
        outcome.deaths.grad(ParamIndex::InitialInfectionRate)
    );
    println!("d_deaths/d_mortality_rate={:.6}", outcome.deaths.grad(ParamIndex::MortalityRate));
    println!("d_deaths/d_r0={:.6}", outcome.deaths.grad(ParamIndex::R0));
    Ok(())
}

fn chronoish_now_millis() -> u128 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}
