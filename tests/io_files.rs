use std::io::Write;

use approx::assert_abs_diff_eq;

use episim::calibration::{squared_error, ParameterBounds};
use episim::io::optimized_params::{
    read_optimized_parameters, read_optimized_parameters_opt, write_optimized_parameters, OptimizedParameters,
};
use episim::io::population::{fit_age_groups, load_age_groups_csv};
use episim::io::run_config::load_run_config;
use episim::{Dual, ParamIndex, SharedParameters};

#[test]
fn optimized_parameters_round_trip() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("out").join("optimized_parameters.csv");
    assert!(read_optimized_parameters_opt(&path).expect("missing file is fine").is_none());

    let best = OptimizedParameters {
        initial_infection_rate: 0.125,
        mortality_rate: 0.25,
        loss: 42.5,
    };
    write_optimized_parameters(&path, &best).expect("write");

    let text = std::fs::read_to_string(&path).expect("read back");
    assert_eq!(text.lines().next(), Some("InitialInfectionRate;MortalityRate;Loss"));
    assert_eq!(read_optimized_parameters(&path).expect("parse"), best);

    let mut params = SharedParameters::default();
    best.apply_to(&mut params);
    assert_eq!(params.initial_infection_rate, 0.125);
    assert_eq!(params.mortality_rate, 0.25);
    assert_eq!(params.r0, SharedParameters::default().r0);
}

#[test]
fn only_strictly_better_loss_replaces_stored_parameters() {
    let stored = OptimizedParameters { initial_infection_rate: 0.1, mortality_rate: 0.1, loss: 10.0 };
    let worse = OptimizedParameters { loss: 10.0, ..stored };
    let better = OptimizedParameters { loss: 9.5, ..stored };
    assert!(better.improves_on(Some(&stored)));
    assert!(!worse.improves_on(Some(&stored)));
    assert!(worse.improves_on(None));
}

#[test]
fn unparsable_parameter_file_is_an_error() {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(f, "InitialInfectionRate;MortalityRate;Loss").unwrap();
    writeln!(f, "0.1;abc;3").unwrap();
    assert!(read_optimized_parameters(f.path()).is_err());
}

#[test]
fn run_config_parses_with_defaults() {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    write!(
        f,
        r#"{{
            "agent_count": 1000,
            "steps": 25,
            "seed": 5,
            "contact_edges_path": "Resources/contact_edges.csv",
            "parameters": {{ "mortality_rate": 0.2 }}
        }}"#
    )
    .unwrap();
    let cfg = load_run_config(f.path().to_str().unwrap()).expect("config");
    assert_eq!(cfg.agent_count, 1000);
    assert_eq!(cfg.run.steps, 25);
    assert_eq!(cfg.run.seed, Some(5));
    assert_eq!(cfg.run.worker_threads, 1);
    assert_eq!(cfg.parameters.mortality_rate, 0.2);
    assert_eq!(cfg.parameters.initial_infection_rate, 0.05);
    assert_eq!(cfg.model.exposed_to_infected_time, 3);
    assert!(cfg.age_groups_path.is_none());
}

#[test]
fn run_config_rejects_zero_agents() {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    write!(f, r#"{{"agent_count": 0, "steps": 5, "contact_edges_path": "x.csv"}}"#).unwrap();
    assert!(load_run_config(f.path().to_str().unwrap()).is_err());
}

#[test]
fn age_groups_load_and_fit() {
    let mut f = tempfile::NamedTempFile::new().expect("tempfile");
    writeln!(f, "age_group").unwrap();
    for g in [0, 3, 7] {
        writeln!(f, "{g}").unwrap();
    }
    let groups = load_age_groups_csv(f.path().to_str().unwrap()).expect("groups");
    assert_eq!(groups, vec![0, 3, 7]);
    assert_eq!(fit_age_groups(&groups, 3).unwrap(), vec![0, 3, 7]);
    assert_eq!(fit_age_groups(&groups, 2).unwrap(), vec![0, 3]);
    assert!(fit_age_groups(&groups, 5).is_err(), "short age group file accepted");
    assert!(fit_age_groups(&[0, 3], 1000).is_err());
}

#[test]
fn bounds_map_raw_outputs_into_the_calibration_box() {
    let bounds = ParameterBounds::default();
    for (raw, expected) in [
        ([0.0, 0.0], [0.001, 0.01]),
        ([1.0, 1.0], [0.9, 0.9]),
        ([-3.0, 7.0], [0.001, 0.9]),
    ] {
        let mapped = bounds.map(raw);
        assert_abs_diff_eq!(mapped[0], expected[0], epsilon = 1e-12);
        assert_abs_diff_eq!(mapped[1], expected[1], epsilon = 1e-12);
    }
    assert_eq!(bounds.jacobian_diag(), [0.9 - 0.001, 0.9 - 0.01]);
    let mut params = SharedParameters::default();
    bounds.apply([0.5, 0.5], &mut params);
    assert_abs_diff_eq!(params.initial_infection_rate, 0.4505, epsilon = 1e-12);
    assert_abs_diff_eq!(params.mortality_rate, 0.455, epsilon = 1e-12);
}

#[test]
fn squared_error_chains_the_deaths_gradient() {
    let deaths = Dual::variable(12.0, ParamIndex::MortalityRate).scale(2.0);
    let loss = squared_error(20.0, deaths);
    assert_abs_diff_eq!(loss.re, 16.0, epsilon = 1e-12);
    // d/dm (2m - 20)^2 = 2 (2m - 20) * 2
    assert_abs_diff_eq!(loss.grad(ParamIndex::MortalityRate), 2.0 * 4.0 * 2.0, epsilon = 1e-12);
}
