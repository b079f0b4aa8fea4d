use lunar_ascent::io::{AscentScenario, ConfigRepr};
use lunar_ascent::md::DependentVariable;
use lunar_ascent::opti::EvaluationPhase;
use lunar_ascent::propagators::TerminationCondition;
use lunar_ascent::time::Unit;
use lunar_ascent::OptimizationProblem;
use std::env;
use std::fs;
use std::path::PathBuf;

fn scenario_path() -> PathBuf {
    [env!("CARGO_MANIFEST_DIR"), "data", "lunar_ascent.yaml"]
        .iter()
        .collect()
}

#[test]
fn apollo_like_ascent() {
    let _ = pretty_env_logger::try_init();
    let scenario = AscentScenario::load(scenario_path()).unwrap();
    assert_eq!(scenario.bounds.len(), 4);
    assert_eq!(scenario.dependent_variables.len(), 7);
    assert_eq!(
        scenario.termination.conditions(),
        vec![
            TerminationCondition::TimeOfFlight(600.0),
            TerminationCondition::AltitudeBelow(-10.0),
            TerminationCondition::MassBelow(2000.0),
        ]
    );

    let mut problem = scenario.to_problem().unwrap();
    assert_eq!(problem.parameterization().node_count, 3);
    assert_eq!(problem.parameterization().burn_duration_s, Some(400.0));

    let objectives = problem.fitness(&[1.0, 1.5, 1.2, 0.9]).unwrap();
    assert_eq!(objectives.len(), problem.objective_count());
    assert_eq!(problem.phase(), EvaluationPhase::Done);

    let traj = problem.last_trajectory().unwrap();
    let reason = traj.termination.unwrap();
    assert!(reason.elapsed <= 600 * Unit::Second);
    assert!(traj.final_dependent(DependentVariable::BodyMass).unwrap() < 4_700.0);
    for (_, values) in traj.iter() {
        assert_eq!(values.len(), 7);
        assert!(values.iter().all(|v| v.is_finite()));
    }

    let path = env::temp_dir().join("lunar_ascent_apollo_like.csv");
    traj.to_csv(&path).unwrap();
    let exported = fs::read_to_string(&path).unwrap();
    assert_eq!(exported.lines().count(), traj.len() + 1);
    assert!(exported.lines().next().unwrap().ends_with("total_accel (m/s^2)"));
    fs::remove_file(path).unwrap();
}

#[test]
fn missing_scenario_file() {
    assert!(AscentScenario::load("data/does_not_exist.yaml").is_err());
}
