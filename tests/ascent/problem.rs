use approx::assert_abs_diff_eq;
use lunar_ascent::cosmic::{Body, BodyMap, MOON, STD_GRAVITY, VEHICLE};
use lunar_ascent::dynamics::guidance::{AscentParameterization, GuidanceError};
use lunar_ascent::md::{DependentVariable, Trajectory};
use lunar_ascent::opti::{evaluate_population, EvaluationPhase, FnReduction, Reduced};
use lunar_ascent::propagators::{
    IntegratorSettings, MultiTypePropagatorSettings, PropagationEngine, PropagationError,
    SingleArcSimulator, TerminationCondition,
};
use lunar_ascent::time::Epoch;
use lunar_ascent::{LunarAscentProblem, OptimizationProblem, ProblemError};
use std::f64::consts::{FRAC_PI_2, PI};

use crate::{ascent_bodies, ascent_integrator, ascent_propagator, ASCENT_MASS_KG, ASCENT_THRUST_N};

fn ascent_problem(bounds: Vec<(f64, f64)>, isp_s: f64) -> LunarAscentProblem {
    LunarAscentProblem::new(
        ascent_bodies(),
        ascent_integrator(),
        ascent_propagator(vec![TerminationCondition::TimeOfFlight(120.0)]),
        bounds,
        isp_s,
    )
    .unwrap()
}

fn models_revision(problem: &LunarAscentProblem) -> u64 {
    problem
        .propagator()
        .translational()
        .unwrap()
        .force_models()
        .revision()
}

/// Final altitude and mass as objectives, final speed as a constraint
fn final_values(traj: &Trajectory) -> Reduced {
    Reduced {
        objectives: vec![
            traj.final_dependent(DependentVariable::Altitude).unwrap(),
            traj.final_dependent(DependentVariable::BodyMass).unwrap(),
        ],
        constraints: vec![traj.final_dependent(DependentVariable::RelativeSpeed).unwrap()],
    }
}

#[test]
fn placeholder_fitness() {
    let _ = pretty_env_logger::try_init();
    let mut problem = ascent_problem(vec![(0.0, 1.0), (0.0, 2.0 * PI)], 3000.0);
    assert_eq!(problem.phase(), EvaluationPhase::Idle);
    assert_eq!(problem.objective_count(), 1);
    assert_eq!(problem.constraint_count(), 0);

    let objectives = problem.fitness(&[0.5, 1.57]).unwrap();
    assert_eq!(objectives, vec![0.0]);
    assert!(problem.constraints().is_empty());
    assert_eq!(problem.phase(), EvaluationPhase::Done);

    let traj = problem.last_trajectory().unwrap();
    assert_eq!(traj.last().unwrap().epoch, Epoch::from_tdb_seconds(120.0));
    // Half throttle for two minutes
    let mass_rate = 0.5 * ASCENT_THRUST_N / (3000.0 * STD_GRAVITY);
    assert_abs_diff_eq!(
        traj.last().unwrap().mass_kg,
        ASCENT_MASS_KG - 120.0 * mass_rate,
        epsilon = 1e-6
    );
}

#[test]
fn bounds_keep_their_order() {
    let ranges = vec![(0.1, 0.9), (-0.5, 1.5), (0.2, 0.3), (1.0, 1.0)];
    let problem = ascent_problem(ranges.clone(), 311.0);
    let (lower, upper) = problem.bounds();
    assert_eq!(lower, vec![0.1, -0.5, 0.2, 1.0]);
    assert_eq!(upper, vec![0.9, 1.5, 0.3, 1.0]);
    assert_eq!(problem.parameterization().node_count, 3);
    assert_eq!(problem.specific_impulse_s(), 311.0);
}

#[test]
fn evaluations_are_reproducible() {
    let mut problem = ascent_problem(vec![(0.0, 1.0), (0.0, PI), (0.0, PI)], 311.0)
        .with_reduction(FnReduction::new(2, 1, final_values));
    assert_eq!(problem.objective_count(), 2);
    assert_eq!(problem.constraint_count(), 1);

    let decision = [0.9, 1.4, 0.8];
    let first = problem.fitness(&decision).unwrap();
    let first_constraints = problem.constraints().to_vec();
    let first_traj = problem.last_trajectory().unwrap().clone();

    // Evaluating another decision vector in between must not leak into the next evaluation
    let other = problem.fitness(&[0.4, FRAC_PI_2, FRAC_PI_2]).unwrap();
    assert_ne!(other, first);

    assert_eq!(problem.fitness(&decision).unwrap(), first);
    assert_eq!(problem.constraints(), first_constraints.as_slice());
    assert_eq!(problem.last_trajectory().unwrap(), &first_traj);

    // A single thrust model, no matter how many evaluations
    let force_models = problem.propagator().translational().unwrap().force_models();
    assert_eq!(force_models.get(VEHICLE, VEHICLE).len(), 1);
    assert_eq!(force_models.len(), 2);
}

#[test]
fn invalid_decision_leaves_the_models_untouched() {
    let mut problem = ascent_problem(vec![(0.0, 1.0), (0.0, PI)], 311.0);
    problem.fitness(&[0.9, 1.2]).unwrap();
    let revision = models_revision(&problem);

    for decision in [vec![], vec![0.5], vec![0.5, 1.0, 1.0]] {
        assert!(matches!(
            problem.fitness(&decision),
            Err(ProblemError::InvalidParameterization {
                source: GuidanceError::InvalidParameterization { expected: 2, .. }
            })
        ));
        assert_eq!(problem.phase(), EvaluationPhase::Configuring);
    }
    // Throttle above full thrust, and not-a-number pitch
    assert!(problem.fitness(&[1.5, 1.0]).is_err());
    assert!(problem.fitness(&[0.5, f64::NAN]).is_err());

    assert_eq!(models_revision(&problem), revision);
    assert_eq!(
        problem.propagator().translational().unwrap().models_revision(),
        Some(revision)
    );
    // Results of the previous candidate are not kept past a rejected one
    assert!(problem.last_trajectory().is_none());
    assert!(problem.constraints().is_empty());
}

#[test]
fn out_of_bounds_is_still_evaluated() {
    let mut problem = ascent_problem(vec![(0.5, 1.0), (0.0, 0.1)], 311.0);
    assert_eq!(problem.fitness(&[0.2, 1.0]).unwrap(), vec![0.0]);
    assert_eq!(problem.phase(), EvaluationPhase::Done);
}

#[derive(Clone, Debug)]
struct FailingEngine;

impl PropagationEngine for FailingEngine {
    fn propagate(
        &self,
        _bodies: &BodyMap,
        integrator: &IntegratorSettings,
        _settings: &MultiTypePropagatorSettings,
    ) -> Result<Trajectory, PropagationError> {
        Err(PropagationError::Diverged {
            epoch: integrator.initial_epoch,
            steps: 0,
        })
    }
}

#[test]
fn propagation_failure_is_reported() {
    let mut problem = ascent_problem(vec![(0.0, 1.0), (0.0, PI)], 311.0).with_engine(FailingEngine);
    assert!(matches!(
        problem.fitness(&[0.5, 1.0]),
        Err(ProblemError::PropagationFailed {
            source: PropagationError::Diverged { steps: 0, .. }
        })
    ));
    assert_eq!(problem.phase(), EvaluationPhase::Propagating);
    assert!(problem.last_trajectory().is_none());
}

#[test]
fn failed_evaluation_clears_the_previous_results() {
    let _ = pretty_env_logger::try_init();
    let mut problem = LunarAscentProblem::new(
        ascent_bodies(),
        ascent_integrator(),
        ascent_propagator(vec![TerminationCondition::AltitudeAbove(1_000.0)]),
        vec![(0.0, 1.0), (0.0, 3.2)],
        311.0,
    )
    .unwrap()
    .with_engine(SingleArcSimulator::new(30))
    .with_reduction(FnReduction::new(1, 1, |traj: &Trajectory| Reduced {
        objectives: vec![0.0],
        constraints: vec![traj.final_dependent(DependentVariable::Altitude).unwrap()],
    }));

    // Full throttle reaches one kilometer within the allowed steps
    problem.fitness(&[1.0, 1.57]).unwrap();
    assert_eq!(problem.constraints().len(), 1);
    assert!(problem.constraints()[0] >= 1_000.0);
    assert!(problem.last_trajectory().is_some());

    // Without thrust, the vehicle never climbs
    assert!(matches!(
        problem.fitness(&[0.0, 1.57]),
        Err(ProblemError::PropagationFailed {
            source: PropagationError::MaxStepsReached { steps: 30, .. }
        })
    ));
    assert_eq!(problem.phase(), EvaluationPhase::Propagating);
    assert!(problem.constraints().is_empty());
    assert!(problem.last_trajectory().is_none());
}

#[test]
fn reduction_must_match_its_dimensions() {
    let mut problem = ascent_problem(vec![(0.0, 1.0), (0.0, PI)], 311.0).with_reduction(
        FnReduction::new(1, 2, |_traj: &Trajectory| Reduced {
            objectives: vec![1.0],
            constraints: vec![0.0],
        }),
    );
    assert!(matches!(
        problem.fitness(&[0.5, 1.0]),
        Err(ProblemError::ReductionDimension {
            kind: "constraints",
            expected: 2,
            got: 1
        })
    ));
    assert_eq!(problem.phase(), EvaluationPhase::Reducing);
    assert!(problem.constraints().is_empty());
    assert!(problem.last_trajectory().is_none());
}

#[test]
fn population_matches_sequential_evaluations() {
    let problem = ascent_problem(vec![(0.0, 1.0), (0.0, PI), (0.0, PI)], 311.0)
        .with_reduction(FnReduction::new(2, 1, final_values));

    let population: Vec<Vec<f64>> = (0..8)
        .map(|i| {
            let ratio = f64::from(i) / 8.0;
            vec![0.6 + 0.4 * ratio, 0.5 + ratio, FRAC_PI_2 - 0.5 * ratio]
        })
        .collect();
    let parallel = evaluate_population(&problem, &population);
    assert_eq!(parallel.len(), population.len());

    let mut sequential = problem.clone();
    for (decision, result) in population.iter().zip(parallel) {
        assert_eq!(result.unwrap(), sequential.fitness(decision).unwrap());
    }
}

#[test]
fn invalid_configurations() {
    let bodies = ascent_bodies();
    let propagator = ascent_propagator(vec![TerminationCondition::TimeOfFlight(60.0)]);
    let build = |bodies: BodyMap,
                 propagator: MultiTypePropagatorSettings,
                 bounds: Vec<(f64, f64)>,
                 isp_s: f64| {
        LunarAscentProblem::new(bodies, ascent_integrator(), propagator, bounds, isp_s)
    };

    for bounds in [
        vec![],
        vec![(0.0, 1.0)],
        vec![(0.0, 1.0), (1.0, 0.0)],
        vec![(0.0, 1.0), (0.0, f64::INFINITY)],
    ] {
        assert!(matches!(
            build(bodies.clone(), propagator.clone(), bounds, 311.0),
            Err(ProblemError::Configuration { .. })
        ));
    }

    let bounds = vec![(0.0, 1.0), (0.0, PI)];
    for isp_s in [0.0, -311.0, f64::NAN] {
        assert!(build(bodies.clone(), propagator.clone(), bounds.clone(), isp_s).is_err());
    }

    // Unknown vehicle, and a vehicle without an engine
    let moon = bodies.get(MOON).unwrap().clone();
    let moon_only = BodyMap::new().with(moon.clone());
    assert!(build(moon_only, propagator.clone(), bounds.clone(), 311.0).is_err());
    let no_engine = BodyMap::new()
        .with(moon)
        .with(Body::celestial(VEHICLE, 1.0, 1.0));
    assert!(matches!(
        build(no_engine, propagator.clone(), bounds.clone(), 311.0),
        Err(ProblemError::Configuration { .. })
    ));

    // No translational settings to put the thrust in
    let mut no_translational = propagator.clone();
    no_translational.translational = None;
    assert!(matches!(
        build(bodies.clone(), no_translational, bounds.clone(), 311.0),
        Err(ProblemError::Configuration { .. })
    ));

    // Parameterization and bounds disagree
    assert!(build(bodies.clone(), propagator.clone(), bounds.clone(), 311.0)
        .unwrap()
        .with_parameterization(AscentParameterization {
            node_count: 2,
            ..Default::default()
        })
        .is_err());
    let problem = build(bodies, propagator, bounds, 311.0)
        .unwrap()
        .with_parameterization(AscentParameterization {
            node_count: 1,
            node_interval_s: 10.0,
            burn_duration_s: Some(30.0),
        })
        .unwrap();
    assert_eq!(problem.parameterization().burn_duration_s, Some(30.0));
}
