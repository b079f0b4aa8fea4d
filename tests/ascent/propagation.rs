use approx::assert_abs_diff_eq;
use lunar_ascent::cosmic::{Engine, MOON_MEAN_RADIUS_M, STD_GRAVITY, VEHICLE};
use lunar_ascent::dynamics::guidance::{
    AscentGuidance, AscentParameterization, LaunchFrame, VehicleContext,
};
use lunar_ascent::dynamics::ThrustAccelerationSettings;
use lunar_ascent::linalg::Vector3;
use lunar_ascent::md::DependentVariable;
use lunar_ascent::propagators::{
    IntegratorSettings, MultiTypePropagatorSettings, PropagationEngine, PropagationError,
    SingleArcSimulator, TerminationCondition,
};
use lunar_ascent::time::{Epoch, Unit};
use rstest::*;
use std::f64::consts::FRAC_PI_2;
use std::sync::Arc;

use crate::{ascent_bodies, ascent_integrator, ascent_propagator, ASCENT_MASS_KG, ASCENT_THRUST_N};

const ISP_S: f64 = 311.0;

/// Full throttle, vertical thrust, with an optional engine cut-off.
fn vertical_ascent(tof_s: f64, burn_duration_s: Option<f64>) -> MultiTypePropagatorSettings {
    let mut settings = ascent_propagator(vec![TerminationCondition::TimeOfFlight(tof_s)]);
    let context = VehicleContext {
        engine: Engine {
            max_thrust_N: ASCENT_THRUST_N,
        },
        frame: LaunchFrame::from_state(Vector3::new(MOON_MEAN_RADIUS_M, 0.0, 0.0), Vector3::zeros())
            .unwrap(),
    };
    let param = AscentParameterization {
        burn_duration_s,
        ..Default::default()
    };
    let guidance = AscentGuidance::new(
        context,
        Epoch::from_tdb_seconds(0.0),
        &[1.0, FRAC_PI_2],
        &param,
    )
    .unwrap();
    settings
        .translational_mut()
        .unwrap()
        .force_models_mut()
        .replace_self_exerted(
            VEHICLE,
            ThrustAccelerationSettings::from_guidance(Arc::new(guidance), ISP_S),
        );
    settings
        .reset_integrated_state_models(&ascent_bodies())
        .unwrap();
    settings
}

#[rstest]
#[case(ascent_integrator())]
#[case(IntegratorSettings::with_fixed_step_s(Epoch::from_tdb_seconds(0.0), 0.1))]
fn rocket_equation(#[case] opts: IntegratorSettings) {
    let _ = pretty_env_logger::try_init();
    let settings = vertical_ascent(30.0, None);

    let traj = SingleArcSimulator::default()
        .propagate(&ascent_bodies(), &opts, &settings)
        .unwrap();

    let last = traj.last().unwrap();
    assert_eq!(last.epoch, Epoch::from_tdb_seconds(30.0));
    // The mass rate is constant while thrusting
    let mass_rate = ASCENT_THRUST_N / (ISP_S * STD_GRAVITY);
    assert_abs_diff_eq!(last.mass_kg, ASCENT_MASS_KG - 30.0 * mass_rate, epsilon = 1e-6);
    assert_abs_diff_eq!(
        traj.final_dependent(DependentVariable::BodyMass).unwrap(),
        last.mass_kg
    );
    // Purely vertical ascent
    assert!(last.position_m[0] > MOON_MEAN_RADIUS_M + 500.0);
    assert!(last.position_m.fixed_rows::<2>(1).norm() < 1e-6);
    assert!(last.velocity_m_s[0] > 0.0);

    // Altitude and speed only increase
    let altitude = traj.dependent(DependentVariable::Altitude).unwrap();
    assert_eq!(altitude[0], 0.0);
    assert!(altitude.windows(2).all(|w| w[1] >= w[0]));
    assert_eq!(
        traj.final_dependent(DependentVariable::ThrustMagnitude),
        Some(ASCENT_THRUST_N)
    );
}

#[test]
fn adaptive_and_fixed_steps_agree() {
    let settings = vertical_ascent(60.0, None);
    let bodies = ascent_bodies();
    let adaptive = SingleArcSimulator::default()
        .propagate(&bodies, &ascent_integrator(), &settings)
        .unwrap();
    let fixed = SingleArcSimulator::default()
        .propagate(
            &bodies,
            &IntegratorSettings::with_fixed_step_s(Epoch::from_tdb_seconds(0.0), 0.5),
            &settings,
        )
        .unwrap();
    let (adaptive, fixed) = (adaptive.last().unwrap(), fixed.last().unwrap());
    assert_abs_diff_eq!(
        (adaptive.position_m - fixed.position_m).norm(),
        0.0,
        epsilon = 1e-3
    );
    assert_abs_diff_eq!(
        (adaptive.velocity_m_s - fixed.velocity_m_s).norm(),
        0.0,
        epsilon = 1e-5
    );
}

#[test]
fn engine_cut_off() {
    let settings = vertical_ascent(60.0, Some(20.0));
    let traj = SingleArcSimulator::default()
        .propagate(&ascent_bodies(), &ascent_integrator(), &settings)
        .unwrap();

    let thrust = traj.dependent(DependentVariable::ThrustMagnitude).unwrap();
    let masses = traj.dependent(DependentVariable::BodyMass).unwrap();
    let cut_off = Epoch::from_tdb_seconds(21.0);
    let coasting: Vec<usize> = traj
        .states
        .iter()
        .enumerate()
        .filter(|(_, state)| state.epoch > cut_off)
        .map(|(i, _)| i)
        .collect();
    assert!(!coasting.is_empty());
    for i in coasting {
        assert_eq!(thrust[i], 0.0);
        assert_eq!(masses[i], *masses.last().unwrap());
    }
    // About 20 seconds of burn
    let burnt = ASCENT_MASS_KG - masses.last().unwrap();
    assert_abs_diff_eq!(
        burnt,
        20.0 * ASCENT_THRUST_N / (ISP_S * STD_GRAVITY),
        epsilon = 1.0
    );
}

#[test]
fn first_termination_wins() {
    let mut settings = vertical_ascent(600.0, None);
    settings.termination.push(TerminationCondition::AltitudeAbove(1_000.0));
    let traj = SingleArcSimulator::default()
        .propagate(&ascent_bodies(), &ascent_integrator(), &settings)
        .unwrap();
    let reason = traj.termination.unwrap();
    assert_eq!(reason.condition, TerminationCondition::AltitudeAbove(1_000.0));
    assert!(reason.elapsed < 600 * Unit::Second);
    assert!(traj.final_dependent(DependentVariable::Altitude).unwrap() >= 1_000.0);
}

#[test]
fn no_thrust_falls_back() {
    // Without thrust, the vehicle sinks below the surface right away
    let mut settings = ascent_propagator(vec![
        TerminationCondition::TimeOfFlight(60.0),
        TerminationCondition::AltitudeBelow(0.0),
    ]);
    settings.reset_integrated_state_models(&ascent_bodies()).unwrap();
    let traj = SingleArcSimulator::default()
        .propagate(&ascent_bodies(), &ascent_integrator(), &settings)
        .unwrap();
    assert_eq!(
        traj.termination.unwrap().condition,
        TerminationCondition::AltitudeBelow(0.0)
    );
    assert_eq!(traj.len(), 2);
}

#[test]
fn divergence_is_reported() {
    let mut settings = ascent_propagator(vec![TerminationCondition::TimeOfFlight(10.0)]);
    // The gravity field is singular at the center of the Moon
    settings.translational_mut().unwrap().initial_position_m = Vector3::zeros();
    settings.reset_integrated_state_models(&ascent_bodies()).unwrap();
    assert!(matches!(
        SingleArcSimulator::default().propagate(&ascent_bodies(), &ascent_integrator(), &settings),
        Err(PropagationError::Diverged { steps: 1, .. })
    ));
}

#[test]
fn models_must_be_built() {
    let settings = ascent_propagator(vec![TerminationCondition::TimeOfFlight(10.0)]);
    assert_eq!(
        SingleArcSimulator::default().propagate(&ascent_bodies(), &ascent_integrator(), &settings),
        Err(PropagationError::ModelsNotBuilt)
    );
}
