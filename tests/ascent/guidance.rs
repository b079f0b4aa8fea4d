use approx::assert_abs_diff_eq;
use lunar_ascent::cosmic::Engine;
use lunar_ascent::dynamics::guidance::{
    AscentGuidance, AscentParameterization, GuidanceError, LaunchFrame, TimeVaryingScalar,
    TimeVaryingVector3, VehicleContext,
};
use lunar_ascent::dynamics::{AccelerationSettings, ForceModelTable, ThrustAccelerationSettings};
use lunar_ascent::linalg::Vector3;
use lunar_ascent::time::{Epoch, Unit};
use rstest::*;
use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::Arc;

use crate::ASCENT_THRUST_N;

#[fixture]
fn context() -> VehicleContext {
    // Launch site off the equator, with some initial horizontal velocity
    let position = Vector3::new(1_200_000.0, 800_000.0, 900_000.0);
    let velocity = Vector3::new(-2.0, 3.0, 0.5);
    VehicleContext {
        engine: Engine {
            max_thrust_N: ASCENT_THRUST_N,
        },
        frame: LaunchFrame::from_state(position, velocity).unwrap(),
    }
}

#[fixture]
fn parameterization() -> AscentParameterization {
    AscentParameterization {
        node_count: 4,
        node_interval_s: 45.0,
        burn_duration_s: Some(150.0),
    }
}

#[rstest]
#[case(vec![1.0, FRAC_PI_2, 1.2, 0.6, 0.0])]
#[case(vec![0.5, 0.0, 0.0, 0.0, 0.0])]
#[case(vec![0.0, -PI, 2.0 * PI, 7.5, -0.3])]
fn direction_has_unit_norm(
    context: VehicleContext,
    parameterization: AscentParameterization,
    #[case] decision: Vec<f64>,
) {
    let _ = pretty_env_logger::try_init();
    let epoch = Epoch::from_tdb_seconds(86_400.0);
    let guidance = AscentGuidance::new(context, epoch, &decision, &parameterization).unwrap();

    // Before, during and after the nodes, and after engine cut-off
    for tenth_s in -100..3_000 {
        let t = epoch + (f64::from(tenth_s) * 0.1) * Unit::Second;
        assert_abs_diff_eq!(guidance.vector(t).norm(), 1.0, epsilon = 1e-12);
        let magnitude = guidance.value(t);
        assert!((0.0..=ASCENT_THRUST_N).contains(&magnitude), "{magnitude}");
    }
}

#[rstest]
fn frame_is_orthonormal(context: VehicleContext) {
    let frame = context.frame;
    assert_abs_diff_eq!(frame.up().norm(), 1.0, epsilon = 1e-14);
    assert_abs_diff_eq!(frame.downrange().norm(), 1.0, epsilon = 1e-14);
    assert_abs_diff_eq!(frame.up().dot(&frame.downrange()), 0.0, epsilon = 1e-14);
}

#[rstest]
fn pure_functions_of_time(context: VehicleContext, parameterization: AscentParameterization) {
    let epoch = Epoch::from_tdb_seconds(0.0);
    let guidance =
        AscentGuidance::new(context, epoch, &[0.8, 1.4, 1.0, 0.7, 0.2], &parameterization)
            .unwrap();
    let late = epoch + 100 * Unit::Second;
    let early = epoch + 10 * Unit::Second;
    let first = guidance.vector(late);
    // Querying other epochs in between does not change the answer
    let _ = guidance.vector(early);
    let _ = guidance.value(early);
    assert_eq!(guidance.vector(late), first);
    assert_eq!(guidance.value(late), 0.8 * ASCENT_THRUST_N);
    assert_eq!(guidance.value(epoch + 151 * Unit::Second), 0.0);
}

#[rstest]
fn wrong_length_is_rejected(context: VehicleContext, parameterization: AscentParameterization) {
    let epoch = Epoch::from_tdb_seconds(0.0);
    for len in [0, 1, 4, 6] {
        let decision = vec![0.5; len];
        assert_eq!(
            AscentGuidance::new(context, epoch, &decision, &parameterization),
            Err(GuidanceError::InvalidParameterization {
                expected: 5,
                got: len
            })
        );
    }
}

#[rstest]
fn splice_twice_keeps_one_thrust(context: VehicleContext) {
    let epoch = Epoch::from_tdb_seconds(0.0);
    let param = AscentParameterization::default();
    let mut table =
        ForceModelTable::new().with("Moon", "Vehicle", AccelerationSettings::PointMassGravity);

    for decision in [[0.3, 0.2], [0.9, 1.1]] {
        let guidance = AscentGuidance::new(context, epoch, &decision, &param).unwrap();
        table.replace_self_exerted(
            "Vehicle",
            ThrustAccelerationSettings::from_guidance(Arc::new(guidance), 311.0),
        );
    }

    let self_exerted = table.get("Vehicle", "Vehicle");
    assert_eq!(self_exerted.len(), 1);
    match &self_exerted[0] {
        AccelerationSettings::Thrust(thrust) => {
            // The latest decision vector wins
            assert_abs_diff_eq!(thrust.magnitude_N(epoch), 0.9 * ASCENT_THRUST_N);
            assert_eq!(thrust.isp_s(epoch), 311.0);
        }
        other => panic!("expected a thrust model, got {other}"),
    }
    assert_eq!(table.len(), 2);
}
