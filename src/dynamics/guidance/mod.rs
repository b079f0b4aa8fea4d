/*
    Nyx, blazing fast astrodynamics
    Copyright (C) 2018-onwards Christopher Rabotin <christopher.rabotin@gmail.com>

    This program is free software: you can redistribute it and/or modify
    it under the terms of the GNU Affero General Public License as published
    by the Free Software Foundation, either version 3 of the License, or
    (at your option) any later version.

    This program is distributed in the hope that it will be useful,
    but WITHOUT ANY WARRANTY; without even the implied warranty of
    MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
    GNU Affero General Public License for more details.

    You should have received a copy of the GNU Affero General Public License
    along with this program.  If not, see <https://www.gnu.org/licenses/>.
*/

use crate::linalg::Vector3;
use crate::time::Epoch;
use snafu::Snafu;
use std::fmt;

mod ascent;
pub use ascent::{AscentGuidance, AscentParameterization, LaunchFrame, VehicleContext};

/// A vector quantity which only depends on time, e.g. a thrust direction.
///
/// Implementors must be deterministic: the same epoch always yields the same vector.
pub trait TimeVaryingVector3: fmt::Debug + Send + Sync {
    fn vector(&self, epoch: Epoch) -> Vector3<f64>;
}

/// A scalar quantity which only depends on time, e.g. a thrust magnitude or a specific impulse.
pub trait TimeVaryingScalar: fmt::Debug + Send + Sync {
    fn value(&self, epoch: Epoch) -> f64;
}

/// A scalar which never changes, e.g. the constant specific impulse of an engine.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ConstantScalar(pub f64);

impl TimeVaryingScalar for ConstantScalar {
    fn value(&self, _epoch: Epoch) -> f64 {
        self.0
    }
}

/// Converts an angle in a plane spanned by two orthonormal vectors into a unit vector of that plane.
/// The angle is measured from `x_axis` towards `y_axis`.
pub(crate) fn unit_vector_in_plane(
    angle_rad: f64,
    x_axis: &Vector3<f64>,
    y_axis: &Vector3<f64>,
) -> Vector3<f64> {
    angle_rad.cos() * x_axis + angle_rad.sin() * y_axis
}

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum GuidanceError {
    #[snafu(display("expected {expected} decision variables but got {got}"))]
    InvalidParameterization { expected: usize, got: usize },
    #[snafu(display("decision variable #{index} is not finite: {value}"))]
    NonFiniteVariable { index: usize, value: f64 },
    #[snafu(display("Throttle is not between 0.0 and 1.0: {ratio}"))]
    ThrottleRatio { ratio: f64 },
    #[snafu(display("invalid guidance parameterization: {reason}"))]
    InvalidSchema { reason: String },
    #[snafu(display("cannot build the launch frame: {reason}"))]
    DegenerateLaunchFrame { reason: &'static str },
}

#[test]
fn in_plane_unit_vector() {
    use std::f64::consts::{FRAC_PI_2, TAU};
    let x = Vector3::x();
    let y = Vector3::y();
    let mut angle = -TAU;
    while angle <= TAU {
        let u = unit_vector_in_plane(angle, &x, &y);
        assert!((u.norm() - 1.0).abs() < 1e-15);
        assert!(u[2].abs() < f64::EPSILON);
        angle += TAU * 0.05;
    }
    assert!((unit_vector_in_plane(FRAC_PI_2, &x, &y) - y).norm() < 1e-15);
    assert_eq!(ConstantScalar(311.0).value(Epoch::from_tdb_seconds(1e6)), 311.0);
}
