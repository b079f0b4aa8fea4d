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

use crate::cosmic::StateVector;
use crate::linalg::Vector3;

// This determines when to take into consideration the magnitude of the state_delta -- prevents dividing by too small of a number.
const REL_ERR_THRESH: f64 = 0.1;

/// The Error Control trait manages how a propagator computes the error in the current step.
pub trait ErrorCtrl: Copy + Send + Sync {
    /// Computes the actual error of the current step.
    ///
    /// The `error_est` is the estimated error computed from the difference in the two stages of
    /// of the RK propagator. The `candidate` variable is the candidate state, and `cur_state` is
    /// the current state. This function must return the error.
    fn estimate(error_est: &StateVector, candidate: &StateVector, cur_state: &StateVector) -> f64;
}

fn slice3(vector: &StateVector, start: usize) -> Vector3<f64> {
    Vector3::new(vector[start], vector[start + 1], vector[start + 2])
}

/// An RSS step error control which effectively computes the L2 norm of the provided Vector of size 3
///
/// Note that this error controller should be preferrably be used only with slices of a state with the same units.
/// For example, one should probably use this for position independently of using it for the velocity.
/// (Source)[https://github.com/ChristopherRabotin/GMAT/blob/37201a6290e7f7b941bc98ee973a527a5857104b/src/base/forcemodel/ODEModel.cpp#L3045]
pub fn rss_step(
    prop_err: &Vector3<f64>,
    candidate: &Vector3<f64>,
    cur_state: &Vector3<f64>,
) -> f64 {
    let mag = (candidate - cur_state).norm();
    let err = prop_err.norm();
    if mag > REL_ERR_THRESH {
        err / mag
    } else {
        err
    }
}

/// An RSS state error control: when in doubt, use this error controller, especially for high accurracy.
///
/// (Source)[https://github.com/ChristopherRabotin/GMAT/blob/37201a6290e7f7b941bc98ee973a527a5857104b/src/base/forcemodel/ODEModel.cpp#L3004]
pub fn rss_state(
    prop_err: &Vector3<f64>,
    candidate: &Vector3<f64>,
    cur_state: &Vector3<f64>,
) -> f64 {
    let mag = 0.5 * (candidate + cur_state).norm();
    let err = prop_err.norm();
    if mag > REL_ERR_THRESH {
        err / mag
    } else {
        err
    }
}

/// An RSS step error control on position and velocity separately, the largest one is returned.
/// The mass is not error controlled: its rate is piecewise constant during an ascent.
#[derive(Clone, Copy)]
#[allow(clippy::upper_case_acronyms)]
pub struct RSSCartesianStep;
impl ErrorCtrl for RSSCartesianStep {
    fn estimate(error_est: &StateVector, candidate: &StateVector, cur_state: &StateVector) -> f64 {
        let err_radius = rss_step(
            &slice3(error_est, 0),
            &slice3(candidate, 0),
            &slice3(cur_state, 0),
        );
        let err_velocity = rss_step(
            &slice3(error_est, 3),
            &slice3(candidate, 3),
            &slice3(cur_state, 3),
        );
        err_radius.max(err_velocity)
    }
}

/// An RSS state error control on position and velocity separately, the largest one is returned.
#[derive(Clone, Copy)]
#[allow(clippy::upper_case_acronyms)]
pub struct RSSCartesianState;
impl ErrorCtrl for RSSCartesianState {
    fn estimate(error_est: &StateVector, candidate: &StateVector, cur_state: &StateVector) -> f64 {
        let err_radius = rss_state(
            &slice3(error_est, 0),
            &slice3(candidate, 0),
            &slice3(cur_state, 0),
        );
        let err_velocity = rss_state(
            &slice3(error_est, 3),
            &slice3(candidate, 3),
            &slice3(cur_state, 3),
        );
        err_radius.max(err_velocity)
    }
}

#[test]
fn relative_errors() {
    let cur = StateVector::from_column_slice(&[1.0e6, 0.0, 0.0, 0.0, 10.0, 0.0, 4_700.0]);
    let cand = StateVector::from_column_slice(&[1.0e6, 10.0, 0.0, 0.0, 11.0, 0.0, 4_690.0]);
    let err = StateVector::from_column_slice(&[0.0, 1e-6, 0.0, 0.0, 1e-9, 0.0, 1.0]);
    // Position moved by 10 m with 1e-6 m of error, velocity by 1 m/s with 1e-9 m/s of error
    assert!((RSSCartesianStep::estimate(&err, &cand, &cur) - 1e-7).abs() < 1e-20);
    // Relative to the magnitude of the position, the state error is tiny
    assert!(RSSCartesianState::estimate(&err, &cand, &cur) < 1e-10);
}
