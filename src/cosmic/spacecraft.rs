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

use crate::linalg::{SVector, Vector3};
use crate::time::Epoch;
use std::fmt;

/// Number of components of the integrated vehicle state: position, velocity and mass.
pub const STATE_SIZE: usize = 7;

/// The integrated state vector: `[x, y, z, vx, vy, vz, mass]` in meters, meters per second and kg.
pub type StateVector = SVector<f64, STATE_SIZE>;

/// Translational state and mass of the vehicle at a given epoch, in the inertial frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehicleState {
    pub epoch: Epoch,
    pub position_m: Vector3<f64>,
    pub velocity_m_s: Vector3<f64>,
    pub mass_kg: f64,
}

impl VehicleState {
    pub fn new(
        epoch: Epoch,
        position_m: Vector3<f64>,
        velocity_m_s: Vector3<f64>,
        mass_kg: f64,
    ) -> Self {
        Self {
            epoch,
            position_m,
            velocity_m_s,
            mass_kg,
        }
    }

    pub fn to_vector(&self) -> StateVector {
        StateVector::from_column_slice(&[
            self.position_m[0],
            self.position_m[1],
            self.position_m[2],
            self.velocity_m_s[0],
            self.velocity_m_s[1],
            self.velocity_m_s[2],
            self.mass_kg,
        ])
    }

    pub fn from_vector(epoch: Epoch, vector: &StateVector) -> Self {
        Self {
            epoch,
            position_m: Vector3::new(vector[0], vector[1], vector[2]),
            velocity_m_s: Vector3::new(vector[3], vector[4], vector[5]),
            mass_kg: vector[6],
        }
    }

    /// Returns whether every component of this state is finite
    pub fn is_finite(&self) -> bool {
        self.position_m.iter().all(|x| x.is_finite())
            && self.velocity_m_s.iter().all(|x| x.is_finite())
            && self.mass_kg.is_finite()
    }

    /// Position relative to the provided body position
    pub fn relative_position_m(&self, body_position_m: &Vector3<f64>) -> Vector3<f64> {
        self.position_m - body_position_m
    }

    /// Flight path angle in radians: angle between the velocity and the local horizontal plane.
    /// Returns zero when the vehicle is at rest relative to that body.
    pub fn flight_path_angle_rad(&self, body_position_m: &Vector3<f64>) -> f64 {
        let r = self.relative_position_m(body_position_m);
        let speed = self.velocity_m_s.norm();
        if speed < f64::EPSILON || r.norm() < f64::EPSILON {
            return 0.0;
        }
        (r.dot(&self.velocity_m_s) / (r.norm() * speed))
            .clamp(-1.0, 1.0)
            .asin()
    }
}

impl fmt::Display for VehicleState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}\tr = [{:.3}, {:.3}, {:.3}] m\tv = [{:.3}, {:.3}, {:.3}] m/s\t{:.3} kg",
            self.epoch,
            self.position_m[0],
            self.position_m[1],
            self.position_m[2],
            self.velocity_m_s[0],
            self.velocity_m_s[1],
            self.velocity_m_s[2],
            self.mass_kg
        )
    }
}

#[test]
fn vector_conversion() {
    let epoch = Epoch::from_tdb_seconds(0.0);
    let state = VehicleState::new(
        epoch,
        Vector3::new(1_737_400.0, 0.0, 0.0),
        Vector3::new(0.0, 10.0, 0.0),
        4_700.0,
    );
    let back = VehicleState::from_vector(epoch, &state.to_vector());
    assert_eq!(state, back);
    assert!(state.is_finite());
    // Horizontal velocity: flight path angle is zero
    assert!(state.flight_path_angle_rad(&Vector3::zeros()).abs() < 1e-15);
}
