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

use super::{AccelModel, DynamicsError};
use crate::cosmic::{AstroError, Body, VehicleState};
use crate::linalg::Vector3;
use std::fmt;

/// Point mass gravity of a body whose position is fixed in the inertial frame.
#[derive(Clone, Debug, PartialEq)]
pub struct PointMassGravity {
    name: String,
    gm_m3_s2: f64,
    position_m: Vector3<f64>,
}

impl PointMassGravity {
    pub fn new(body: &Body) -> Result<Self, AstroError> {
        if !(body.gm_m3_s2 > 0.0 && body.gm_m3_s2.is_finite()) {
            return Err(AstroError::InvalidProperty {
                name: body.name.clone(),
                property: "gravitational parameter",
                value: body.gm_m3_s2,
            });
        }
        Ok(Self {
            name: body.name.clone(),
            gm_m3_s2: body.gm_m3_s2,
            position_m: body.position_m,
        })
    }
}

impl AccelModel for PointMassGravity {
    fn eom(&self, state: &VehicleState) -> Result<Vector3<f64>, DynamicsError> {
        let r = state.relative_position_m(&self.position_m);
        let r_norm = r.norm();
        Ok(-self.gm_m3_s2 / r_norm.powi(3) * r)
    }
}

impl fmt::Display for PointMassGravity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "point mass gravity of {}", self.name)
    }
}

#[test]
fn surface_gravity_of_the_moon() {
    use crate::cosmic::{MOON_MEAN_RADIUS_M, VEHICLE};
    use crate::time::Epoch;

    let moon = PointMassGravity::new(&Body::moon()).unwrap();
    let state = VehicleState::new(
        Epoch::from_tdb_seconds(0.0),
        Vector3::new(0.0, MOON_MEAN_RADIUS_M, 0.0),
        Vector3::zeros(),
        1.0,
    );
    let accel = moon.eom(&state).unwrap();
    // About 1.62 m/s^2, pointing to the center
    assert!((accel.norm() - 1.624).abs() < 1e-3);
    assert!(accel[1] < 0.0);

    let massless = Body::vehicle(
        VEHICLE,
        1.0,
        crate::cosmic::Engine { max_thrust_N: 1.0 },
    );
    assert!(PointMassGravity::new(&massless).is_err());
}
