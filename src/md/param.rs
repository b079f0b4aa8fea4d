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

use crate::cosmic::{Body, VehicleState};
use crate::dynamics::{DynamicsError, TranslationalDynamics};
use core::fmt;
use serde_derive::{Deserialize, Serialize};

/// Variables computed from each accepted state and saved alongside the state history
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependentVariable {
    /// Altitude above the mean radius of the central body (m)
    Altitude,
    /// Speed relative to the central body (m/s)
    RelativeSpeed,
    /// Flight path angle relative to the central body (rad)
    FlightPathAngle,
    /// Mass of the propagated body (kg)
    BodyMass,
    /// Total thrust (N)
    ThrustMagnitude,
    /// Norm of the thrust acceleration (m/s^2)
    ThrustAccelerationNorm,
    /// Norm of the total acceleration (m/s^2)
    TotalAccelerationNorm,
}

impl DependentVariable {
    pub const fn unit(&self) -> &'static str {
        match self {
            Self::Altitude => "m",
            Self::RelativeSpeed => "m/s",
            Self::FlightPathAngle => "rad",
            Self::BodyMass => "kg",
            Self::ThrustMagnitude => "N",
            Self::ThrustAccelerationNorm | Self::TotalAccelerationNorm => "m/s^2",
        }
    }

    /// Header of this variable in exported files, e.g. `altitude (m)`
    pub fn header(&self) -> String {
        format!("{self} ({})", self.unit())
    }

    /// Computes this variable from the provided state.
    pub fn compute(
        &self,
        state: &VehicleState,
        central_body: &Body,
        dynamics: &TranslationalDynamics,
    ) -> Result<f64, DynamicsError> {
        let value = match self {
            Self::Altitude => {
                state.relative_position_m(&central_body.position_m).norm()
                    - central_body.mean_radius_m
            }
            // The central body does not move in the inertial frame
            Self::RelativeSpeed => state.velocity_m_s.norm(),
            Self::FlightPathAngle => state.flight_path_angle_rad(&central_body.position_m),
            Self::BodyMass => state.mass_kg,
            Self::ThrustMagnitude => dynamics.thrust_N(state.epoch),
            Self::ThrustAccelerationNorm => dynamics.thrust_acceleration(state)?.norm(),
            Self::TotalAccelerationNorm => dynamics.total_acceleration(state)?.norm(),
        };
        Ok(value)
    }
}

impl fmt::Display for DependentVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match *self {
            Self::Altitude => "altitude",
            Self::RelativeSpeed => "relative_speed",
            Self::FlightPathAngle => "fpa",
            Self::BodyMass => "mass",
            Self::ThrustMagnitude => "thrust",
            Self::ThrustAccelerationNorm => "thrust_accel",
            Self::TotalAccelerationNorm => "total_accel",
        };
        write!(f, "{repr}")
    }
}

#[cfg(test)]
mod ut_param {
    use super::*;
    use crate::cosmic::{BodyMap, MOON, MOON_MEAN_RADIUS_M, VEHICLE};
    use crate::dynamics::{AccelerationSettings, ForceModelTable};
    use crate::linalg::Vector3;
    use crate::time::Epoch;

    #[test]
    fn ballistic_vehicle() {
        let bodies = BodyMap::new()
            .with(Body::moon())
            .with(Body::vehicle(
                VEHICLE,
                1_000.0,
                crate::cosmic::Engine { max_thrust_N: 0.0 },
            ));
        let table =
            ForceModelTable::new().with(MOON, VEHICLE, AccelerationSettings::PointMassGravity);
        let dynamics = TranslationalDynamics::build(&table, &bodies, VEHICLE, false).unwrap();
        let moon = bodies.get(MOON).unwrap();

        let state = VehicleState::new(
            Epoch::from_tdb_seconds(0.0),
            Vector3::new(MOON_MEAN_RADIUS_M + 1_000.0, 0.0, 0.0),
            Vector3::new(3.0, 4.0, 0.0),
            1_000.0,
        );
        let value = |var: DependentVariable| var.compute(&state, moon, &dynamics).unwrap();
        assert!((value(DependentVariable::Altitude) - 1_000.0).abs() < 1e-9);
        assert_eq!(value(DependentVariable::RelativeSpeed), 5.0);
        assert!((value(DependentVariable::FlightPathAngle) - (3.0_f64 / 5.0).asin()).abs() < 1e-12);
        assert_eq!(value(DependentVariable::BodyMass), 1_000.0);
        assert_eq!(value(DependentVariable::ThrustMagnitude), 0.0);
        assert_eq!(value(DependentVariable::ThrustAccelerationNorm), 0.0);
        assert!((value(DependentVariable::TotalAccelerationNorm) - 1.62).abs() < 0.01);

        assert_eq!(DependentVariable::Altitude.header(), "altitude (m)");
    }
}
