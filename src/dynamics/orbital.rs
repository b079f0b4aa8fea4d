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

use super::{
    AccelModel, AccelerationSettings, DynamicsAstroSnafu, DynamicsError, ForceModelTable,
    PointMassGravity, ThrustAcceleration,
};
use crate::cosmic::{BodyMap, StateVector, VehicleState};
use crate::linalg::Vector3;
use crate::time::Epoch;
use snafu::ResultExt;
use std::fmt;

/// Translational dynamics of a single propagated body, compiled from a force model table.
///
/// The mass component of the state is only integrated when `propagate_mass` is set, otherwise its
/// derivative is zero and the initial mass is kept throughout.
#[derive(Clone, Debug)]
pub struct TranslationalDynamics {
    body: String,
    gravity: Vec<PointMassGravity>,
    thrust: Vec<ThrustAcceleration>,
    propagate_mass: bool,
}

impl TranslationalDynamics {
    /// Builds the acceleration models acting on `body` from the table.
    pub fn build(
        table: &ForceModelTable,
        bodies: &BodyMap,
        body: &str,
        propagate_mass: bool,
    ) -> Result<Self, DynamicsError> {
        bodies.get(body).context(DynamicsAstroSnafu)?;

        let mut gravity = Vec::new();
        let mut thrust = Vec::new();
        for (exerting, settings) in table.acting_on(body) {
            match settings {
                AccelerationSettings::PointMassGravity => {
                    if exerting == body {
                        return Err(DynamicsError::UnsupportedModel {
                            model: "point mass gravity",
                            exerting: exerting.to_string(),
                            affected: body.to_string(),
                        });
                    }
                    let exerting_body = bodies.get(exerting).context(DynamicsAstroSnafu)?;
                    gravity.push(PointMassGravity::new(exerting_body).context(DynamicsAstroSnafu)?);
                }
                AccelerationSettings::Thrust(settings) => {
                    if exerting != body {
                        return Err(DynamicsError::UnsupportedModel {
                            model: "thrust",
                            exerting: exerting.to_string(),
                            affected: body.to_string(),
                        });
                    }
                    thrust.push(ThrustAcceleration::new(settings.clone()));
                }
            }
        }

        if gravity.is_empty() && thrust.is_empty() {
            return Err(DynamicsError::NoAccelerationModels {
                body: body.to_string(),
            });
        }

        trace!(
            "built dynamics of {body}: {} gravity field(s), {} thrust model(s)",
            gravity.len(),
            thrust.len()
        );

        Ok(Self {
            body: body.to_string(),
            gravity,
            thrust,
            propagate_mass,
        })
    }

    /// Name of the propagated body
    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn propagate_mass(&self) -> bool {
        self.propagate_mass
    }

    /// Equations of motion: time derivative of `[position, velocity, mass]`.
    pub fn eom(&self, epoch: Epoch, state_vec: &StateVector) -> Result<StateVector, DynamicsError> {
        let state = VehicleState::from_vector(epoch, state_vec);
        let accel = self.total_acceleration(&state)?;

        let mass_rate = if self.propagate_mass {
            let mut mass_rate = 0.0;
            for model in &self.thrust {
                mass_rate += model.mass_rate(&state)?;
            }
            mass_rate
        } else {
            0.0
        };

        Ok(StateVector::from_column_slice(&[
            state_vec[3],
            state_vec[4],
            state_vec[5],
            accel[0],
            accel[1],
            accel[2],
            mass_rate,
        ]))
    }

    /// Sum of all accelerations in m/s^2
    pub fn total_acceleration(&self, state: &VehicleState) -> Result<Vector3<f64>, DynamicsError> {
        Ok(self.gravity_acceleration(state)? + self.thrust_acceleration(state)?)
    }

    pub fn gravity_acceleration(
        &self,
        state: &VehicleState,
    ) -> Result<Vector3<f64>, DynamicsError> {
        let mut accel = Vector3::zeros();
        for model in &self.gravity {
            accel += model.eom(state)?;
        }
        Ok(accel)
    }

    pub fn thrust_acceleration(&self, state: &VehicleState) -> Result<Vector3<f64>, DynamicsError> {
        let mut accel = Vector3::zeros();
        for model in &self.thrust {
            accel += model.eom(state)?;
        }
        Ok(accel)
    }

    /// Sum of the thrust magnitudes in Newtons
    #[allow(non_snake_case)]
    pub fn thrust_N(&self, epoch: Epoch) -> f64 {
        self.thrust.iter().map(|model| model.magnitude_N(epoch)).sum()
    }
}

impl fmt::Display for TranslationalDynamics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let models: Vec<String> = self
            .gravity
            .iter()
            .map(|model| format!("{model}"))
            .chain(self.thrust.iter().map(|model| format!("{model}")))
            .collect();
        write!(f, "Translational dynamics of {}: {}", self.body, models.join("; "))
    }
}
