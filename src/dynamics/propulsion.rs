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

use super::guidance::{AscentGuidance, ConstantScalar, TimeVaryingScalar, TimeVaryingVector3};
use super::{AccelModel, DynamicsError};
use crate::cosmic::{VehicleState, STD_GRAVITY};
use crate::linalg::Vector3;
use crate::time::Epoch;
use std::fmt;
use std::sync::Arc;

/// Thrust acceleration settings: where the engine points, how hard it pushes, and how efficiently.
#[derive(Clone, Debug)]
pub struct ThrustAccelerationSettings {
    direction: Arc<dyn TimeVaryingVector3>,
    magnitude: Arc<dyn TimeVaryingScalar>,
    specific_impulse: Arc<dyn TimeVaryingScalar>,
}

impl ThrustAccelerationSettings {
    /// Thrust with the provided direction and magnitude (in Newtons), and a constant specific impulse in seconds.
    pub fn new(
        direction: Arc<dyn TimeVaryingVector3>,
        magnitude: Arc<dyn TimeVaryingScalar>,
        isp_s: f64,
    ) -> Self {
        Self {
            direction,
            magnitude,
            specific_impulse: Arc::new(ConstantScalar(isp_s)),
        }
    }

    /// Thrust whose direction and magnitude are both provided by the ascent guidance.
    pub fn from_guidance(guidance: Arc<AscentGuidance>, isp_s: f64) -> Self {
        Self::new(guidance.clone(), guidance, isp_s)
    }

    /// Unit thrust direction at the provided epoch
    pub fn direction(&self, epoch: Epoch) -> Vector3<f64> {
        self.direction.vector(epoch)
    }

    #[allow(non_snake_case)]
    pub fn magnitude_N(&self, epoch: Epoch) -> f64 {
        self.magnitude.value(epoch)
    }

    pub fn isp_s(&self, epoch: Epoch) -> f64 {
        self.specific_impulse.value(epoch)
    }
}

impl fmt::Display for ThrustAccelerationSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "thrust")
    }
}

/// Thrust acceleration model of the vehicle.
#[derive(Clone, Debug)]
pub struct ThrustAcceleration {
    settings: ThrustAccelerationSettings,
}

impl ThrustAcceleration {
    pub fn new(settings: ThrustAccelerationSettings) -> Self {
        Self { settings }
    }

    /// Thrust force in Newtons in the inertial frame
    #[allow(non_snake_case)]
    pub fn force_N(&self, epoch: Epoch) -> Vector3<f64> {
        let magnitude = self.settings.magnitude_N(epoch);
        if magnitude > 0.0 {
            magnitude * self.settings.direction(epoch)
        } else {
            Vector3::zeros()
        }
    }

    #[allow(non_snake_case)]
    pub fn magnitude_N(&self, epoch: Epoch) -> f64 {
        self.settings.magnitude_N(epoch).max(0.0)
    }
}

impl AccelModel for ThrustAcceleration {
    fn eom(&self, state: &VehicleState) -> Result<Vector3<f64>, DynamicsError> {
        if state.mass_kg <= 0.0 {
            return Err(DynamicsError::NonPositiveMass {
                mass_kg: state.mass_kg,
                epoch: state.epoch,
            });
        }
        Ok(self.force_N(state.epoch) / state.mass_kg)
    }

    fn mass_rate(&self, state: &VehicleState) -> Result<f64, DynamicsError> {
        let thrust_n = self.magnitude_N(state.epoch);
        if thrust_n == 0.0 {
            return Ok(0.0);
        }
        let isp_s = self.settings.isp_s(state.epoch);
        if isp_s <= 0.0 {
            return Err(DynamicsError::InvalidSpecificImpulse {
                isp_s,
                epoch: state.epoch,
            });
        }
        Ok(-thrust_n / (isp_s * STD_GRAVITY))
    }
}

impl fmt::Display for ThrustAcceleration {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.settings)
    }
}

#[test]
fn rocket_equation_rates() {
    #[derive(Debug)]
    struct Up;
    impl TimeVaryingVector3 for Up {
        fn vector(&self, _epoch: Epoch) -> Vector3<f64> {
            Vector3::z()
        }
    }

    let epoch = Epoch::from_tdb_seconds(0.0);
    let thrust = ThrustAcceleration::new(ThrustAccelerationSettings::new(
        Arc::new(Up),
        Arc::new(ConstantScalar(15_600.0)),
        311.0,
    ));
    let state = VehicleState::new(epoch, Vector3::zeros(), Vector3::zeros(), 4_700.0);
    let accel = thrust.eom(&state).unwrap();
    assert!((accel - Vector3::new(0.0, 0.0, 15_600.0 / 4_700.0)).norm() < 1e-12);
    let mdot = thrust.mass_rate(&state).unwrap();
    assert!((mdot + 15_600.0 / (311.0 * STD_GRAVITY)).abs() < 1e-12);

    let empty = VehicleState::new(epoch, Vector3::zeros(), Vector3::zeros(), 0.0);
    assert!(thrust.eom(&empty).is_err());

    let no_isp = ThrustAcceleration::new(ThrustAccelerationSettings::new(
        Arc::new(Up),
        Arc::new(ConstantScalar(1.0)),
        0.0,
    ));
    assert!(no_isp.mass_rate(&state).is_err());
}
