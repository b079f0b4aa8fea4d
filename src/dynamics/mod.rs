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

use crate::cosmic::{AstroError, VehicleState};
use crate::linalg::Vector3;
use crate::time::Epoch;
use snafu::Snafu;
use std::fmt;

/// Guidance laws, i.e. the thrust direction and magnitude as functions of time.
pub mod guidance;

/// The force model table and its acceleration settings.
pub mod table;
pub use self::table::*;

/// Point mass gravity.
pub mod gravity;
pub use self::gravity::*;

/// Thrust acceleration and its settings.
pub mod propulsion;
pub use self::propulsion::*;

/// Translational dynamics of the vehicle, compiled from the force model table.
pub mod orbital;
pub use self::orbital::*;

/// A trait for immutable dynamics that return an acceleration on the vehicle.
pub trait AccelModel: Send + Sync + fmt::Display {
    /// Acceleration in m/s^2 in the inertial frame.
    fn eom(&self, state: &VehicleState) -> Result<Vector3<f64>, DynamicsError>;

    /// Mass rate in kg/s caused by this model, zero for anything but engines.
    fn mass_rate(&self, _state: &VehicleState) -> Result<f64, DynamicsError> {
        Ok(0.0)
    }
}

/// Dynamical model errors.
#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum DynamicsError {
    /// The vehicle mass is zero or negative.
    #[snafu(display("vehicle mass is not positive ({mass_kg} kg) at {epoch}"))]
    NonPositiveMass { mass_kg: f64, epoch: Epoch },
    /// The specific impulse of a thrust model is zero or negative.
    #[snafu(display("specific impulse is not positive ({isp_s} s) at {epoch}"))]
    InvalidSpecificImpulse { isp_s: f64, epoch: Epoch },
    /// Astrodynamics error.
    #[snafu(display("dynamical model encountered an astro error: {source}"))]
    DynamicsAstro { source: AstroError },
    /// This model cannot be set between these two bodies.
    #[snafu(display("{model} cannot be exerted by {exerting} on {affected}"))]
    UnsupportedModel {
        model: &'static str,
        exerting: String,
        affected: String,
    },
    /// No model acts on the propagated body.
    #[snafu(display("no acceleration model acts on {body}"))]
    NoAccelerationModels { body: String },
}
