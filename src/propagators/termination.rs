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

use super::PropagationError;
use crate::cosmic::{Body, VehicleState};
use crate::time::{Duration, Epoch, Unit};
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Stops the propagation when met. Altitudes are above the mean radius of the central body.
///
/// Conditions are evaluated after each accepted step, never on the initial state, so that a
/// vehicle sitting on the surface does not immediately trigger an `AltitudeBelow(0.0)`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationCondition {
    /// Duration of the propagation in seconds, hit exactly by the last step
    TimeOfFlight(f64),
    /// Altitude in meters at or above which the propagation stops
    AltitudeAbove(f64),
    /// Altitude in meters strictly below which the propagation stops
    AltitudeBelow(f64),
    /// Mass in kg strictly below which the propagation stops
    MassBelow(f64),
}

impl TerminationCondition {
    pub fn validate(&self) -> Result<(), PropagationError> {
        let (name, value) = match self {
            Self::TimeOfFlight(tof_s) => {
                if *tof_s <= 0.0 {
                    return Err(PropagationError::InvalidSettings {
                        reason: format!("time of flight must be positive, got {tof_s} s"),
                    });
                }
                ("time of flight", *tof_s)
            }
            Self::AltitudeAbove(alt_m) | Self::AltitudeBelow(alt_m) => ("altitude", *alt_m),
            Self::MassBelow(mass_kg) => ("mass", *mass_kg),
        };
        if value.is_finite() {
            Ok(())
        } else {
            Err(PropagationError::InvalidSettings {
                reason: format!("{name} termination must be finite, got {value}"),
            })
        }
    }

    /// Epoch at which this condition is met, if it only depends on time.
    pub fn end_epoch(&self, initial_epoch: Epoch) -> Option<Epoch> {
        match self {
            Self::TimeOfFlight(tof_s) => Some(initial_epoch + *tof_s * Unit::Second),
            _ => None,
        }
    }

    /// Returns whether the provided state meets this condition.
    pub fn is_met(&self, state: &VehicleState, central_body: &Body, initial_epoch: Epoch) -> bool {
        let altitude_m = || {
            state.relative_position_m(&central_body.position_m).norm() - central_body.mean_radius_m
        };
        match self {
            Self::TimeOfFlight(tof_s) => state.epoch >= initial_epoch + *tof_s * Unit::Second,
            Self::AltitudeAbove(alt_m) => altitude_m() >= *alt_m,
            Self::AltitudeBelow(alt_m) => altitude_m() < *alt_m,
            Self::MassBelow(mass_kg) => state.mass_kg < *mass_kg,
        }
    }
}

impl fmt::Display for TerminationCondition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::TimeOfFlight(tof_s) => write!(f, "{}", *tof_s * Unit::Second),
            Self::AltitudeAbove(alt_m) => write!(f, "altitude >= {alt_m} m"),
            Self::AltitudeBelow(alt_m) => write!(f, "altitude < {alt_m} m"),
            Self::MassBelow(mass_kg) => write!(f, "mass < {mass_kg} kg"),
        }
    }
}

/// Why and when a propagation stopped.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TerminationReason {
    pub condition: TerminationCondition,
    pub epoch: Epoch,
    /// Duration from the initial epoch
    pub elapsed: Duration,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} met at {} (after {})", self.condition, self.epoch, self.elapsed)
    }
}
