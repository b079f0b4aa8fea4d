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

use super::{unit_vector_in_plane, GuidanceError, TimeVaryingScalar, TimeVaryingVector3};
use crate::cosmic::Engine;
use crate::linalg::Vector3;
use crate::time::Epoch;
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Below this norm, a vector is considered null when building the launch frame.
const NULL_NORM: f64 = 1e-9;

/// Layout of the decision vector of the ascent guidance.
///
/// The decision vector is `[throttle, pitch_0, ..., pitch_{n-1}]`: the throttle scales the
/// maximum thrust of the engine, and the pitch angles (in radians, from the local horizontal
/// towards the local vertical) are defined at `n` nodes spaced by `node_interval_s` from the
/// reference epoch. Pitch is linearly interpolated between nodes and held constant outside them.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AscentParameterization {
    pub node_count: usize,
    pub node_interval_s: f64,
    /// Thrust is cut off after this duration from the reference epoch, if set
    #[serde(default)]
    pub burn_duration_s: Option<f64>,
}

impl Default for AscentParameterization {
    /// A single, constant pitch angle and no engine cut-off.
    fn default() -> Self {
        Self {
            node_count: 1,
            node_interval_s: 60.0,
            burn_duration_s: None,
        }
    }
}

impl AscentParameterization {
    /// Number of decision variables expected by this parameterization.
    pub fn len(&self) -> usize {
        1 + self.node_count
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn validate(&self) -> Result<(), GuidanceError> {
        if self.node_count == 0 {
            return Err(GuidanceError::InvalidSchema {
                reason: "at least one pitch node is required".to_string(),
            });
        }
        if !(self.node_interval_s > 0.0 && self.node_interval_s.is_finite()) {
            return Err(GuidanceError::InvalidSchema {
                reason: format!(
                    "node interval must be strictly positive, got {} s",
                    self.node_interval_s
                ),
            });
        }
        if let Some(burn_s) = self.burn_duration_s {
            if !(burn_s >= 0.0 && burn_s.is_finite()) {
                return Err(GuidanceError::InvalidSchema {
                    reason: format!("burn duration must be positive, got {burn_s} s"),
                });
            }
        }
        Ok(())
    }

    /// Checks the shape and the values of a decision vector against this parameterization.
    pub fn check(&self, decision: &[f64]) -> Result<(), GuidanceError> {
        if decision.len() != self.len() {
            return Err(GuidanceError::InvalidParameterization {
                expected: self.len(),
                got: decision.len(),
            });
        }
        if let Some((index, value)) = decision
            .iter()
            .enumerate()
            .find(|(_, value)| !value.is_finite())
        {
            return Err(GuidanceError::NonFiniteVariable {
                index,
                value: *value,
            });
        }
        if !(0.0..=1.0).contains(&decision[0]) {
            return Err(GuidanceError::ThrottleRatio { ratio: decision[0] });
        }
        Ok(())
    }
}

/// Orthonormal local frame at the launch site: local vertical and downrange direction.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LaunchFrame {
    up: Vector3<f64>,
    downrange: Vector3<f64>,
}

impl LaunchFrame {
    /// Builds the frame from a vertical and a downrange hint, which is projected on the local
    /// horizontal plane.
    pub fn new(up: Vector3<f64>, downrange_hint: Vector3<f64>) -> Result<Self, GuidanceError> {
        if up.norm() < NULL_NORM {
            return Err(GuidanceError::DegenerateLaunchFrame {
                reason: "vehicle is at the center of the central body",
            });
        }
        let up = up.normalize();
        let horizontal = downrange_hint - downrange_hint.dot(&up) * up;
        if horizontal.norm() < NULL_NORM {
            return Err(GuidanceError::DegenerateLaunchFrame {
                reason: "downrange direction is vertical",
            });
        }
        Ok(Self {
            up,
            downrange: horizontal.normalize(),
        })
    }

    /// Builds the launch frame from the initial state of the vehicle relative to the central body.
    ///
    /// Downrange follows the horizontal velocity if there is any. A vehicle at rest launches
    /// eastward, or along +X from the poles.
    pub fn from_state(
        relative_position_m: Vector3<f64>,
        relative_velocity_m_s: Vector3<f64>,
    ) -> Result<Self, GuidanceError> {
        if relative_position_m.norm() < NULL_NORM {
            return Err(GuidanceError::DegenerateLaunchFrame {
                reason: "vehicle is at the center of the central body",
            });
        }
        let up = relative_position_m.normalize();
        let horizontal_velocity = relative_velocity_m_s - relative_velocity_m_s.dot(&up) * up;
        if horizontal_velocity.norm() > NULL_NORM {
            return Self::new(up, horizontal_velocity);
        }
        let east = Vector3::z().cross(&up);
        if east.norm() > NULL_NORM {
            Self::new(up, east)
        } else {
            Self::new(up, Vector3::x())
        }
    }

    pub fn up(&self) -> Vector3<f64> {
        self.up
    }

    pub fn downrange(&self) -> Vector3<f64> {
        self.downrange
    }
}

/// What the ascent guidance needs to know about the vehicle.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VehicleContext {
    pub engine: Engine,
    pub frame: LaunchFrame,
}

/// Thrust guidance of the ascent, fully defined by a decision vector and a reference epoch.
///
/// Provides both the thrust direction and the thrust magnitude, so a single instance is shared by
/// both halves of the thrust model.
#[derive(Clone, Debug, PartialEq)]
pub struct AscentGuidance {
    context: VehicleContext,
    epoch: Epoch,
    throttle: f64,
    pitch_nodes_rad: Vec<f64>,
    node_interval_s: f64,
    burn_duration_s: Option<f64>,
}

impl AscentGuidance {
    /// Builds the guidance, after checking the decision vector against the parameterization.
    pub fn new(
        context: VehicleContext,
        epoch: Epoch,
        decision: &[f64],
        parameterization: &AscentParameterization,
    ) -> Result<Self, GuidanceError> {
        parameterization.validate()?;
        parameterization.check(decision)?;
        Ok(Self {
            context,
            epoch,
            throttle: decision[0],
            pitch_nodes_rad: decision[1..].to_vec(),
            node_interval_s: parameterization.node_interval_s,
            burn_duration_s: parameterization.burn_duration_s,
        })
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn throttle(&self) -> f64 {
        self.throttle
    }

    /// Pitch angle at the provided epoch, in radians
    pub fn pitch_rad(&self, epoch: Epoch) -> f64 {
        let last = self.pitch_nodes_rad.len() - 1;
        let s = (epoch - self.epoch).to_seconds() / self.node_interval_s;
        if last == 0 || s <= 0.0 {
            return self.pitch_nodes_rad[0];
        }
        if s >= last as f64 {
            return self.pitch_nodes_rad[last];
        }
        let idx = s.floor() as usize;
        let frac = s - idx as f64;
        self.pitch_nodes_rad[idx]
            + frac * (self.pitch_nodes_rad[idx + 1] - self.pitch_nodes_rad[idx])
    }

    /// Whether the engine is on at the provided epoch
    pub fn thrusting(&self, epoch: Epoch) -> bool {
        let t = (epoch - self.epoch).to_seconds();
        match self.burn_duration_s {
            Some(burn_s) => (0.0..=burn_s).contains(&t),
            None => t >= 0.0,
        }
    }
}

impl TimeVaryingVector3 for AscentGuidance {
    fn vector(&self, epoch: Epoch) -> Vector3<f64> {
        unit_vector_in_plane(
            self.pitch_rad(epoch),
            &self.context.frame.downrange,
            &self.context.frame.up,
        )
    }
}

impl TimeVaryingScalar for AscentGuidance {
    fn value(&self, epoch: Epoch) -> f64 {
        if self.thrusting(epoch) {
            self.throttle * self.context.engine.max_thrust_N
        } else {
            0.0
        }
    }
}

impl fmt::Display for AscentGuidance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Ascent guidance from {} @ {:.2}% of {:.1} N",
            self.epoch,
            100.0 * self.throttle,
            self.context.engine.max_thrust_N
        )?;
        for (i, pitch) in self.pitch_nodes_rad.iter().enumerate() {
            write!(
                f,
                "\n\tpitch #{i} @ +{:.1} s: {:.3} deg",
                i as f64 * self.node_interval_s,
                pitch.to_degrees()
            )?;
        }
        Ok(())
    }
}
