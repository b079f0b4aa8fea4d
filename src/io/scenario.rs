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

use super::{ConfigError, ConfigRepr};
use crate::cosmic::{Body, BodyMap, Engine, MOON, MOON_GM_M3_S2, MOON_MEAN_RADIUS_M, VEHICLE};
use crate::dynamics::guidance::AscentParameterization;
use crate::dynamics::{AccelerationSettings, ForceModelTable};
use crate::linalg::Vector3;
use crate::md::DependentVariable;
use crate::opti::{LunarAscentProblem, ProblemError};
use crate::propagators::{
    IntegratorMethod, IntegratorSettings, MassPropagatorSettings, MultiTypePropagatorSettings,
    TerminationCondition, TranslationalStatePropagatorSettings,
};
use crate::time::{Epoch, Unit};
use serde_derive::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CentralBodyConfig {
    pub name: String,
    pub gm_m3_s2: f64,
    pub mean_radius_m: f64,
}

impl Default for CentralBodyConfig {
    fn default() -> Self {
        Self {
            name: MOON.to_string(),
            gm_m3_s2: MOON_GM_M3_S2,
            mean_radius_m: MOON_MEAN_RADIUS_M,
        }
    }
}

fn default_vehicle_name() -> String {
    VEHICLE.to_string()
}

#[allow(non_snake_case)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VehicleConfig {
    #[serde(default = "default_vehicle_name")]
    pub name: String,
    pub mass_kg: f64,
    pub max_thrust_N: f64,
    pub specific_impulse_s: f64,
    /// When false, the mass stays constant throughout the ascent
    #[serde(default)]
    pub propagate_mass: bool,
}

fn default_launch_direction() -> [f64; 3] {
    [1.0, 0.0, 0.0]
}

/// Initial state of the vehicle: on a sphere of the central body's mean radius plus the altitude,
/// along the provided direction from the center of the central body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LaunchConfig {
    #[serde(default)]
    pub altitude_m: f64,
    #[serde(default = "default_launch_direction")]
    pub direction: [f64; 3],
    #[serde(default)]
    pub velocity_m_s: [f64; 3],
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            altitude_m: 0.0,
            direction: default_launch_direction(),
            velocity_m_s: [0.0; 3],
        }
    }
}

/// Integrator options, any unset option uses the default of `IntegratorSettings`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct IntegratorConfig {
    #[serde(default)]
    pub method: IntegratorMethod,
    pub init_step_s: Option<f64>,
    pub min_step_s: Option<f64>,
    pub max_step_s: Option<f64>,
    pub tolerance: Option<f64>,
    pub attempts: Option<u8>,
    #[serde(default)]
    pub fixed_step: bool,
}

/// The propagation stops as soon as one of the set conditions is met.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TerminationConfig {
    pub time_of_flight_s: Option<f64>,
    pub altitude_above_m: Option<f64>,
    pub altitude_below_m: Option<f64>,
    pub mass_below_kg: Option<f64>,
}

impl TerminationConfig {
    pub fn conditions(&self) -> Vec<TerminationCondition> {
        [
            self.time_of_flight_s.map(TerminationCondition::TimeOfFlight),
            self.altitude_above_m.map(TerminationCondition::AltitudeAbove),
            self.altitude_below_m.map(TerminationCondition::AltitudeBelow),
            self.mass_below_kg.map(TerminationCondition::MassBelow),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// A lunar ascent scenario: everything needed to build a `LunarAscentProblem`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AscentScenario {
    /// Initial epoch, in TDB seconds past J2000
    #[serde(default)]
    pub epoch_tdb_s: f64,
    #[serde(default)]
    pub central_body: CentralBodyConfig,
    pub vehicle: VehicleConfig,
    #[serde(default)]
    pub launch: LaunchConfig,
    #[serde(default)]
    pub integrator: IntegratorConfig,
    /// Layout of the decision vector, defaults to nodes 60 seconds apart
    pub guidance: Option<AscentParameterization>,
    /// Bounds of the decision variables: throttle first, then the pitch angles in radians
    pub bounds: Vec<(f64, f64)>,
    pub termination: TerminationConfig,
    #[serde(default)]
    pub dependent_variables: Vec<DependentVariable>,
}

impl ConfigRepr for AscentScenario {}

impl AscentScenario {
    pub fn epoch(&self) -> Epoch {
        Epoch::from_tdb_seconds(self.epoch_tdb_s)
    }

    pub fn bodies(&self) -> BodyMap {
        BodyMap::new()
            .with(Body::celestial(
                &self.central_body.name,
                self.central_body.gm_m3_s2,
                self.central_body.mean_radius_m,
            ))
            .with(Body::vehicle(
                &self.vehicle.name,
                self.vehicle.mass_kg,
                Engine {
                    max_thrust_N: self.vehicle.max_thrust_N,
                },
            ))
    }

    pub fn integrator(&self) -> IntegratorSettings {
        let cfg = &self.integrator;
        let mut opts = IntegratorSettings::builder()
            .initial_epoch(self.epoch())
            .method(cfg.method)
            .fixed_step(cfg.fixed_step)
            .build();
        if let Some(min_step_s) = cfg.min_step_s {
            opts.set_min_step(min_step_s * Unit::Second);
        }
        if let Some(max_step_s) = cfg.max_step_s {
            opts.set_max_step(max_step_s * Unit::Second);
        }
        if let Some(init_step_s) = cfg.init_step_s {
            opts.init_step = init_step_s * Unit::Second;
        }
        if let Some(tolerance) = cfg.tolerance {
            opts.tolerance = tolerance;
        }
        if let Some(attempts) = cfg.attempts {
            opts.attempts = attempts;
        }
        opts
    }

    pub fn propagator(&self) -> Result<MultiTypePropagatorSettings, ConfigError> {
        let direction = Vector3::from_column_slice(&self.launch.direction);
        if !(direction.norm() > 0.0 && direction.norm().is_finite()) {
            return Err(ConfigError::InvalidConfig {
                reason: format!("launch direction must be a non-null vector, got {direction:?}"),
            });
        }
        let termination = self.termination.conditions();
        if termination.is_empty() {
            return Err(ConfigError::InvalidConfig {
                reason: "at least one termination condition is required".to_string(),
            });
        }

        let radius_m = self.central_body.mean_radius_m + self.launch.altitude_m;
        let force_models = ForceModelTable::new().with(
            &self.central_body.name,
            &self.vehicle.name,
            AccelerationSettings::PointMassGravity,
        );
        let translational = TranslationalStatePropagatorSettings::new(
            &self.central_body.name,
            &self.vehicle.name,
            radius_m * direction.normalize(),
            Vector3::from_column_slice(&self.launch.velocity_m_s),
            force_models,
        );
        let mass = self.vehicle.propagate_mass.then_some(MassPropagatorSettings {
            initial_mass_kg: self.vehicle.mass_kg,
        });

        Ok(MultiTypePropagatorSettings::new(
            translational,
            mass,
            termination,
            self.dependent_variables.clone(),
        ))
    }

    /// Builds the problem described by this scenario.
    pub fn to_problem(&self) -> Result<LunarAscentProblem, ProblemError> {
        let propagator = self
            .propagator()
            .map_err(|source| ProblemError::Configuration { source })?;
        let problem = LunarAscentProblem::new(
            self.bodies(),
            self.integrator(),
            propagator,
            self.bounds.clone(),
            self.vehicle.specific_impulse_s,
        )?;
        match self.guidance {
            Some(parameterization) => problem.with_parameterization(parameterization),
            None => Ok(problem),
        }
    }
}
