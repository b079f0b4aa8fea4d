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

use super::{DynamicsSnafu, PropagationError, TerminationCondition};
use crate::cosmic::{BodyMap, VehicleState};
use crate::dynamics::{DynamicsAstroSnafu, ForceModelTable, TranslationalDynamics};
use crate::linalg::Vector3;
use crate::md::DependentVariable;
use crate::time::Epoch;
use snafu::ResultExt;
use std::fmt;

/// Settings of the translational state propagation of a single body around a central body.
///
/// The force model table is the source of truth. The dynamics compiled from it are cached along
/// with the table revision they were built from: any change to the table makes them stale until
/// `reset_acceleration_models` is called.
#[derive(Clone, Debug)]
pub struct TranslationalStatePropagatorSettings {
    pub central_body: String,
    pub propagated_body: String,
    /// Initial position in the inertial frame, in meters
    pub initial_position_m: Vector3<f64>,
    /// Initial velocity in the inertial frame, in meters per second
    pub initial_velocity_m_s: Vector3<f64>,
    force_models: ForceModelTable,
    compiled: Option<(u64, TranslationalDynamics)>,
}

impl TranslationalStatePropagatorSettings {
    pub fn new(
        central_body: &str,
        propagated_body: &str,
        initial_position_m: Vector3<f64>,
        initial_velocity_m_s: Vector3<f64>,
        force_models: ForceModelTable,
    ) -> Self {
        Self {
            central_body: central_body.to_string(),
            propagated_body: propagated_body.to_string(),
            initial_position_m,
            initial_velocity_m_s,
            force_models,
            compiled: None,
        }
    }

    pub fn force_models(&self) -> &ForceModelTable {
        &self.force_models
    }

    /// Mutable access to the force models: any mutation makes the compiled dynamics stale.
    pub fn force_models_mut(&mut self) -> &mut ForceModelTable {
        &mut self.force_models
    }

    /// Rebuilds the acceleration models from the current force model table.
    pub fn reset_acceleration_models(
        &mut self,
        bodies: &BodyMap,
        propagate_mass: bool,
    ) -> Result<(), PropagationError> {
        bodies
            .get(&self.central_body)
            .context(DynamicsAstroSnafu)
            .context(DynamicsSnafu)?;
        let dynamics = TranslationalDynamics::build(
            &self.force_models,
            bodies,
            &self.propagated_body,
            propagate_mass,
        )
        .context(DynamicsSnafu)?;
        debug!(
            "acceleration models rebuilt at rev. {}: {dynamics}",
            self.force_models.revision()
        );
        self.compiled = Some((self.force_models.revision(), dynamics));
        Ok(())
    }

    /// Revision of the force model table the current dynamics were built from, if any
    pub fn models_revision(&self) -> Option<u64> {
        self.compiled.as_ref().map(|(revision, _)| *revision)
    }

    /// The compiled dynamics, only if they are in sync with the force model table.
    pub fn dynamics(&self) -> Result<&TranslationalDynamics, PropagationError> {
        match &self.compiled {
            None => Err(PropagationError::ModelsNotBuilt),
            Some((built, _)) if *built != self.force_models.revision() => {
                Err(PropagationError::StaleModels {
                    built: *built,
                    current: self.force_models.revision(),
                })
            }
            Some((_, dynamics)) => Ok(dynamics),
        }
    }
}

/// Settings of the mass propagation of the vehicle: its mass rate follows from the thrust models.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct MassPropagatorSettings {
    pub initial_mass_kg: f64,
}

/// Propagator settings of several state types propagated together, with the termination
/// conditions and the dependent variables to save.
#[derive(Clone, Debug)]
pub struct MultiTypePropagatorSettings {
    pub translational: Option<TranslationalStatePropagatorSettings>,
    /// When unset, the mass of the propagated body is used as a constant
    pub mass: Option<MassPropagatorSettings>,
    pub termination: Vec<TerminationCondition>,
    pub dependent_variables: Vec<DependentVariable>,
}

impl MultiTypePropagatorSettings {
    pub fn new(
        translational: TranslationalStatePropagatorSettings,
        mass: Option<MassPropagatorSettings>,
        termination: Vec<TerminationCondition>,
        dependent_variables: Vec<DependentVariable>,
    ) -> Self {
        Self {
            translational: Some(translational),
            mass,
            termination,
            dependent_variables,
        }
    }

    pub fn translational(&self) -> Result<&TranslationalStatePropagatorSettings, PropagationError> {
        self.translational
            .as_ref()
            .ok_or_else(|| PropagationError::InvalidSettings {
                reason: "no translational state propagator settings".to_string(),
            })
    }

    pub fn translational_mut(
        &mut self,
    ) -> Result<&mut TranslationalStatePropagatorSettings, PropagationError> {
        self.translational
            .as_mut()
            .ok_or_else(|| PropagationError::InvalidSettings {
                reason: "no translational state propagator settings".to_string(),
            })
    }

    pub fn propagates_mass(&self) -> bool {
        self.mass.is_some()
    }

    /// Rebuilds the models of every integrated state type from their current settings.
    pub fn reset_integrated_state_models(
        &mut self,
        bodies: &BodyMap,
    ) -> Result<(), PropagationError> {
        let propagate_mass = self.propagates_mass();
        self.translational_mut()?
            .reset_acceleration_models(bodies, propagate_mass)
    }

    /// Checks that these settings can be propagated: the compiled models must be up to date.
    pub fn validate(&self) -> Result<(), PropagationError> {
        self.translational()?.dynamics()?;
        if self.termination.is_empty() {
            return Err(PropagationError::InvalidSettings {
                reason: "at least one termination condition is required".to_string(),
            });
        }
        for condition in &self.termination {
            condition.validate()?;
        }
        if let Some(mass) = self.mass {
            if !(mass.initial_mass_kg > 0.0 && mass.initial_mass_kg.is_finite()) {
                return Err(PropagationError::InvalidSettings {
                    reason: format!(
                        "initial mass must be positive, got {} kg",
                        mass.initial_mass_kg
                    ),
                });
            }
        }
        Ok(())
    }

    /// Initial state of the propagated body at the provided epoch.
    pub fn initial_state(
        &self,
        bodies: &BodyMap,
        epoch: Epoch,
    ) -> Result<VehicleState, PropagationError> {
        let translational = self.translational()?;
        let mass_kg = match self.mass {
            Some(mass) => mass.initial_mass_kg,
            None => bodies
                .get(&translational.propagated_body)
                .and_then(|body| body.mass_kg())
                .context(DynamicsAstroSnafu)
                .context(DynamicsSnafu)?,
        };
        Ok(VehicleState::new(
            epoch,
            translational.initial_position_m,
            translational.initial_velocity_m_s,
            mass_kg,
        ))
    }
}

impl fmt::Display for MultiTypePropagatorSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.translational {
            Some(translational) => write!(
                f,
                "{} around {}",
                translational.propagated_body, translational.central_body
            )?,
            None => write!(f, "(no translational state)")?,
        }
        if let Some(mass) = self.mass {
            write!(f, " with mass from {} kg", mass.initial_mass_kg)?;
        }
        let conditions: Vec<String> = self.termination.iter().map(|c| format!("{c}")).collect();
        write!(f, " until {}", conditions.join(" or "))
    }
}
