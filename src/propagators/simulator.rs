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
    DynamicsSnafu, IntegratorSettings, MultiTypePropagatorSettings, PropInstance,
    PropagationError, RSSCartesianStep, TerminationReason,
};
use crate::cosmic::{Body, BodyMap, VehicleState};
use crate::dynamics::{DynamicsAstroSnafu, TranslationalDynamics};
use crate::md::{DependentVariable, Trajectory};
use crate::time::Duration;
use snafu::ResultExt;
use std::fmt;
use std::time::Instant;

/// Runs a full propagation from the settings and returns the state and dependent variable histories.
///
/// Implementors must not retain any state between two calls: the same inputs yield the same trajectory.
pub trait PropagationEngine: Clone + Send + Sync + fmt::Debug {
    fn propagate(
        &self,
        bodies: &BodyMap,
        integrator: &IntegratorSettings,
        settings: &MultiTypePropagatorSettings,
    ) -> Result<Trajectory, PropagationError>;
}

/// Propagates a single arc from the initial epoch until the first termination condition is met.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SingleArcSimulator {
    /// Safety net for terminations which are never met, e.g. an altitude the vehicle cannot reach
    pub max_steps: usize,
}

impl Default for SingleArcSimulator {
    fn default() -> Self {
        Self { max_steps: 1_000_000 }
    }
}

impl SingleArcSimulator {
    pub fn new(max_steps: usize) -> Self {
        Self { max_steps }
    }
}

fn dependent_values(
    variables: &[DependentVariable],
    state: &VehicleState,
    central_body: &Body,
    dynamics: &TranslationalDynamics,
) -> Result<Vec<f64>, PropagationError> {
    variables
        .iter()
        .map(|var| var.compute(state, central_body, dynamics))
        .collect::<Result<Vec<f64>, _>>()
        .context(DynamicsSnafu)
}

impl PropagationEngine for SingleArcSimulator {
    fn propagate(
        &self,
        bodies: &BodyMap,
        integrator: &IntegratorSettings,
        settings: &MultiTypePropagatorSettings,
    ) -> Result<Trajectory, PropagationError> {
        integrator.validate()?;
        settings.validate()?;

        let translational = settings.translational()?;
        let dynamics = translational.dynamics()?;
        let central_body = bodies
            .get(&translational.central_body)
            .context(DynamicsAstroSnafu)
            .context(DynamicsSnafu)?;

        let init = settings.initial_state(bodies, integrator.initial_epoch)?;
        let end_epoch = settings
            .termination
            .iter()
            .filter_map(|condition| condition.end_epoch(init.epoch))
            .min();

        let mut traj = Trajectory::new(settings.dependent_variables.clone());
        traj.push(
            init,
            dependent_values(&settings.dependent_variables, &init, central_body, dynamics)?,
        );

        let tick = Instant::now();
        info!("Propagating {settings} with {integrator}");
        trace!("{dynamics}");

        let mut prop = PropInstance::<RSSCartesianStep>::new(init, dynamics, integrator);
        let mut steps = 0;
        loop {
            let max_step = end_epoch.map(|end| end - prop.state.epoch);
            prop.single_step(max_step)?;
            steps += 1;

            let state = prop.state;
            if !state.is_finite() {
                warn!("state diverged after {steps} steps: {state}");
                return Err(PropagationError::Diverged {
                    epoch: state.epoch,
                    steps,
                });
            }
            trace!("{state}\t{}", prop.latest_details());

            traj.push(
                state,
                dependent_values(&settings.dependent_variables, &state, central_body, dynamics)?,
            );

            if let Some(condition) = settings
                .termination
                .iter()
                .find(|condition| condition.is_met(&state, central_body, init.epoch))
            {
                let reason = TerminationReason {
                    condition: *condition,
                    epoch: state.epoch,
                    elapsed: state.epoch - init.epoch,
                };
                let tock: Duration = tick.elapsed().into();
                info!("Done in {tock} ({steps} steps): {reason}");
                traj.termination = Some(reason);
                return Ok(traj);
            }

            if steps >= self.max_steps {
                return Err(PropagationError::MaxStepsReached {
                    epoch: state.epoch,
                    steps,
                });
            }
        }
    }
}
