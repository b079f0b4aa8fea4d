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

use super::error_ctrl::ErrorCtrl;
use super::{ButcherTable, DynamicsSnafu, IntegrationDetails, IntegratorSettings, PropagationError};
use crate::cosmic::{StateVector, VehicleState};
use crate::dynamics::TranslationalDynamics;
use crate::time::{Duration, Unit};
use snafu::ResultExt;
use std::marker::PhantomData;

/// A PropInstance takes single integration steps of the translational dynamics.
///
/// It includes the options, the integrator details of the previous step, and the Butcher table
/// of the integration method. The step size adapts from one call to the next.
#[derive(Debug)]
pub struct PropInstance<'a, E: ErrorCtrl> {
    /// The state of this propagator instance
    pub state: VehicleState,
    pub dynamics: &'a TranslationalDynamics,
    pub opts: &'a IntegratorSettings,
    /// Stores the details of the previous integration step
    pub details: IntegrationDetails,
    table: ButcherTable,
    step_size: Duration, // Stores the adapted step for the _next_ call
    fixed_step: bool,
    // Allows us to do pre-allocation of the ki vectors
    k: Vec<StateVector>,
    _error_ctrl: PhantomData<E>,
}

impl<'a, E: ErrorCtrl> PropInstance<'a, E> {
    pub fn new(
        state: VehicleState,
        dynamics: &'a TranslationalDynamics,
        opts: &'a IntegratorSettings,
    ) -> Self {
        let table = ButcherTable::from(opts.method);
        Self {
            state,
            dynamics,
            opts,
            details: IntegrationDetails {
                step: opts.init_step,
                error: 0.0,
                attempts: 1,
            },
            table,
            step_size: opts.init_step,
            fixed_step: opts.is_fixed_step(),
            k: vec![StateVector::zeros(); table.stages],
            _error_ctrl: PhantomData,
        }
    }

    /// The step size the next call to `single_step` will attempt
    pub fn step_size(&self) -> Duration {
        self.step_size
    }

    /// Take a single propagator step of at most `max_step`, which is taken exactly if it's smaller
    /// than the current step size (e.g. to land on the final epoch).
    pub fn single_step(&mut self, max_step: Option<Duration>) -> Result<(), PropagationError> {
        let (step, state_vec) = match max_step {
            Some(max_step) if max_step < self.step_size => {
                // Take one final step of exactly the needed duration and restore the step size
                let prev_step_size = self.step_size;
                let prev_fixed = self.fixed_step;
                self.step_size = max_step;
                self.fixed_step = true;
                let rslt = self.derive();
                self.step_size = prev_step_size;
                self.fixed_step = prev_fixed;
                rslt?
            }
            _ => self.derive()?,
        };
        self.state = VehicleState::from_vector(self.state.epoch + step, &state_vec);
        Ok(())
    }

    /// This method integrates the dynamics over one step. Everything passed to this function is in **seconds**.
    ///
    /// This function returns the step sized used (as a Duration) and the new state as y_{n+1} = y_n + \frac{dy_n}{dt}.
    /// To get the integration details, check `self.details`.
    fn derive(&mut self) -> Result<(Duration, StateVector), PropagationError> {
        let state_vec = self.state.to_vector();
        let epoch = self.state.epoch;
        // Reset the number of attempts used (we don't reset the error because it's set before it's read)
        self.details.attempts = 1;
        // Convert the step size to seconds -- it's mutable because we may change it below
        let mut step_size = self.step_size.to_seconds();
        let stages = self.table.stages;
        loop {
            self.k[0] = self.dynamics.eom(epoch, &state_vec).context(DynamicsSnafu)?;
            let mut a_idx: usize = 0;
            for i in 0..(stages - 1) {
                // Let's compute the c_i by summing the relevant items from the list of coefficients.
                // \sum_{j=1}^{i-1} a_ij  ∀ i ∈ [2, s]
                let mut ci: f64 = 0.0;
                // The wi stores the a_{s1} * k_1 + a_{s2} * k_2 + ... + a_{s, s-1} * k_{s-1} +
                let mut wi = StateVector::zeros();
                for kj in &self.k[0..i + 1] {
                    let a_ij = self.table.a_coeffs[a_idx];
                    ci += a_ij;
                    wi += a_ij * kj;
                    a_idx += 1;
                }

                self.k[i + 1] = self
                    .dynamics
                    .eom(
                        epoch + (ci * step_size) * Unit::Second,
                        &(state_vec + step_size * wi),
                    )
                    .context(DynamicsSnafu)?;
            }
            // Compute the next state and the error
            let mut next_state = state_vec;
            // State error estimation from https://en.wikipedia.org/wiki/Runge%E2%80%93Kutta_methods#Adaptive_Runge%E2%80%93Kutta_methods
            let mut error_est = StateVector::zeros();
            for (i, ki) in self.k.iter().enumerate() {
                let b_i = self.table.b_coeffs[i];
                if !self.fixed_step {
                    let b_i_star = self.table.b_coeffs[i + stages];
                    error_est += step_size * (b_i - b_i_star) * ki;
                }
                next_state += step_size * b_i * ki;
            }

            if self.fixed_step {
                // Using a fixed step, no adaptive step necessary
                self.details.step = self.step_size;
                return Ok((self.details.step, next_state));
            }

            // Compute the error estimate.
            self.details.error = E::estimate(&error_est, &next_state, &state_vec);
            if self.details.error <= self.opts.tolerance
                || step_size <= self.opts.min_step.to_seconds()
                || self.details.attempts >= self.opts.attempts
            {
                if self.details.attempts >= self.opts.attempts {
                    warn!(
                        "Could not further decrease step size: maximum number of attempts reached ({})",
                        self.details.attempts
                    );
                }

                self.details.step = step_size * Unit::Second;
                if self.details.error < self.opts.tolerance {
                    // Error is less than tolerance, let's attempt to increase the step for the next iteration.
                    let proposed_step = 0.9
                        * step_size
                        * (self.opts.tolerance / self.details.error)
                            .powf(1.0 / f64::from(self.table.order));
                    step_size = proposed_step.min(self.opts.max_step.to_seconds());
                }
                // In all cases, let's update the step size to whatever was the adapted step size
                self.step_size = step_size * Unit::Second;
                return Ok((self.details.step, next_state));
            }

            // Error is too high and we aren't using the smallest step, and we haven't hit the max number of attempts.
            // So let's adapt the step size.
            self.details.attempts += 1;
            let proposed_step = 0.9
                * step_size
                * (self.opts.tolerance / self.details.error)
                    .powf(1.0 / f64::from(self.table.order - 1));
            step_size = proposed_step.max(self.opts.min_step.to_seconds());
            // Note that we don't set self.step_size, that will be updated right before we return
        }
    }

    /// Copy the details of the latest integration step.
    pub fn latest_details(&self) -> IntegrationDetails {
        self.details
    }
}

#[cfg(test)]
mod ut_instance {
    use super::*;
    use crate::cosmic::{Body, BodyMap, Engine, MOON, MOON_GM_M3_S2, MOON_MEAN_RADIUS_M, VEHICLE};
    use crate::dynamics::{AccelerationSettings, ForceModelTable};
    use crate::linalg::Vector3;
    use crate::propagators::RSSCartesianStep;
    use crate::time::Epoch;

    fn two_body() -> TranslationalDynamics {
        let bodies = BodyMap::new().with(Body::moon()).with(Body::vehicle(
            VEHICLE,
            1_000.0,
            Engine { max_thrust_N: 0.0 },
        ));
        let table =
            ForceModelTable::new().with(MOON, VEHICLE, AccelerationSettings::PointMassGravity);
        TranslationalDynamics::build(&table, &bodies, VEHICLE, false).unwrap()
    }

    /// A circular orbit keeps its radius and its energy, whichever integrator is used.
    #[test]
    fn circular_orbit_is_preserved() {
        let dynamics = two_body();
        let epoch = Epoch::from_tdb_seconds(0.0);
        let radius = MOON_MEAN_RADIUS_M + 100_000.0;
        let speed = (MOON_GM_M3_S2 / radius).sqrt();
        let init = VehicleState::new(
            epoch,
            Vector3::new(radius, 0.0, 0.0),
            Vector3::new(0.0, speed, 0.0),
            1_000.0,
        );

        for opts in [
            IntegratorSettings::with_fixed_step_s(epoch, 5.0),
            IntegratorSettings::with_adaptive_step(
                epoch,
                0.01 * Unit::Second,
                60.0 * Unit::Second,
                1e-12,
            ),
        ] {
            let mut prop = PropInstance::<RSSCartesianStep>::new(init, &dynamics, &opts);
            let end = epoch + 30 * Unit::Minute;
            while prop.state.epoch < end {
                prop.single_step(Some(end - prop.state.epoch)).unwrap();
            }
            assert_eq!(prop.state.epoch, end, "{opts}");
            assert!(
                (prop.state.position_m.norm() - radius).abs() < 1.0,
                "{opts}: radius error {} m",
                prop.state.position_m.norm() - radius
            );
            assert!((prop.state.velocity_m_s.norm() - speed).abs() < 1e-3);
            // Mass is not propagated
            assert_eq!(prop.state.mass_kg, 1_000.0);
        }
    }
}
