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

use snafu::prelude::*;
use std::fmt;

/// Provides different methods for controlling the error computation of the integrator.
pub mod error_ctrl;
pub use self::error_ctrl::*;

// Re-Export
mod instance;
pub use instance::*;
mod rk_methods;
pub use rk_methods::*;
mod options;
pub use options::*;
mod settings;
pub use settings::*;
mod termination;
pub use termination::*;
mod simulator;
pub use simulator::*;

use crate::{dynamics::DynamicsError, time::Duration, time::Epoch};

/// Stores the details of the previous integration step of a given propagator.
#[derive(Copy, Clone, Debug)]
pub struct IntegrationDetails {
    /// step size used
    pub step: Duration,
    /// error in the previous integration step
    pub error: f64,
    /// number of attempts needed by an adaptive step size to be within the tolerance
    pub attempts: u8,
}

impl fmt::Display for IntegrationDetails {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "IntegrationDetails {{step: {}, error: {:.3e}, attempts: {}}}",
            self.step, self.error, self.attempts
        )
    }
}

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum PropagationError {
    #[snafu(display("encountered a dynamics error {source}"))]
    Dynamics { source: DynamicsError },
    #[snafu(display("state diverged at {epoch} after {steps} steps"))]
    Diverged { epoch: Epoch, steps: usize },
    #[snafu(display(
        "derived models were built from force model revision {built} but the table is at revision {current}"
    ))]
    StaleModels { built: u64, current: u64 },
    #[snafu(display("derived models were never built, reset the integrated state models first"))]
    ModelsNotBuilt,
    #[snafu(display("no termination condition met after {steps} steps, stopped at {epoch}"))]
    MaxStepsReached { epoch: Epoch, steps: usize },
    #[snafu(display("propagation settings are invalid: {reason}"))]
    InvalidSettings { reason: String },
}
