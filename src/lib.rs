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

/*! # lunar-ascent

Fitness evaluation of lunar ascent thrust profiles for box-constrained optimizers.

A flat decision vector is turned into a thrust guidance law, spliced into the vehicle's force
models, propagated from the lunar surface, and reduced into objective and constraint values.
*/

/// Provides the integrators, the propagator settings and the single arc simulator.
pub mod propagators;

/// Provides the force models (point mass gravity and thrust) and the ascent guidance.
pub mod dynamics;

/// Provides the bodies, the vehicle state and the physical constants.
pub mod cosmic;

/// Trajectory and dependent variable histories.
pub mod md;

/// Fitness evaluation of a thrust profile, as seen by an external optimizer.
pub mod opti;

/// Scenario configuration files and trajectory export.
pub mod io;

#[macro_use]
extern crate log;
extern crate hifitime;
extern crate nalgebra as na;

/// Re-export of hifitime
pub mod time {
    pub use hifitime::*;
}

/// Re-export nalgebra
pub mod linalg {
    pub use na::base::*;
}

pub use self::cosmic::{BodyMap, VehicleState};
pub use self::opti::{LunarAscentProblem, OptimizationProblem, ProblemError};
