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

mod bodies;
pub use self::bodies::*;

mod spacecraft;
pub use self::spacecraft::*;

/// Standard gravity in m/s^2, used to convert a specific impulse into an exhaust velocity.
pub const STD_GRAVITY: f64 = 9.80665;

/// Gravitational parameter of the Moon in m^3/s^2 (DE440).
pub const MOON_GM_M3_S2: f64 = 4.902_800_118e12;

/// Mean radius of the Moon in meters.
pub const MOON_MEAN_RADIUS_M: f64 = 1_737_400.0;

/// Name of the central body in the default ascent setup.
pub const MOON: &str = "Moon";

/// Name of the propagated body in the default ascent setup.
pub const VEHICLE: &str = "Vehicle";

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum AstroError {
    #[snafu(display("body `{name}` is not defined in the body map"))]
    BodyNotFound { name: String },
    #[snafu(display("body `{name}` has no {property} defined"))]
    MissingProperty {
        name: String,
        property: &'static str,
    },
    #[snafu(display("body `{name}` has an invalid {property}: {value}"))]
    InvalidProperty {
        name: String,
        property: &'static str,
        value: f64,
    },
}
