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

use super::{AstroError, MOON, MOON_GM_M3_S2, MOON_MEAN_RADIUS_M};
use crate::linalg::Vector3;
use std::collections::BTreeMap;
use std::fmt;

/// Defines an engine by its maximum thrust. The specific impulse is provided with the thrust model.
#[allow(non_snake_case)]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Engine {
    /// The maximum thrust is to be provided in Newtons
    pub max_thrust_N: f64,
}

/// A body of the simulation: either a gravitating body or the vehicle itself.
///
/// Positions are fixed in the inertial frame of the propagation: the ascent lasts minutes, so the
/// central body is not moved by an ephemeris.
#[derive(Clone, Debug, PartialEq)]
pub struct Body {
    pub name: String,
    /// Gravitational parameter in m^3/s^2, zero for the vehicle
    pub gm_m3_s2: f64,
    /// Mean radius in meters, used to compute altitudes
    pub mean_radius_m: f64,
    /// Inertial position in meters
    pub position_m: Vector3<f64>,
    /// Mass in kg, used as a constant mass when the mass is not propagated
    pub mass_kg: Option<f64>,
    pub engine: Option<Engine>,
}

impl Body {
    /// The Moon, at the origin of the inertial frame.
    pub fn moon() -> Self {
        Self::celestial(MOON, MOON_GM_M3_S2, MOON_MEAN_RADIUS_M)
    }

    /// A gravitating body at the origin of the inertial frame.
    pub fn celestial(name: &str, gm_m3_s2: f64, mean_radius_m: f64) -> Self {
        Self {
            name: name.to_string(),
            gm_m3_s2,
            mean_radius_m,
            position_m: Vector3::zeros(),
            mass_kg: None,
            engine: None,
        }
    }

    /// A vehicle with a mass and an engine
    pub fn vehicle(name: &str, mass_kg: f64, engine: Engine) -> Self {
        Self {
            name: name.to_string(),
            gm_m3_s2: 0.0,
            mean_radius_m: 0.0,
            position_m: Vector3::zeros(),
            mass_kg: Some(mass_kg),
            engine: Some(engine),
        }
    }

    pub fn mass_kg(&self) -> Result<f64, AstroError> {
        match self.mass_kg {
            Some(mass_kg) if mass_kg > 0.0 && mass_kg.is_finite() => Ok(mass_kg),
            Some(mass_kg) => Err(AstroError::InvalidProperty {
                name: self.name.clone(),
                property: "mass",
                value: mass_kg,
            }),
            None => Err(AstroError::MissingProperty {
                name: self.name.clone(),
                property: "mass",
            }),
        }
    }

    pub fn engine(&self) -> Result<Engine, AstroError> {
        match self.engine {
            Some(engine) if engine.max_thrust_N >= 0.0 && engine.max_thrust_N.is_finite() => {
                Ok(engine)
            }
            Some(engine) => Err(AstroError::InvalidProperty {
                name: self.name.clone(),
                property: "maximum thrust",
                value: engine.max_thrust_N,
            }),
            None => Err(AstroError::MissingProperty {
                name: self.name.clone(),
                property: "engine",
            }),
        }
    }
}

impl fmt::Display for Body {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.gm_m3_s2 > 0.0 {
            write!(
                f,
                "{} (GM = {:.6e} m^3/s^2, R = {:.1} m)",
                self.name, self.gm_m3_s2, self.mean_radius_m
            )
        } else {
            write!(f, "{}", self.name)
        }
    }
}

/// Named bodies of the simulation, looked up by name when building the force models.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BodyMap {
    bodies: BTreeMap<String, Body>,
}

impl BodyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion
    pub fn with(mut self, body: Body) -> Self {
        self.insert(body);
        self
    }

    /// Inserts or replaces the body of that name
    pub fn insert(&mut self, body: Body) {
        self.bodies.insert(body.name.clone(), body);
    }

    pub fn get(&self, name: &str) -> Result<&Body, AstroError> {
        self.bodies.get(name).ok_or_else(|| AstroError::BodyNotFound {
            name: name.to_string(),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bodies.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.bodies.keys().map(|name| name.as_str())
    }
}
