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

use std::fmt;

use super::PropagationError;
use crate::time::{Duration, Epoch, Unit};
use serde_derive::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

/// Integration methods available to the simulator.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegratorMethod {
    /// Classical fourth order Runge Kutta, always used with a fixed step.
    Rk4,
    /// Runge Kutta Fehlberg 4(5) with an adaptive step.
    #[default]
    Rkf45,
}

impl fmt::Display for IntegratorMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rk4 => write!(f, "RK4"),
            Self::Rkf45 => write!(f, "RKF45"),
        }
    }
}

/// IntegratorSettings stores the initial epoch and the integrator options: method, minimum and
/// maximum step sizes, and the max error size.
///
/// Note that different step sizes and max errors are only used for adaptive methods. To use a
/// fixed step integrator, initialize the options using `with_fixed_step`. Initializing an RKF45
/// with fixed step options will lead to its fifth order solution being used without error control.
#[derive(Clone, Copy, Debug, TypedBuilder)]
#[builder(doc)]
pub struct IntegratorSettings {
    /// Epoch of the initial state, also the reference epoch of the guidance
    pub initial_epoch: Epoch,
    #[builder(default)]
    pub method: IntegratorMethod,
    #[builder(default_code = "1.0 * Unit::Second")]
    pub init_step: Duration,
    #[builder(default_code = "0.001 * Unit::Second")]
    pub min_step: Duration,
    #[builder(default_code = "60.0 * Unit::Second")]
    pub max_step: Duration,
    #[builder(default = 1e-10)]
    pub tolerance: f64,
    #[builder(default = 50)]
    pub attempts: u8,
    #[builder(default = false)]
    pub fixed_step: bool,
}

impl IntegratorSettings {
    /// `with_adaptive_step` initializes an `IntegratorSettings` such that the integrator is used with an
    ///  adaptive step size. The number of attempts is fixed to 50 (as in GMAT).
    pub fn with_adaptive_step(
        initial_epoch: Epoch,
        min_step: Duration,
        max_step: Duration,
        tolerance: f64,
    ) -> Self {
        Self {
            initial_epoch,
            method: IntegratorMethod::Rkf45,
            init_step: min_step.max(1.0 * Unit::Second).min(max_step),
            min_step,
            max_step,
            tolerance,
            attempts: 50,
            fixed_step: false,
        }
    }

    /// `with_fixed_step` initializes an `IntegratorSettings` such that the RK4 is used with a fixed
    ///  step size.
    pub fn with_fixed_step(initial_epoch: Epoch, step: Duration) -> Self {
        Self {
            initial_epoch,
            method: IntegratorMethod::Rk4,
            init_step: step,
            min_step: step,
            max_step: step,
            tolerance: 0.0,
            attempts: 0,
            fixed_step: true,
        }
    }

    pub fn with_fixed_step_s(initial_epoch: Epoch, step: f64) -> Self {
        Self::with_fixed_step(initial_epoch, step * Unit::Second)
    }

    /// Returns whether this integrator uses a fixed step, either by request or by method.
    pub fn is_fixed_step(&self) -> bool {
        self.fixed_step || self.method == IntegratorMethod::Rk4
    }

    /// Set the maximum step size and sets the initial step to that value if currently greater
    pub fn set_max_step(&mut self, max_step: Duration) {
        if self.init_step > max_step {
            self.init_step = max_step;
        }
        self.max_step = max_step;
    }

    /// Set the minimum step size and sets the initial step to that value if currently smaller
    pub fn set_min_step(&mut self, min_step: Duration) {
        if self.init_step < min_step {
            self.init_step = min_step;
        }
        self.min_step = min_step;
    }

    /// Checks that the step sizes are positive and ordered. Only forward propagation is supported.
    pub fn validate(&self) -> Result<(), PropagationError> {
        let zero = 0.0 * Unit::Second;
        if self.init_step <= zero {
            return Err(PropagationError::InvalidSettings {
                reason: format!("initial step must be positive, got {}", self.init_step),
            });
        }
        if !self.is_fixed_step() {
            if self.min_step <= zero || self.min_step > self.max_step {
                return Err(PropagationError::InvalidSettings {
                    reason: format!(
                        "step bounds must satisfy 0 < min ({}) <= max ({})",
                        self.min_step, self.max_step
                    ),
                });
            }
            if !(self.tolerance > 0.0 && self.tolerance.is_finite()) {
                return Err(PropagationError::InvalidSettings {
                    reason: format!("tolerance must be positive, got {}", self.tolerance),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for IntegratorSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_fixed_step() {
            write!(f, "{} fixed step: {}", self.method, self.init_step)
        } else {
            write!(
                f,
                "{} min_step: {}, max_step: {}, tol: {:e}, attempts: {}",
                self.method, self.min_step, self.max_step, self.tolerance, self.attempts,
            )
        }
    }
}

#[test]
fn test_options() {
    let epoch = Epoch::from_tdb_seconds(0.0);

    let opts = IntegratorSettings::with_fixed_step_s(epoch, 1e-1);
    assert_eq!(opts.min_step, 1e-1 * Unit::Second);
    assert_eq!(opts.max_step, 1e-1 * Unit::Second);
    assert!(opts.tolerance.abs() < f64::EPSILON);
    assert!(opts.is_fixed_step());
    assert!(opts.validate().is_ok());

    let opts = IntegratorSettings::with_adaptive_step(
        epoch,
        1e-2 * Unit::Second,
        10.0 * Unit::Second,
        1e-12,
    );
    assert_eq!(opts.min_step, 1e-2 * Unit::Second);
    assert_eq!(opts.max_step, 10.0 * Unit::Second);
    assert_eq!(opts.init_step, 1.0 * Unit::Second);
    assert!(!opts.is_fixed_step());
    assert!(opts.validate().is_ok());

    let mut opts = IntegratorSettings::builder().initial_epoch(epoch).build();
    assert_eq!(opts.method, IntegratorMethod::Rkf45);
    assert_eq!(opts.init_step, 1.0 * Unit::Second);
    assert_eq!(opts.min_step, 0.001 * Unit::Second);
    assert_eq!(opts.max_step, 60.0 * Unit::Second);
    assert_eq!(opts.attempts, 50);
    opts.set_max_step(0.5 * Unit::Second);
    assert_eq!(opts.init_step, 0.5 * Unit::Second);

    let bad = IntegratorSettings::builder()
        .initial_epoch(epoch)
        .min_step(10.0 * Unit::Second)
        .max_step(1.0 * Unit::Second)
        .build();
    assert!(bad.validate().is_err());
}
