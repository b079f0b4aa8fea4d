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

mod rk;
pub use self::rk::*;
mod fehlberg;
pub use self::fehlberg::*;

use super::IntegratorMethod;

/// The `RK` trait defines a Runge Kutta integrator.
#[allow(clippy::upper_case_acronyms)]
pub trait RK
where
    Self: Sized,
{
    /// Returns the order of this integrator (as u8 because there probably isn't an order greater than 255).
    /// The order is used for the adaptive step size only to compute the error between estimates.
    const ORDER: u8;

    /// Returns the stages of this integrator (as usize because it's used as indexing)
    const STAGES: usize;

    /// Returns a pointer to a list of f64 corresponding to the A coefficients of the Butcher table for that RK.
    /// This module only supports *explicit* integrators, and as such, `Self.a_coeffs().len()` must be of
    /// size (stages - 1) * stages / 2.
    /// *Warning:* this RK trait supposes that the implementation is consistent, i.e. c_i = \sum_j a_{ij}.
    const A_COEFFS: &'static [f64];
    /// Returns a pointer to a list of f64 corresponding to the b_i and b^*_i coefficients of the
    /// Butcher table for that RK. `Self.b_coeffs().len()` must be of size stages * 2.
    const B_COEFFS: &'static [f64];
}

/// Butcher table of an integrator, resolved at run time from the integrator method.
#[derive(Copy, Clone, Debug)]
pub struct ButcherTable {
    pub order: u8,
    pub stages: usize,
    pub a_coeffs: &'static [f64],
    pub b_coeffs: &'static [f64],
}

impl ButcherTable {
    pub fn of<T: RK>() -> Self {
        Self {
            order: T::ORDER,
            stages: T::STAGES,
            a_coeffs: T::A_COEFFS,
            b_coeffs: T::B_COEFFS,
        }
    }
}

impl From<IntegratorMethod> for ButcherTable {
    fn from(method: IntegratorMethod) -> Self {
        match method {
            IntegratorMethod::Rk4 => Self::of::<RK4Fixed>(),
            IntegratorMethod::Rkf45 => Self::of::<Fehlberg45>(),
        }
    }
}

#[test]
fn butcher_tables_are_consistent() {
    for method in [IntegratorMethod::Rk4, IntegratorMethod::Rkf45] {
        let table = ButcherTable::from(method);
        assert_eq!(table.a_coeffs.len(), (table.stages - 1) * table.stages / 2);
        assert_eq!(table.b_coeffs.len(), 2 * table.stages);
        // Both solutions must be consistent, i.e. their weights sum to one
        let b: f64 = table.b_coeffs[..table.stages].iter().sum();
        assert!((b - 1.0).abs() < 1e-14, "{method}: {b}");
        if method == IntegratorMethod::Rkf45 {
            let b_star: f64 = table.b_coeffs[table.stages..].iter().sum();
            assert!((b_star - 1.0).abs() < 1e-14, "{method}: {b_star}");
        }
    }
}
