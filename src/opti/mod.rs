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

use crate::dynamics::guidance::GuidanceError;
use crate::io::ConfigError;
use crate::propagators::PropagationError;
use rayon::prelude::*;
use snafu::prelude::*;
use std::fmt;

mod problem;
pub use problem::LunarAscentProblem;

mod reduction;
pub use reduction::{FnReduction, PlaceholderReduction, Reduced, Reduction};

/// A box-constrained problem, as seen by an external optimizer.
pub trait OptimizationProblem {
    /// Computes the objectives of the provided decision vector. Constraints, if any, are kept by
    /// the problem until the next call.
    fn fitness(&mut self, decision: &[f64]) -> Result<Vec<f64>, ProblemError>;

    /// Lower and upper bounds of each decision variable, of equal lengths.
    fn bounds(&self) -> (Vec<f64>, Vec<f64>);

    fn objective_count(&self) -> usize;

    fn constraint_count(&self) -> usize;
}

/// The stage an evaluation reached. A failed evaluation stays at the stage where it failed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum EvaluationPhase {
    #[default]
    Idle,
    Configuring,
    Propagating,
    Reducing,
    Done,
}

impl fmt::Display for EvaluationPhase {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let repr = match self {
            Self::Idle => "idle",
            Self::Configuring => "configuring",
            Self::Propagating => "propagating",
            Self::Reducing => "reducing",
            Self::Done => "done",
        };
        write!(f, "{repr}")
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProblemError {
    #[snafu(display("invalid decision vector: {source}"))]
    InvalidParameterization { source: GuidanceError },
    #[snafu(display("propagation failed: {source}"))]
    PropagationFailed { source: PropagationError },
    #[snafu(display("invalid problem configuration: {source}"))]
    Configuration { source: ConfigError },
    #[snafu(display("reduction returned {got} {kind} but declared {expected}"))]
    ReductionDimension {
        kind: &'static str,
        expected: usize,
        got: usize,
    },
}

/// Evaluates each decision vector of a population in parallel.
///
/// Each rayon worker evaluates on its own clone of the problem, so no modeling context is ever
/// shared between two simultaneous evaluations. Results are in the order of the population.
pub fn evaluate_population<P>(
    problem: &P,
    population: &[Vec<f64>],
) -> Vec<Result<Vec<f64>, ProblemError>>
where
    P: OptimizationProblem + Clone + Send,
{
    info!("Evaluating a population of {} decision vectors", population.len());
    population
        .par_iter()
        .map_with(problem.clone(), |problem, decision| problem.fitness(decision))
        .collect()
}
