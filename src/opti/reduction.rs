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

use crate::md::Trajectory;
use std::fmt;

/// Objective and constraint values computed from a trajectory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reduced {
    pub objectives: Vec<f64>,
    pub constraints: Vec<f64>,
}

/// Reduces a propagated trajectory into the values seen by the optimizer.
///
/// The number of objectives and constraints is fixed for the lifetime of a problem: every call to
/// `reduce` must return exactly that many values.
pub trait Reduction: fmt::Debug + Send + Sync {
    fn objective_count(&self) -> usize;

    fn constraint_count(&self) -> usize {
        0
    }

    fn reduce(&self, traj: &Trajectory) -> Reduced;
}

/// Returns a single null objective and no constraints, whatever the trajectory.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PlaceholderReduction;

impl Reduction for PlaceholderReduction {
    fn objective_count(&self) -> usize {
        1
    }

    fn reduce(&self, _traj: &Trajectory) -> Reduced {
        Reduced {
            objectives: vec![0.0],
            constraints: Vec::new(),
        }
    }
}

/// A reduction defined by a function, e.g. a closure over the mission targets.
pub struct FnReduction<F>
where
    F: Fn(&Trajectory) -> Reduced + Send + Sync,
{
    objective_count: usize,
    constraint_count: usize,
    func: F,
}

impl<F> FnReduction<F>
where
    F: Fn(&Trajectory) -> Reduced + Send + Sync,
{
    pub fn new(objective_count: usize, constraint_count: usize, func: F) -> Self {
        Self {
            objective_count,
            constraint_count,
            func,
        }
    }
}

impl<F> fmt::Debug for FnReduction<F>
where
    F: Fn(&Trajectory) -> Reduced + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "FnReduction {{ objectives: {}, constraints: {} }}",
            self.objective_count, self.constraint_count
        )
    }
}

impl<F> Reduction for FnReduction<F>
where
    F: Fn(&Trajectory) -> Reduced + Send + Sync,
{
    fn objective_count(&self) -> usize {
        self.objective_count
    }

    fn constraint_count(&self) -> usize {
        self.constraint_count
    }

    fn reduce(&self, traj: &Trajectory) -> Reduced {
        (self.func)(traj)
    }
}

#[test]
fn placeholder_ignores_the_trajectory() {
    let traj = Trajectory::new(vec![]);
    let reduced = PlaceholderReduction.reduce(&traj);
    assert_eq!(reduced.objectives, vec![0.0]);
    assert!(reduced.constraints.is_empty());
    assert_eq!(PlaceholderReduction.objective_count(), 1);
    assert_eq!(PlaceholderReduction.constraint_count(), 0);

    let by_len = FnReduction::new(1, 1, |traj: &Trajectory| Reduced {
        objectives: vec![traj.len() as f64],
        constraints: vec![-1.0],
    });
    assert_eq!(by_len.reduce(&traj).objectives, vec![0.0]);
    assert_eq!(format!("{by_len:?}"), "FnReduction { objectives: 1, constraints: 1 }");
}
