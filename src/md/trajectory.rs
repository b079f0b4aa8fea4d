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

use super::DependentVariable;
use crate::cosmic::VehicleState;
use crate::propagators::TerminationReason;
use crate::time::Duration;
use std::fmt;

/// Store the result of a propagation: the state history and the dependent variables saved at
/// each of these states, and why the propagation stopped.
#[derive(Clone, Debug, PartialEq)]
pub struct Trajectory {
    /// States in chronological order, starting with the initial state
    pub states: Vec<VehicleState>,
    /// Names of the dependent variables, in the order of each row of `dependent_history`
    pub dependent_variables: Vec<DependentVariable>,
    /// One row per state
    pub dependent_history: Vec<Vec<f64>>,
    pub termination: Option<TerminationReason>,
}

impl Trajectory {
    pub fn new(dependent_variables: Vec<DependentVariable>) -> Self {
        Self {
            states: Vec::new(),
            dependent_variables,
            dependent_history: Vec::new(),
            termination: None,
        }
    }

    /// Appends a state and its dependent variables. States must be pushed chronologically.
    pub(crate) fn push(&mut self, state: VehicleState, dependent_values: Vec<f64>) {
        debug_assert_eq!(dependent_values.len(), self.dependent_variables.len());
        debug_assert!(self
            .states
            .last()
            .map_or(true, |last| last.epoch <= state.epoch));
        self.states.push(state);
        self.dependent_history.push(dependent_values);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn first(&self) -> Option<&VehicleState> {
        self.states.first()
    }

    pub fn last(&self) -> Option<&VehicleState> {
        self.states.last()
    }

    /// Time span between the first and the last state
    pub fn duration(&self) -> Option<Duration> {
        match (self.first(), self.last()) {
            (Some(first), Some(last)) => Some(last.epoch - first.epoch),
            _ => None,
        }
    }

    /// History of a single dependent variable, if it was saved
    pub fn dependent(&self, variable: DependentVariable) -> Option<Vec<f64>> {
        let col = self
            .dependent_variables
            .iter()
            .position(|var| *var == variable)?;
        Some(self.dependent_history.iter().map(|row| row[col]).collect())
    }

    /// Value of a dependent variable at the last state, if it was saved
    pub fn final_dependent(&self, variable: DependentVariable) -> Option<f64> {
        let col = self
            .dependent_variables
            .iter()
            .position(|var| *var == variable)?;
        self.dependent_history.last().map(|row| row[col])
    }

    /// Iterates over the states along with their dependent variables
    pub fn iter(&self) -> impl Iterator<Item = (&VehicleState, &[f64])> {
        self.states
            .iter()
            .zip(self.dependent_history.iter().map(|row| row.as_slice()))
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match (self.first(), self.last(), self.duration()) {
            (Some(first), Some(last), Some(duration)) => {
                write!(
                    f,
                    "Trajectory from {} to {} ({duration}, or {:.3} s) with {} states",
                    first.epoch,
                    last.epoch,
                    duration.to_seconds(),
                    self.len()
                )?;
                if let Some(reason) = &self.termination {
                    write!(f, ": {reason}")?;
                }
                Ok(())
            }
            _ => write!(f, "Empty trajectory"),
        }
    }
}
