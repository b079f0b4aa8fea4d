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

use super::{
    EvaluationPhase, InvalidParameterizationSnafu, OptimizationProblem, PlaceholderReduction,
    ProblemError, PropagationFailedSnafu, Reduced, Reduction,
};
use crate::cosmic::BodyMap;
use crate::dynamics::guidance::{
    AscentGuidance, AscentParameterization, LaunchFrame, VehicleContext,
};
use crate::dynamics::ThrustAccelerationSettings;
use crate::io::ConfigError;
use crate::md::Trajectory;
use crate::propagators::{
    IntegratorSettings, MultiTypePropagatorSettings, PropagationEngine, SingleArcSimulator,
};
use snafu::ResultExt;
use std::sync::Arc;

fn invalid_config<S: ToString>(reason: S) -> ProblemError {
    ProblemError::Configuration {
        source: ConfigError::InvalidConfig {
            reason: reason.to_string(),
        },
    }
}

/// Lunar ascent trajectory optimization problem.
///
/// Each evaluation turns the decision vector into an ascent guidance, replaces the thrust of the
/// vehicle in its force models with that guidance, propagates the ascent, and reduces the
/// trajectory into objectives and constraints. An instance evaluates one decision vector at a
/// time: clone it to evaluate in parallel (see `evaluate_population`).
#[derive(Clone, Debug)]
pub struct LunarAscentProblem<E: PropagationEngine = SingleArcSimulator> {
    bodies: BodyMap,
    integrator: IntegratorSettings,
    propagator: MultiTypePropagatorSettings,
    lower_bounds: Vec<f64>,
    upper_bounds: Vec<f64>,
    isp_s: f64,
    parameterization: AscentParameterization,
    context: VehicleContext,
    engine: E,
    reduction: Arc<dyn Reduction>,
    phase: EvaluationPhase,
    constraints: Vec<f64>,
    last_trajectory: Option<Trajectory>,
}

impl LunarAscentProblem<SingleArcSimulator> {
    /// Initializes the problem, and builds the initial models of the propagator settings.
    ///
    /// The decision vector is `[throttle, pitch_0, ..., pitch_{n-1}]`, so the number of pitch nodes
    /// follows from the number of bounds. Nodes are 60 seconds apart by default, use
    /// `with_parameterization` to change that.
    pub fn new(
        bodies: BodyMap,
        integrator: IntegratorSettings,
        mut propagator: MultiTypePropagatorSettings,
        decision_variable_range: Vec<(f64, f64)>,
        constant_specific_impulse_s: f64,
    ) -> Result<Self, ProblemError> {
        if decision_variable_range.len() < 2 {
            return Err(invalid_config(format!(
                "at least two decision variables are required (throttle and one pitch), got {}",
                decision_variable_range.len()
            )));
        }
        for (i, (min, max)) in decision_variable_range.iter().enumerate() {
            if !(min.is_finite() && max.is_finite() && min <= max) {
                return Err(invalid_config(format!(
                    "bounds of decision variable #{i} are invalid: [{min}, {max}]"
                )));
            }
        }
        if !(constant_specific_impulse_s > 0.0 && constant_specific_impulse_s.is_finite()) {
            return Err(invalid_config(format!(
                "specific impulse must be positive, got {constant_specific_impulse_s} s"
            )));
        }

        let translational = propagator.translational().map_err(invalid_config)?;
        let vehicle = bodies
            .get(&translational.propagated_body)
            .map_err(invalid_config)?;
        let engine = vehicle.engine().map_err(invalid_config)?;
        let central_body = bodies
            .get(&translational.central_body)
            .map_err(invalid_config)?;
        let frame = LaunchFrame::from_state(
            translational.initial_position_m - central_body.position_m,
            translational.initial_velocity_m_s,
        )
        .map_err(invalid_config)?;

        propagator
            .reset_integrated_state_models(&bodies)
            .map_err(invalid_config)?;

        let parameterization = AscentParameterization {
            node_count: decision_variable_range.len() - 1,
            ..Default::default()
        };
        let (lower_bounds, upper_bounds): (Vec<f64>, Vec<f64>) =
            decision_variable_range.into_iter().unzip();

        info!(
            "Lunar ascent problem of {} with {} decision variables",
            propagator,
            parameterization.len()
        );

        Ok(Self {
            bodies,
            integrator,
            propagator,
            lower_bounds,
            upper_bounds,
            isp_s: constant_specific_impulse_s,
            parameterization,
            context: VehicleContext { engine, frame },
            engine: SingleArcSimulator::default(),
            reduction: Arc::new(PlaceholderReduction),
            phase: EvaluationPhase::Idle,
            constraints: Vec::new(),
            last_trajectory: None,
        })
    }
}

impl<E: PropagationEngine> LunarAscentProblem<E> {
    /// Propagate with another engine.
    pub fn with_engine<F: PropagationEngine>(self, engine: F) -> LunarAscentProblem<F> {
        LunarAscentProblem {
            bodies: self.bodies,
            integrator: self.integrator,
            propagator: self.propagator,
            lower_bounds: self.lower_bounds,
            upper_bounds: self.upper_bounds,
            isp_s: self.isp_s,
            parameterization: self.parameterization,
            context: self.context,
            engine,
            reduction: self.reduction,
            phase: EvaluationPhase::Idle,
            constraints: Vec::new(),
            last_trajectory: None,
        }
    }

    /// Reduce the trajectories with the provided reduction instead of the placeholder.
    pub fn with_reduction<R: Reduction + 'static>(mut self, reduction: R) -> Self {
        self.reduction = Arc::new(reduction);
        self.constraints.clear();
        self
    }

    /// Use another layout of the decision vector, which must match the number of bounds.
    pub fn with_parameterization(
        mut self,
        parameterization: AscentParameterization,
    ) -> Result<Self, ProblemError> {
        parameterization.validate().map_err(invalid_config)?;
        if parameterization.len() != self.lower_bounds.len() {
            return Err(invalid_config(format!(
                "parameterization expects {} decision variables but {} bounds are defined",
                parameterization.len(),
                self.lower_bounds.len()
            )));
        }
        self.parameterization = parameterization;
        Ok(self)
    }

    /// Evaluates a decision vector: configure the thrust, propagate, and reduce.
    pub fn evaluate(&mut self, decision: &[f64]) -> Result<Vec<f64>, ProblemError> {
        self.phase = EvaluationPhase::Configuring;
        self.constraints.clear();
        self.last_trajectory = None;
        self.warn_out_of_bounds(decision);

        // Checked before anything is modified
        let guidance = AscentGuidance::new(
            self.context,
            self.integrator.initial_epoch,
            decision,
            &self.parameterization,
        )
        .context(InvalidParameterizationSnafu)?;
        debug!("{guidance}");

        let thrust = ThrustAccelerationSettings::from_guidance(Arc::new(guidance), self.isp_s);
        let translational = self
            .propagator
            .translational_mut()
            .context(PropagationFailedSnafu)?;
        let vehicle = translational.propagated_body.clone();
        translational
            .force_models_mut()
            .replace_self_exerted(&vehicle, thrust);
        self.propagator
            .reset_integrated_state_models(&self.bodies)
            .context(PropagationFailedSnafu)?;

        self.phase = EvaluationPhase::Propagating;
        let traj = self
            .engine
            .propagate(&self.bodies, &self.integrator, &self.propagator)
            .context(PropagationFailedSnafu)?;
        debug!("{traj}");

        self.phase = EvaluationPhase::Reducing;
        let Reduced {
            objectives,
            constraints,
        } = self.reduction.reduce(&traj);
        if objectives.len() != self.reduction.objective_count() {
            return Err(ProblemError::ReductionDimension {
                kind: "objectives",
                expected: self.reduction.objective_count(),
                got: objectives.len(),
            });
        }
        if constraints.len() != self.reduction.constraint_count() {
            return Err(ProblemError::ReductionDimension {
                kind: "constraints",
                expected: self.reduction.constraint_count(),
                got: constraints.len(),
            });
        }

        self.constraints = constraints;
        self.last_trajectory = Some(traj);
        self.phase = EvaluationPhase::Done;
        Ok(objectives)
    }

    fn warn_out_of_bounds(&self, decision: &[f64]) {
        for (i, ((value, min), max)) in decision
            .iter()
            .zip(&self.lower_bounds)
            .zip(&self.upper_bounds)
            .enumerate()
        {
            if value < min || value > max {
                warn!("decision variable #{i} = {value} is outside of [{min}, {max}]");
            }
        }
    }

    /// Stage reached by the latest evaluation
    pub fn phase(&self) -> EvaluationPhase {
        self.phase
    }

    /// Constraints computed by the latest evaluation, empty if it failed
    pub fn constraints(&self) -> &[f64] {
        &self.constraints
    }

    /// Trajectory propagated by the latest evaluation, `None` if it failed
    pub fn last_trajectory(&self) -> Option<&Trajectory> {
        self.last_trajectory.as_ref()
    }

    pub fn parameterization(&self) -> &AscentParameterization {
        &self.parameterization
    }

    pub fn bodies(&self) -> &BodyMap {
        &self.bodies
    }

    pub fn integrator(&self) -> &IntegratorSettings {
        &self.integrator
    }

    pub fn propagator(&self) -> &MultiTypePropagatorSettings {
        &self.propagator
    }

    pub fn specific_impulse_s(&self) -> f64 {
        self.isp_s
    }
}

impl<E: PropagationEngine> OptimizationProblem for LunarAscentProblem<E> {
    fn fitness(&mut self, decision: &[f64]) -> Result<Vec<f64>, ProblemError> {
        self.evaluate(decision)
    }

    fn bounds(&self) -> (Vec<f64>, Vec<f64>) {
        (self.lower_bounds.clone(), self.upper_bounds.clone())
    }

    fn objective_count(&self) -> usize {
        self.reduction.objective_count()
    }

    fn constraint_count(&self) -> usize {
        self.reduction.constraint_count()
    }
}
