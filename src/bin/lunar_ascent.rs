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

#[macro_use]
extern crate log;
extern crate pretty_env_logger;

use clap::Parser;
use lunar_ascent::io::{AscentScenario, ConfigRepr};
use lunar_ascent::OptimizationProblem;
use std::env::{set_var, var};
use std::error::Error;
use std::path::PathBuf;

const LOG_VAR: &str = "LUNAR_ASCENT_LOG";

#[derive(Parser, Debug)]
#[command(
    name = "lunar_ascent",
    about = "Evaluates the fitness of a lunar ascent thrust profile"
)]
struct Args {
    /// Scenario file (YAML)
    scenario: PathBuf,

    /// Decision vector, comma separated: throttle then pitch angles in radians (defaults to the middle of the bounds)
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    decision: Option<Vec<f64>>,

    /// Export the propagated trajectory to this CSV file
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if var(LOG_VAR).is_err() {
        set_var(LOG_VAR, "INFO");
    }

    if pretty_env_logger::try_init_custom_env(LOG_VAR).is_err() {
        println!("could not init logger");
    }

    let scenario = AscentScenario::load(&args.scenario)?;
    info!("Loaded scenario `{}`", args.scenario.display());

    let mut problem = scenario.to_problem()?;

    let decision = match args.decision {
        Some(decision) => decision,
        None => {
            let (lower, upper) = problem.bounds();
            lower
                .iter()
                .zip(&upper)
                .map(|(min, max)| 0.5 * (min + max))
                .collect()
        }
    };
    info!("Evaluating {decision:?}");

    let objectives = problem.fitness(&decision)?;
    println!("objectives: {objectives:?}");
    println!("constraints: {:?}", problem.constraints());

    if let Some(traj) = problem.last_trajectory() {
        println!("{traj}");
        if let Some(last) = traj.last() {
            println!("final state: {last}");
        }
        if let Some(path) = &args.output {
            traj.to_csv(path)?;
        }
    }

    Ok(())
}
