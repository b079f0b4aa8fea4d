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

use super::ThrustAccelerationSettings;
use std::collections::BTreeMap;
use std::fmt;

/// Settings of a single acceleration exerted by one body onto another.
#[derive(Clone, Debug)]
pub enum AccelerationSettings {
    /// Point mass gravity of the exerting body
    PointMassGravity,
    /// Thrust of the vehicle's engine, only valid as a self-exerted acceleration
    Thrust(ThrustAccelerationSettings),
}

impl AccelerationSettings {
    pub fn is_thrust(&self) -> bool {
        matches!(self, Self::Thrust(_))
    }
}

impl fmt::Display for AccelerationSettings {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::PointMassGravity => write!(f, "point mass gravity"),
            Self::Thrust(thrust) => write!(f, "{thrust}"),
        }
    }
}

/// Force models of the simulation, keyed by exerting body, then by affected body.
///
/// Each mutation increments the revision of the table. Models compiled from a table remember the
/// revision they were built from, and must be rebuilt when the table has changed since.
#[derive(Clone, Debug, Default)]
pub struct ForceModelTable {
    entries: BTreeMap<String, BTreeMap<String, Vec<AccelerationSettings>>>,
    revision: u64,
}

impl ForceModelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style addition of an acceleration
    pub fn with(mut self, exerting: &str, affected: &str, settings: AccelerationSettings) -> Self {
        self.push(exerting, affected, settings);
        self
    }

    /// Appends an acceleration exerted by `exerting` on `affected`.
    pub fn push(&mut self, exerting: &str, affected: &str, settings: AccelerationSettings) {
        self.entries
            .entry(exerting.to_string())
            .or_default()
            .entry(affected.to_string())
            .or_default()
            .push(settings);
        self.revision += 1;
    }

    /// Removes all of the accelerations exerted by `exerting` on `affected`.
    pub fn clear(&mut self, exerting: &str, affected: &str) {
        if let Some(list) = self
            .entries
            .get_mut(exerting)
            .and_then(|by_affected| by_affected.get_mut(affected))
        {
            list.clear();
        }
        self.revision += 1;
    }

    /// Replaces every self-exerted acceleration of the vehicle with the provided thrust.
    ///
    /// Calling this repeatedly always leaves exactly one self-exerted entry, the latest thrust.
    pub fn replace_self_exerted(&mut self, vehicle: &str, thrust: ThrustAccelerationSettings) {
        self.clear(vehicle, vehicle);
        self.push(vehicle, vehicle, AccelerationSettings::Thrust(thrust));
        debug!("self-exerted accelerations of {vehicle} replaced (rev. {})", self.revision);
    }

    /// Accelerations exerted by `exerting` on `affected`, in insertion order.
    pub fn get(&self, exerting: &str, affected: &str) -> &[AccelerationSettings] {
        self.entries
            .get(exerting)
            .and_then(|by_affected| by_affected.get(affected))
            .map(|list| list.as_slice())
            .unwrap_or(&[])
    }

    /// All of the accelerations acting on the `affected` body, with the name of the exerting body.
    pub fn acting_on<'a>(
        &'a self,
        affected: &'a str,
    ) -> impl Iterator<Item = (&'a str, &'a AccelerationSettings)> + 'a {
        self.entries.iter().flat_map(move |(exerting, by_affected)| {
            by_affected
                .get(affected)
                .into_iter()
                .flatten()
                .map(move |settings| (exerting.as_str(), settings))
        })
    }

    /// Number of thrust entries acting on the body
    pub fn thrust_count(&self, affected: &str) -> usize {
        self.acting_on(affected)
            .filter(|(_, settings)| settings.is_thrust())
            .count()
    }

    /// Total number of entries in this table
    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(|by_affected| by_affected.values())
            .map(|list| list.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl fmt::Display for ForceModelTable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Force models (rev. {})", self.revision)?;
        for (exerting, by_affected) in &self.entries {
            for (affected, list) in by_affected {
                for settings in list {
                    write!(f, "\n\t{exerting} -> {affected}: {settings}")?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod ut_table {
    use super::*;
    use crate::dynamics::guidance::ConstantScalar;
    use crate::linalg::Vector3;
    use crate::time::Epoch;
    use std::sync::Arc;

    #[derive(Debug)]
    struct FixedDirection(Vector3<f64>);

    impl crate::dynamics::guidance::TimeVaryingVector3 for FixedDirection {
        fn vector(&self, _epoch: Epoch) -> Vector3<f64> {
            self.0
        }
    }

    fn thrust(thrust_n: f64) -> ThrustAccelerationSettings {
        ThrustAccelerationSettings::new(
            Arc::new(FixedDirection(Vector3::x())),
            Arc::new(ConstantScalar(thrust_n)),
            311.0,
        )
    }

    #[test]
    fn splice_does_not_accumulate() {
        let mut table = ForceModelTable::new()
            .with("Moon", "Vehicle", AccelerationSettings::PointMassGravity)
            .with("Vehicle", "Vehicle", AccelerationSettings::PointMassGravity);
        let rev = table.revision();
        assert_eq!(table.len(), 2);

        table.replace_self_exerted("Vehicle", thrust(1.0));
        table.replace_self_exerted("Vehicle", thrust(2.0));
        assert!(table.revision() > rev);
        assert_eq!(table.get("Vehicle", "Vehicle").len(), 1);
        assert_eq!(table.thrust_count("Vehicle"), 1);
        // Gravity of the Moon is untouched
        assert_eq!(table.get("Moon", "Vehicle").len(), 1);
        assert_eq!(table.acting_on("Vehicle").count(), 2);

        match &table.get("Vehicle", "Vehicle")[0] {
            AccelerationSettings::Thrust(latest) => {
                assert_eq!(latest.magnitude_N(Epoch::from_tdb_seconds(0.0)), 2.0)
            }
            other => panic!("expected thrust, got {other}"),
        }
    }

    #[test]
    fn unknown_pairs_are_empty() {
        let table = ForceModelTable::new();
        assert!(table.is_empty());
        assert!(table.get("Sun", "Vehicle").is_empty());
        assert_eq!(table.thrust_count("Vehicle"), 0);
    }
}
