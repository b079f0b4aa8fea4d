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

use super::{CreateFileSnafu, ExportError, WriteRecordSnafu};
use crate::md::Trajectory;
use snafu::ResultExt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

const STATE_HEADERS: [&str; 9] = [
    "epoch",
    "elapsed (s)",
    "x (m)",
    "y (m)",
    "z (m)",
    "vx (m/s)",
    "vy (m/s)",
    "vz (m/s)",
    "mass (kg)",
];

impl Trajectory {
    /// Writes this trajectory as CSV: one row per state, with the dependent variables after the state.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ExportError> {
        let mut wtr = csv::Writer::from_writer(writer);

        let mut headers: Vec<String> = STATE_HEADERS.iter().map(|hdr| hdr.to_string()).collect();
        headers.extend(self.dependent_variables.iter().map(|var| var.header()));
        wtr.write_record(&headers).context(WriteRecordSnafu)?;

        let start = match self.first() {
            Some(first) => first.epoch,
            None => return wtr.flush().map_err(csv::Error::from).context(WriteRecordSnafu),
        };

        for (state, dependent_values) in self.iter() {
            let mut record = vec![
                format!("{}", state.epoch),
                format!("{}", (state.epoch - start).to_seconds()),
            ];
            record.extend(state.position_m.iter().map(|x| format!("{x}")));
            record.extend(state.velocity_m_s.iter().map(|x| format!("{x}")));
            record.push(format!("{}", state.mass_kg));
            record.extend(dependent_values.iter().map(|x| format!("{x}")));
            wtr.write_record(&record).context(WriteRecordSnafu)?;
        }

        wtr.flush().map_err(csv::Error::from).context(WriteRecordSnafu)
    }

    /// Exports this trajectory to a CSV file.
    pub fn to_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), ExportError> {
        let path = path.as_ref();
        let file = File::create(path).context(CreateFileSnafu {
            path: path.display().to_string(),
        })?;
        self.write_csv(file)?;
        info!("Trajectory saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod ut_csv {
    use crate::cosmic::VehicleState;
    use crate::linalg::Vector3;
    use crate::md::{DependentVariable, Trajectory};
    use crate::time::{Epoch, Unit};

    #[test]
    fn csv_layout() {
        let epoch = Epoch::from_tdb_seconds(0.0);
        let mut traj = Trajectory::new(vec![DependentVariable::Altitude]);
        traj.push(
            VehicleState::new(epoch, Vector3::new(1.0, 2.0, 3.0), Vector3::zeros(), 10.0),
            vec![0.5],
        );
        traj.push(
            VehicleState::new(
                epoch + 2 * Unit::Second,
                Vector3::new(1.0, 2.0, 4.0),
                Vector3::new(0.0, 0.0, 0.5),
                9.5,
            ),
            vec![1.5],
        );

        let mut buf = Vec::new();
        traj.write_csv(&mut buf).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "epoch,elapsed (s),x (m),y (m),z (m),vx (m/s),vy (m/s),vz (m/s),mass (kg),altitude (m)"
        );
        assert!(lines[2].ends_with(",2,1,2,4,0,0,0.5,9.5,1.5"), "{}", lines[2]);

        // Headers only for an empty trajectory
        let mut buf = Vec::new();
        Trajectory::new(vec![]).write_csv(&mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}
