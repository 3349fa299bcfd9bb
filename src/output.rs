//! Flat numeric tables
//!
//! One comma-separated row of times shared by every trajectory, then one row
//! per trajectory for θ and one for J. Values are written in the shortest form
//! that round-trips unless a fixed number of decimals is requested.

use crate::ensemble::Ensemble;
use crate::physics::grid::TimeGrid;
use crate::physics::math::Scalar;
use crate::physics::trajectory::Trajectory;
use chrono::Local;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

pub const SINGLE_TIMES_FILE: &str = "ts.csv";
pub const SINGLE_THETAS_FILE: &str = "thetas.csv";
pub const SINGLE_ACTIONS_FILE: &str = "Js.csv";

pub const ENSEMBLE_TIMES_FILE: &str = "ts_analytic.csv";
pub const ENSEMBLE_THETAS_FILE: &str = "thetas_analytic.csv";
pub const ENSEMBLE_ACTIONS_FILE: &str = "Js_analytic.csv";
pub const FAILURES_FILE: &str = "failures.csv";

/// Where and how tables are written
#[derive(Debug, Clone, PartialEq)]
pub struct TableWriter {
    directory: PathBuf,
    precision: Option<usize>,
}

impl TableWriter {
    pub fn new(directory: impl Into<PathBuf>, precision: Option<usize>) -> Self {
        Self {
            directory: directory.into(),
            precision,
        }
    }

    /// Writer rooted at a fresh `run-YYYYmmdd-HHMMSS` directory under `base`
    pub fn timestamped(base: impl AsRef<Path>, precision: Option<usize>) -> Self {
        let stamp = Local::now().format("%Y%m%d-%H%M%S");
        Self::new(base.as_ref().join(format!("run-{stamp}")), precision)
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn precision(&self) -> Option<usize> {
        self.precision
    }

    pub fn format_value(&self, value: Scalar) -> String {
        match self.precision {
            Some(decimals) => format!("{value:.decimals$}"),
            None => value.to_string(),
        }
    }

    fn write_row(&self, out: &mut impl Write, values: &[Scalar]) -> io::Result<()> {
        for (i, &value) in values.iter().enumerate() {
            if i > 0 {
                out.write_all(b",")?;
            }
            out.write_all(self.format_value(value).as_bytes())?;
        }
        out.write_all(b"\n")
    }

    fn write_table<'a>(
        &self,
        name: &str,
        rows: impl IntoIterator<Item = &'a [Scalar]>,
    ) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(name);
        let mut out = BufWriter::new(File::create(&path)?);
        for row in rows {
            self.write_row(&mut out, row)?;
        }
        out.flush()?;
        Ok(path)
    }

    /// `ts.csv`, `thetas.csv`, `Js.csv` for one trajectory
    pub fn write_single(&self, grid: &TimeGrid, trajectory: &Trajectory) -> io::Result<Vec<PathBuf>> {
        let paths = vec![
            self.write_table(SINGLE_TIMES_FILE, [grid.times()])?,
            self.write_table(SINGLE_THETAS_FILE, [trajectory.theta()])?,
            self.write_table(SINGLE_ACTIONS_FILE, [trajectory.action()])?,
        ];
        info!("Wrote trajectory tables to {}", self.directory.display());
        Ok(paths)
    }

    /// Time axis plus one θ row and one J row per successful particle.
    /// `failures.csv` is added only when some particle failed.
    pub fn write_ensemble(&self, ensemble: &Ensemble) -> io::Result<Vec<PathBuf>> {
        let members = ensemble.members();
        let mut paths = vec![
            self.write_table(ENSEMBLE_TIMES_FILE, [ensemble.grid().times()])?,
            self.write_table(
                ENSEMBLE_THETAS_FILE,
                members.iter().map(|m| m.trajectory.theta()),
            )?,
            self.write_table(
                ENSEMBLE_ACTIONS_FILE,
                members.iter().map(|m| m.trajectory.action()),
            )?,
        ];

        if !ensemble.is_complete() {
            paths.push(self.write_failures(ensemble)?);
        }

        info!(
            "Wrote {} trajectories to {}",
            members.len(),
            self.directory.display()
        );
        Ok(paths)
    }

    fn write_failures(&self, ensemble: &Ensemble) -> io::Result<PathBuf> {
        std::fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(FAILURES_FILE);
        let mut out = BufWriter::new(File::create(&path)?);
        writeln!(out, "index,theta_0,action_0,error")?;
        for failure in ensemble.failures() {
            writeln!(
                out,
                "{},{},{},\"{}\"",
                failure.index,
                self.format_value(failure.initial.theta),
                self.format_value(failure.initial.action),
                failure.error.to_string().replace('"', "'")
            )?;
        }
        out.flush()?;
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ensemble::{EnsembleSettings, FailurePolicy, InitialConditionSampler, run_ensemble};
    use crate::physics::components::PhaseState;
    use crate::physics::dynamics::{HammerModel, RotationLaw};
    use crate::physics::integrators::KickDriftKick;
    use crate::physics::kicks::KickSchedule;
    use crate::physics::trajectory::run_single_trajectory;
    use crate::resources::SimulationRng;

    fn scratch_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("hammerdrift-output-{}-{}", name, std::process::id()))
    }

    fn free_rotor(grid: &TimeGrid) -> HammerModel {
        HammerModel::new(RotationLaw::default(), KickSchedule::empty(0.9 * grid.dt()).unwrap())
    }

    fn parse_row(line: &str) -> Vec<Scalar> {
        line.split(',').map(|v| v.parse().unwrap()).collect()
    }

    #[test]
    fn test_lossless_by_default() {
        let writer = TableWriter::new(".", None);
        let value = 0.1 + 0.2;
        assert_eq!(writer.format_value(value).parse::<Scalar>().unwrap(), value);
        assert_eq!(writer.format_value(100.0), "100");
    }

    #[test]
    fn test_fixed_precision() {
        let writer = TableWriter::new(".", Some(4));
        assert_eq!(writer.format_value(5.100648170713098), "5.1006");
        assert_eq!(writer.format_value(0.0), "0.0000");
    }

    #[test]
    fn test_single_tables() {
        let dir = scratch_dir("single");
        let grid = TimeGrid::new(0.5, 2.0).unwrap();
        let trajectory =
            run_single_trajectory(PhaseState::new(0.13, 5.1), &grid, &free_rotor(&grid)).unwrap();

        let writer = TableWriter::new(&dir, None);
        let paths = writer.write_single(&grid, &trajectory).unwrap();
        assert_eq!(paths.len(), 3);

        let times = std::fs::read_to_string(dir.join(SINGLE_TIMES_FILE)).unwrap();
        assert_eq!(times, "0,0.5,1,1.5,2\n");

        let thetas = std::fs::read_to_string(dir.join(SINGLE_THETAS_FILE)).unwrap();
        assert_eq!(parse_row(thetas.trim_end()), trajectory.theta());

        let actions = std::fs::read_to_string(dir.join(SINGLE_ACTIONS_FILE)).unwrap();
        assert_eq!(parse_row(actions.trim_end()), vec![5.1; 5]);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_ensemble_tables_have_one_row_per_particle() {
        let dir = scratch_dir("ensemble");
        let grid = TimeGrid::new(0.1, 3.0).unwrap();
        let ensemble = run_ensemble(
            &EnsembleSettings::new(4, 17),
            &crate::ensemble::UniformSampler::default(),
            &grid,
            &free_rotor(&grid),
            &KickDriftKick,
        )
        .unwrap();

        let writer = TableWriter::new(&dir, Some(6));
        let paths = writer.write_ensemble(&ensemble).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(!dir.join(FAILURES_FILE).exists());

        let thetas = std::fs::read_to_string(dir.join(ENSEMBLE_THETAS_FILE)).unwrap();
        let rows: Vec<&str> = thetas.lines().collect();
        assert_eq!(rows.len(), 4);
        for row in rows {
            assert_eq!(row.split(',').count(), grid.len());
        }

        let times = std::fs::read_to_string(dir.join(ENSEMBLE_TIMES_FILE)).unwrap();
        assert_eq!(times.lines().count(), 1);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_failures_table() {
        struct Negative;
        impl InitialConditionSampler for Negative {
            fn sample(&self, _rng: &mut SimulationRng) -> PhaseState {
                PhaseState::new(0.5, -50.0)
            }
            fn name(&self) -> &'static str {
                "negative"
            }
        }

        let dir = scratch_dir("failures");
        let grid = TimeGrid::new(0.1, 1.0).unwrap();
        let settings = EnsembleSettings::new(2, 0).with_failure_policy(FailurePolicy::Continue);
        let ensemble =
            run_ensemble(&settings, &Negative, &grid, &free_rotor(&grid), &KickDriftKick).unwrap();

        let paths = TableWriter::new(&dir, None).write_ensemble(&ensemble).unwrap();
        assert_eq!(paths.len(), 4);

        let failures = std::fs::read_to_string(dir.join(FAILURES_FILE)).unwrap();
        let lines: Vec<&str> = failures.lines().collect();
        assert_eq!(lines[0], "index,theta_0,action_0,error");
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("0,0.5,-50,"));

        let thetas = std::fs::read_to_string(dir.join(ENSEMBLE_THETAS_FILE)).unwrap();
        assert!(thetas.is_empty());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_timestamped_directory_name() {
        let writer = TableWriter::timestamped("out", None);
        let name = writer
            .directory()
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap()
            .to_string();
        assert!(name.starts_with("run-"));
        assert_eq!(name.len(), "run-20250101-120000".len());
        assert_eq!(writer.directory().parent(), Some(Path::new("out")));
    }
}
