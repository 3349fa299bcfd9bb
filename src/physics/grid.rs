//! Fixed-step time grid shared by every trajectory in a run

use crate::error::{SimulationError, SimulationResult};
use crate::physics::math::Scalar;

/// Upper bound on grid length; keeps a mistyped horizon from exhausting memory
pub const MAX_GRID_POINTS: usize = 100_000_000;

/// Ordered, immutable timepoints `t_i = i * dt` for `i = 0 .. N-1`,
/// with `N = floor(t_final / dt) + 1`.
/// One step between consecutive grid points.
///
/// `dt` is the grid step itself, not `end - start`, which can differ from it
/// in the last bit.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StepInterval {
    pub start: Scalar,
    pub end: Scalar,
    pub dt: Scalar,
}

impl StepInterval {
    /// Interval `t -> t + dt`, for stepping outside a grid
    pub fn new(start: Scalar, dt: Scalar) -> Self {
        Self {
            start,
            end: start + dt,
            dt,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimeGrid {
    dt: Scalar,
    times: Vec<Scalar>,
}

impl TimeGrid {
    pub fn new(dt: Scalar, t_final: Scalar) -> SimulationResult<Self> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(SimulationError::configuration(format!(
                "time step must be positive and finite, got {dt}"
            )));
        }
        if !t_final.is_finite() || t_final < 0.0 {
            return Err(SimulationError::configuration(format!(
                "final time must be non-negative and finite, got {t_final}"
            )));
        }

        let steps = (t_final / dt).floor();
        if steps >= MAX_GRID_POINTS as Scalar {
            return Err(SimulationError::configuration(format!(
                "time grid would need {steps} steps (limit {MAX_GRID_POINTS})"
            )));
        }

        let len = steps as usize + 1;
        let times = (0..len).map(|i| i as Scalar * dt).collect();

        Ok(Self { dt, times })
    }

    #[inline]
    pub fn dt(&self) -> Scalar {
        self.dt
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Never true for a constructed grid; present for API symmetry.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    #[inline]
    pub fn times(&self) -> &[Scalar] {
        &self.times
    }

    #[inline]
    pub fn time(&self, index: usize) -> Option<Scalar> {
        self.times.get(index).copied()
    }

    /// The `N - 1` steps `t_i -> t_{i+1}`, with both ends taken from the grid
    pub fn steps(&self) -> impl Iterator<Item = StepInterval> + '_ {
        self.times.windows(2).map(|pair| StepInterval {
            start: pair[0],
            end: pair[1],
            dt: self.dt,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid_length() {
        let grid = TimeGrid::new(0.1, 300.0).unwrap();
        assert_eq!(grid.len(), 3001);
        assert_eq!(grid.times()[0], 0.0);
        assert_eq!(grid.time(1000), Some(100.0));
        assert!((grid.times()[3000] - 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_horizon_has_single_point() {
        let grid = TimeGrid::new(0.1, 0.0).unwrap();
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.times(), &[0.0]);
        assert!(!grid.is_empty());
    }

    #[test]
    fn test_horizon_shorter_than_step() {
        let grid = TimeGrid::new(1.0, 0.5).unwrap();
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn test_times_are_not_accumulated() {
        let grid = TimeGrid::new(0.1, 300.0).unwrap();
        for (i, &t) in grid.times().iter().enumerate() {
            assert_eq!(t, i as Scalar * 0.1);
        }
    }

    #[test]
    fn test_steps_end_on_next_grid_point() {
        let grid = TimeGrid::new(0.1, 300.0).unwrap();
        let steps: Vec<StepInterval> = grid.steps().collect();
        assert_eq!(steps.len(), grid.len() - 1);

        for (i, step) in steps.iter().enumerate() {
            assert_eq!(step.start, grid.times()[i]);
            assert_eq!(step.end, grid.times()[i + 1]);
            assert_eq!(step.dt, 0.1);
        }
        // 5 * 0.1 + 0.1 rounds differently from 6 * 0.1
        assert_ne!(steps[5].end, steps[5].start + 0.1);
    }

    #[test]
    fn test_single_point_grid_has_no_steps() {
        assert_eq!(TimeGrid::new(0.1, 0.0).unwrap().steps().count(), 0);
    }

    #[test]
    fn test_rejects_bad_step() {
        for dt in [0.0, -0.1, Scalar::NAN, Scalar::INFINITY] {
            let result = TimeGrid::new(dt, 10.0);
            assert!(
                matches!(result, Err(SimulationError::Configuration(_))),
                "dt = {dt} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_bad_horizon() {
        for t_final in [-1.0, Scalar::NAN, Scalar::INFINITY] {
            assert!(TimeGrid::new(0.1, t_final).is_err());
        }
    }

    #[test]
    fn test_rejects_oversized_grid() {
        assert!(TimeGrid::new(1e-12, 1e6).is_err());
    }
}
