//! Impulsive "hammer" forcing
//!
//! A kick contributes `n * A * sin(n * θ)` to `dJ/dt` whenever the current time
//! lies strictly inside its tolerance window, `|t - t_k| < tolerance`. Between
//! windows the forcing is exactly zero, so the action is conserved.

use crate::error::{SimulationError, SimulationResult};
use crate::physics::grid::TimeGrid;
use crate::physics::math::Scalar;
use serde::{Deserialize, Serialize};

/// Tolerance window as a fraction of the grid step
pub const DEFAULT_TOLERANCE_FRACTION: Scalar = 0.9;

/// A single hammer blow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KickEvent {
    /// Trigger time `t_k`
    pub time: Scalar,
    /// Harmonic order `n_k`
    pub harmonic: i32,
    /// Amplitude `A_k`
    pub amplitude: Scalar,
}

impl KickEvent {
    pub fn new(time: Scalar, harmonic: i32, amplitude: Scalar) -> Self {
        Self {
            time,
            harmonic,
            amplitude,
        }
    }

    /// Impulse strength at angle `theta`: `n * A * sin(n * θ)`
    #[inline]
    pub fn impulse(&self, theta: Scalar) -> Scalar {
        let n = self.harmonic as Scalar;
        n * self.amplitude * libm::sin(n * theta)
    }
}

/// Ordered set of kicks plus the window used to match them against grid times
#[derive(Debug, Clone, PartialEq)]
pub struct KickSchedule {
    events: Vec<KickEvent>,
    tolerance: Scalar,
}

impl KickSchedule {
    /// Build a schedule; events are sorted by trigger time.
    pub fn new(mut events: Vec<KickEvent>, tolerance: Scalar) -> SimulationResult<Self> {
        if !tolerance.is_finite() || tolerance <= 0.0 {
            return Err(SimulationError::configuration(format!(
                "kick tolerance must be positive and finite, got {tolerance}"
            )));
        }
        if let Some(bad) = events
            .iter()
            .find(|event| !event.time.is_finite() || !event.amplitude.is_finite())
        {
            return Err(SimulationError::configuration(format!(
                "kick event has a non-finite time or amplitude: {bad:?}"
            )));
        }

        events.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self { events, tolerance })
    }

    /// Schedule whose window is `fraction * dt` of the given grid.
    ///
    /// `fraction` must lie in `(0, 1)`: a window of a full step or wider
    /// would match one event on two or more grid points.
    pub fn for_grid(
        events: Vec<KickEvent>,
        grid: &TimeGrid,
        fraction: Scalar,
    ) -> SimulationResult<Self> {
        if fraction >= 1.0 {
            return Err(SimulationError::configuration(format!(
                "kick tolerance fraction must be below 1 so each kick fires on at most one grid point, got {fraction}"
            )));
        }
        Self::new(events, fraction * grid.dt())
    }

    /// Schedule with no kicks at all (pure rotation)
    pub fn empty(tolerance: Scalar) -> SimulationResult<Self> {
        Self::new(Vec::new(), tolerance)
    }

    #[inline]
    pub fn events(&self) -> &[KickEvent] {
        &self.events
    }

    #[inline]
    pub fn tolerance(&self) -> Scalar {
        self.tolerance
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Whether `event` fires at time `t`
    #[inline]
    pub fn fires_at(&self, event: &KickEvent, t: Scalar) -> bool {
        (t - event.time).abs() < self.tolerance
    }

    /// Events whose window contains `t`
    pub fn active_at(&self, t: Scalar) -> impl Iterator<Item = &KickEvent> {
        self.events.iter().filter(move |event| self.fires_at(event, t))
    }

    /// `dJ/dt` at `(θ, t)`: sum over active events, zero when none match
    pub fn forcing(&self, theta: Scalar, t: Scalar) -> Scalar {
        self.active_at(t).map(|event| event.impulse(theta)).sum()
    }

    /// Events that never fall inside the window of any point of `grid`.
    ///
    /// Such kicks are silently skipped during integration; callers can use
    /// this to report a misaligned schedule before running.
    pub fn unreachable_on(&self, grid: &TimeGrid) -> Vec<KickEvent> {
        self.events
            .iter()
            .filter(|event| !grid.times().iter().any(|&t| self.fires_at(event, t)))
            .copied()
            .collect()
    }
}

/// The two-hammer schedule of the reference system:
/// `(t=0, n=1, A=0.1)` and `(t=100, n=3, A=0.2)`
pub fn two_hammer_events() -> Vec<KickEvent> {
    vec![KickEvent::new(0.0, 1, 0.1), KickEvent::new(100.0, 3, 0.2)]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_hammers() -> KickSchedule {
        KickSchedule::new(two_hammer_events(), 0.9 * 0.1).unwrap()
    }

    #[test]
    fn test_forcing_matches_single_event() {
        let schedule = two_hammers();
        let theta: Scalar = 0.13;
        let expected = 1.0 * 0.1 * theta.sin();
        assert!((schedule.forcing(theta, 0.0) - expected).abs() < 1e-15);

        let expected = 3.0 * 0.2 * (3.0 * theta).sin();
        assert!((schedule.forcing(theta, 100.0) - expected).abs() < 1e-15);
    }

    #[test]
    fn test_forcing_is_zero_between_kicks() {
        let schedule = two_hammers();
        assert_eq!(schedule.forcing(1.0, 50.0), 0.0);
        assert_eq!(schedule.forcing(1.0, 0.1), 0.0);
        assert_eq!(schedule.forcing(1.0, 300.0), 0.0);
    }

    #[test]
    fn test_tolerance_boundary() {
        let schedule = two_hammers();
        let event = schedule.events()[1];
        assert!(schedule.fires_at(&event, 100.0));
        assert!(!schedule.fires_at(&event, 99.8));
        assert!(!schedule.fires_at(&event, 100.2));
        // neighbouring grid points are a full step away, outside 0.9 * dt
        assert!(!schedule.fires_at(&event, 999.0 * 0.1));
        assert!(!schedule.fires_at(&event, 1001.0 * 0.1));
    }

    #[test]
    fn test_overlapping_events_sum() {
        let schedule =
            KickSchedule::new(vec![KickEvent::new(1.0, 1, 0.5), KickEvent::new(1.0, 2, 0.25)], 0.05)
                .unwrap();
        let theta: Scalar = 0.7;
        let expected = 0.5 * theta.sin() + 2.0 * 0.25 * (2.0 * theta).sin();
        assert!((schedule.forcing(theta, 1.0) - expected).abs() < 1e-15);
        assert_eq!(schedule.active_at(1.0).count(), 2);
    }

    #[test]
    fn test_events_are_sorted() {
        let schedule = KickSchedule::new(
            vec![KickEvent::new(100.0, 3, 0.2), KickEvent::new(0.0, 1, 0.1)],
            0.09,
        )
        .unwrap();
        assert_eq!(schedule.events()[0].time, 0.0);
        assert_eq!(schedule.events()[1].time, 100.0);
    }

    #[test]
    fn test_rejects_invalid_schedule() {
        assert!(KickSchedule::new(two_hammer_events(), 0.0).is_err());
        assert!(KickSchedule::new(two_hammer_events(), Scalar::NAN).is_err());
        assert!(KickSchedule::new(vec![KickEvent::new(Scalar::NAN, 1, 0.1)], 0.09).is_err());
        assert!(KickSchedule::new(vec![KickEvent::new(1.0, 1, Scalar::INFINITY)], 0.09).is_err());
    }

    #[test]
    fn test_unreachable_events() {
        let grid = TimeGrid::new(0.1, 10.0).unwrap();
        let aligned = KickSchedule::for_grid(two_hammer_events(), &grid, 0.9).unwrap();
        // t = 100 lies beyond a 10-unit horizon
        assert_eq!(aligned.unreachable_on(&grid), vec![KickEvent::new(100.0, 3, 0.2)]);

        let narrow =
            KickSchedule::for_grid(vec![KickEvent::new(0.05, 1, 0.1)], &grid, 0.3).unwrap();
        assert_eq!(narrow.unreachable_on(&grid).len(), 1);
    }

    #[test]
    fn test_rejects_window_of_a_full_step_or_wider() {
        let grid = TimeGrid::new(0.1, 2.0).unwrap();
        let kick = vec![KickEvent::new(1.0, 1, 0.5)];

        for fraction in [1.0, 1.5, Scalar::INFINITY] {
            assert!(matches!(
                KickSchedule::for_grid(kick.clone(), &grid, fraction),
                Err(SimulationError::Configuration(_))
            ));
        }
        assert!(KickSchedule::for_grid(kick.clone(), &grid, 0.0).is_err());
        assert!(KickSchedule::for_grid(kick, &grid, Scalar::NAN).is_err());
    }

    #[test]
    fn test_aligned_kick_fires_on_one_grid_point() {
        let grid = TimeGrid::new(0.1, 2.0).unwrap();
        let schedule =
            KickSchedule::for_grid(vec![KickEvent::new(1.0, 1, 0.5)], &grid, 0.99).unwrap();

        let firing: Vec<Scalar> = grid
            .times()
            .iter()
            .copied()
            .filter(|&t| schedule.active_at(t).count() > 0)
            .collect();
        assert_eq!(firing.len(), 1);
        assert!((firing[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_schedule() {
        let schedule = KickSchedule::empty(0.09).unwrap();
        assert!(schedule.is_empty());
        assert_eq!(schedule.forcing(2.0, 0.0), 0.0);
    }
}
