//! Single-trajectory integration over a time grid

use crate::error::SimulationResult;
use crate::physics::components::PhaseState;
use crate::physics::dynamics::ActionAngleField;
use crate::physics::grid::TimeGrid;
use crate::physics::integrators::{Integrator, KickDriftKick};
use crate::physics::math::Scalar;

/// Recorded `(θ_i, J_i)` series for one initial condition
///
/// Angles are stored reduced to `[0, 2π)`; actions are stored as integrated.
/// Both series have exactly one entry per grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    initial: PhaseState,
    theta: Vec<Scalar>,
    action: Vec<Scalar>,
}

impl Trajectory {
    #[inline]
    pub fn initial(&self) -> PhaseState {
        self.initial
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.theta.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.theta.is_empty()
    }

    /// Wrapped angles, one per grid point
    #[inline]
    pub fn theta(&self) -> &[Scalar] {
        &self.theta
    }

    /// Actions, one per grid point
    #[inline]
    pub fn action(&self) -> &[Scalar] {
        &self.action
    }

    /// Recorded state at grid index `i`
    pub fn sample(&self, i: usize) -> Option<PhaseState> {
        Some(PhaseState::new(*self.theta.get(i)?, *self.action.get(i)?))
    }

    /// `(t, θ, J)` triples paired with the grid this trajectory was run on
    pub fn samples<'a>(
        &'a self,
        grid: &'a TimeGrid,
    ) -> impl Iterator<Item = (Scalar, Scalar, Scalar)> + 'a {
        grid.times()
            .iter()
            .zip(self.theta.iter().zip(self.action.iter()))
            .map(|(&t, (&theta, &action))| (t, theta, action))
    }

    pub fn final_state(&self) -> Option<PhaseState> {
        self.len().checked_sub(1).and_then(|last| self.sample(last))
    }
}

/// Integrate one trajectory across `grid` with the given scheme.
///
/// On failure nothing is returned: a trajectory truncated at the failing step
/// is discarded rather than handed back.
pub fn integrate_trajectory(
    initial: PhaseState,
    grid: &TimeGrid,
    field: &dyn ActionAngleField,
    integrator: &dyn Integrator,
) -> SimulationResult<Trajectory> {
    let mut theta = Vec::with_capacity(grid.len());
    let mut action = Vec::with_capacity(grid.len());

    let mut state = initial;
    let first = state.wrapped();
    theta.push(first.theta);
    action.push(first.action);

    for (i, interval) in grid.steps().enumerate() {
        integrator
            .step(&mut state, interval, field)
            .map_err(|error| error.at_step(i, interval.start))?;

        let recorded = state.wrapped();
        theta.push(recorded.theta);
        action.push(recorded.action);
    }

    Ok(Trajectory {
        initial,
        theta,
        action,
    })
}

/// Integrate one trajectory with the canonical kick-drift-kick scheme
pub fn run_single_trajectory(
    initial: PhaseState,
    grid: &TimeGrid,
    field: &dyn ActionAngleField,
) -> SimulationResult<Trajectory> {
    integrate_trajectory(initial, grid, field, &KickDriftKick)
}
