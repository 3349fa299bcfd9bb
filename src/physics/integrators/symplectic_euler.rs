//! Symplectic Euler (kick-drift) integration method
//!
//! First-order counterpart of the leapfrog: the whole step's impulse is applied
//! at the start of the step, then the angle drifts with the kicked action. A
//! kick inside its window is thus delivered in one piece instead of as two
//! half-kicks.

use super::Integrator;
use crate::error::SimulationResult;
use crate::physics::components::PhaseState;
use crate::physics::dynamics::ActionAngleField;
use crate::physics::grid::StepInterval;

/// Symplectic Euler integrator (kick then drift)
///
/// ```text
/// J_{i+1} = J_i + F(θ_i, t_i) * dt
/// θ_{i+1} = θ_i + Ω(J_{i+1}) * dt
/// ```
///
/// The action update comes first, which is what makes the map symplectic.
#[derive(Debug, Copy, Clone, Default)]
pub struct SymplecticEuler;

impl Integrator for SymplecticEuler {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn step(
        &self,
        state: &mut PhaseState,
        interval: StepInterval,
        field: &dyn ActionAngleField,
    ) -> SimulationResult<()> {
        let StepInterval { start, dt, .. } = interval;
        let action = state.action + field.action_rate(state.theta, start) * dt;
        let theta = state.theta + field.angular_velocity(action)? * dt;

        *state = PhaseState { theta, action };
        Ok(())
    }

    fn convergence_order(&self) -> usize {
        1
    }

    fn name(&self) -> &'static str {
        "symplectic_euler"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["kick_drift", "euler"]
    }
}
