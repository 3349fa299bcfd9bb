//! Kick-drift-kick leapfrog

use super::Integrator;
use crate::error::SimulationResult;
use crate::physics::components::PhaseState;
use crate::physics::dynamics::ActionAngleField;
use crate::physics::grid::StepInterval;

/// Kick-drift-kick leapfrog integrator
///
/// Second-order symplectic scheme with the action playing the role of
/// momentum:
///
/// ```text
/// J_half  = J_i + F(θ_i, t_i) * dt/2
/// θ_{i+1} = θ_i + Ω(J_half) * dt
/// J_{i+1} = J_half + F(θ_{i+1}, t_{i+1}) * dt/2
/// ```
///
/// A kick at grid point `t_k` is therefore delivered as two half-kicks, the
/// closing half of the step ending at `t_k` and the opening half of the step
/// starting there, both evaluated at the same angle `θ_k`. Their sum is exactly
/// `F(θ_k, t_k) * dt`. A kick at `t = 0` only receives the opening half.
#[derive(Debug, Copy, Clone, Default)]
pub struct KickDriftKick;

impl Integrator for KickDriftKick {
    fn clone_box(&self) -> Box<dyn Integrator> {
        Box::new(*self)
    }

    fn step(
        &self,
        state: &mut PhaseState,
        interval: StepInterval,
        field: &dyn ActionAngleField,
    ) -> SimulationResult<()> {
        let StepInterval { start, end, dt } = interval;
        let half_dt = 0.5 * dt;

        let action_half = state.action + field.action_rate(state.theta, start) * half_dt;
        let theta = state.theta + field.angular_velocity(action_half)? * dt;
        let action = action_half + field.action_rate(theta, end) * half_dt;

        *state = PhaseState { theta, action };
        Ok(())
    }

    fn convergence_order(&self) -> usize {
        2
    }

    fn name(&self) -> &'static str {
        "kick_drift_kick"
    }

    fn aliases(&self) -> Vec<&'static str> {
        vec!["leapfrog", "kdk"]
    }
}
