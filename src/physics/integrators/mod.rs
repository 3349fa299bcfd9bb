//! Numerical integration methods for impulsively forced action-angle dynamics
//!
//! Every integrator advances one [`PhaseState`] across a single grid step
//! `t_i -> t_{i+1}`. Forcing is only ever sampled at the interval's end
//! points, which is what lets kicks be matched with a sub-step tolerance
//! window.

use crate::error::SimulationResult;
use crate::physics::components::PhaseState;
use crate::physics::dynamics::ActionAngleField;
use crate::physics::grid::StepInterval;

pub mod kick_drift_kick;
pub mod registry;
pub mod symplectic_euler;

pub use kick_drift_kick::KickDriftKick;
pub use registry::IntegratorRegistry;
pub use symplectic_euler::SymplecticEuler;

/// Name of the integrator used when none is configured
pub const DEFAULT_INTEGRATOR: &str = "kick_drift_kick";

/// Base trait for all integrators
///
/// Integrators are stateless. A step either succeeds and overwrites `state`,
/// or fails and leaves `state` untouched.
pub trait Integrator: Send + Sync {
    fn clone_box(&self) -> Box<dyn Integrator>;

    /// Advance `state` from `interval.start` to `interval.end`
    fn step(
        &self,
        state: &mut PhaseState,
        interval: StepInterval,
        field: &dyn ActionAngleField,
    ) -> SimulationResult<()>;

    /// Order of the global error for smooth forcing
    fn convergence_order(&self) -> usize;

    /// Canonical name used for registry lookup
    fn name(&self) -> &'static str;

    fn aliases(&self) -> Vec<&'static str> {
        Vec::new()
    }
}

impl Clone for Box<dyn Integrator> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl std::fmt::Debug for dyn Integrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Integrator")
            .field("name", &self.name())
            .field("order", &self.convergence_order())
            .finish()
    }
}
