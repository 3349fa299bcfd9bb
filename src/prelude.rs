//! hammerdrift prelude module
//!
//! Re-exports the types most callers need to build a model and run it.

pub use rand::Rng;

pub use crate::config::SimulationConfig;
pub use crate::error::{SimulationError, SimulationResult};
pub use crate::resources::SimulationRng;

// Ensemble
pub use crate::ensemble::{
    Ensemble, EnsembleSettings, FailurePolicy, InitialConditionSampler, SamplingDomain,
    UniformSampler, run_ensemble,
};

// Physics
pub use crate::physics::components::PhaseState;
pub use crate::physics::dynamics::{ActionAngleField, HammerModel, RotationLaw};
pub use crate::physics::grid::{StepInterval, TimeGrid};
pub use crate::physics::integrators::{Integrator, IntegratorRegistry, KickDriftKick, SymplecticEuler};
pub use crate::physics::kicks::{KickEvent, KickSchedule};
pub use crate::physics::math::{Scalar, TAU, wrap_angle};
pub use crate::physics::trajectory::{Trajectory, integrate_trajectory, run_single_trajectory};
