//! Initial-condition sampling strategies
//!
//! The reference system draws `J_0` uniformly rather than from the target
//! distribution `f_0(J)`. Sampling is therefore a replaceable strategy:
//! implement [`InitialConditionSampler`] to draw from a different law.

use crate::error::{SimulationError, SimulationResult};
use crate::physics::components::PhaseState;
use crate::physics::math::{Scalar, TAU};
use crate::resources::SimulationRng;
use rand::Rng;

/// Rectangle `[0, theta_max) x [0, action_max)` of initial conditions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingDomain {
    theta_max: Scalar,
    action_max: Scalar,
}

impl SamplingDomain {
    pub const DEFAULT_ACTION_MAX: Scalar = 25.0;

    pub fn new(theta_max: Scalar, action_max: Scalar) -> SimulationResult<Self> {
        if !theta_max.is_finite() || theta_max <= 0.0 {
            return Err(SimulationError::configuration(format!(
                "theta_max must be positive and finite, got {theta_max}"
            )));
        }
        if !action_max.is_finite() || action_max <= 0.0 {
            return Err(SimulationError::configuration(format!(
                "action_max must be positive and finite, got {action_max}"
            )));
        }
        Ok(Self {
            theta_max,
            action_max,
        })
    }

    #[inline]
    pub fn theta_max(&self) -> Scalar {
        self.theta_max
    }

    #[inline]
    pub fn action_max(&self) -> Scalar {
        self.action_max
    }

    pub fn contains(&self, state: &PhaseState) -> bool {
        (0.0..self.theta_max).contains(&state.theta)
            && (0.0..self.action_max).contains(&state.action)
    }
}

impl Default for SamplingDomain {
    fn default() -> Self {
        Self {
            theta_max: TAU,
            action_max: Self::DEFAULT_ACTION_MAX,
        }
    }
}

/// Strategy for drawing one initial condition
pub trait InitialConditionSampler: Send + Sync {
    fn sample(&self, rng: &mut SimulationRng) -> PhaseState;

    fn name(&self) -> &'static str;
}

/// Independent uniform draws of `θ_0` and `J_0` over a [`SamplingDomain`]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct UniformSampler {
    pub domain: SamplingDomain,
}

impl UniformSampler {
    pub fn new(domain: SamplingDomain) -> Self {
        Self { domain }
    }
}

impl InitialConditionSampler for UniformSampler {
    fn sample(&self, rng: &mut SimulationRng) -> PhaseState {
        let theta = rng.random_range(0.0..self.domain.theta_max);
        let action = rng.random_range(0.0..self.domain.action_max);
        PhaseState::new(theta, action)
    }

    fn name(&self) -> &'static str {
        "uniform"
    }
}
