//! Monte Carlo ensembles of independent trajectories
//!
//! Initial conditions are drawn sequentially from one seeded generator, so the
//! set of draws depends only on the seed. Integration is then fanned out with
//! rayon; every particle reads the same grid and model and writes only its own
//! record, and the gather preserves particle order.

pub mod sampling;

use crate::error::{SimulationError, SimulationResult};
use crate::physics::components::PhaseState;
use crate::physics::dynamics::ActionAngleField;
use crate::physics::grid::TimeGrid;
use crate::physics::integrators::Integrator;
use crate::physics::math::Scalar;
use crate::physics::trajectory::{Trajectory, integrate_trajectory};
use crate::resources::SimulationRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub use sampling::{InitialConditionSampler, SamplingDomain, UniformSampler};

/// What to do when one particle's integration fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Stop and return the first failure (lowest particle index)
    #[default]
    Abort,
    /// Keep going; failed particles are listed in [`Ensemble::failures`]
    Continue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EnsembleSettings {
    pub particles: usize,
    pub seed: u64,
    pub failure_policy: FailurePolicy,
    pub parallel: bool,
}

impl EnsembleSettings {
    pub fn new(particles: usize, seed: u64) -> Self {
        Self {
            particles,
            seed,
            failure_policy: FailurePolicy::default(),
            parallel: true,
        }
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleMember {
    pub index: usize,
    pub trajectory: Trajectory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParticleFailure {
    pub index: usize,
    pub initial: PhaseState,
    pub error: SimulationError,
}

/// Trajectories of every successful particle plus the grid they share
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    grid: TimeGrid,
    members: Vec<EnsembleMember>,
    failures: Vec<ParticleFailure>,
}

impl Ensemble {
    #[inline]
    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    /// Successful particles in index order
    #[inline]
    pub fn members(&self) -> &[EnsembleMember] {
        &self.members
    }

    /// Failed particles in index order; always empty under [`FailurePolicy::Abort`]
    #[inline]
    pub fn failures(&self) -> &[ParticleFailure] {
        &self.failures
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn trajectory(&self, index: usize) -> Option<&Trajectory> {
        self.members
            .iter()
            .find(|member| member.index == index)
            .map(|member| &member.trajectory)
    }

    /// Mean action over successful members at each grid time
    ///
    /// Empty when the ensemble has no members.
    pub fn mean_action(&self) -> Vec<Scalar> {
        if self.members.is_empty() {
            return Vec::new();
        }

        let mut sums = vec![0.0; self.grid.len()];
        for member in &self.members {
            for (sum, &action) in sums.iter_mut().zip(member.trajectory.action()) {
                *sum += action;
            }
        }

        let count = self.members.len() as Scalar;
        sums.into_iter().map(|sum| sum / count).collect()
    }
}

/// Draw `settings.particles` initial conditions and integrate each one.
///
/// Deterministic for a fixed seed, and identical whether run in parallel or
/// sequentially.
pub fn run_ensemble(
    settings: &EnsembleSettings,
    sampler: &dyn InitialConditionSampler,
    grid: &TimeGrid,
    field: &dyn ActionAngleField,
    integrator: &dyn Integrator,
) -> SimulationResult<Ensemble> {
    let mut rng = SimulationRng::from_seed(settings.seed);
    let initial_conditions: Vec<PhaseState> = (0..settings.particles)
        .map(|_| sampler.sample(&mut rng))
        .collect();

    debug!(
        particles = settings.particles,
        seed = settings.seed,
        sampler = sampler.name(),
        integrator = integrator.name(),
        parallel = settings.parallel,
        "running ensemble"
    );

    let integrate = |initial: &PhaseState| integrate_trajectory(*initial, grid, field, integrator);
    let results: Vec<SimulationResult<Trajectory>> = if settings.parallel {
        initial_conditions.par_iter().map(integrate).collect()
    } else {
        initial_conditions.iter().map(integrate).collect()
    };

    let mut members = Vec::with_capacity(results.len());
    let mut failures = Vec::new();

    for (index, (result, initial)) in results.into_iter().zip(initial_conditions).enumerate() {
        match result {
            Ok(trajectory) => members.push(EnsembleMember { index, trajectory }),
            Err(error) => match settings.failure_policy {
                FailurePolicy::Abort => {
                    return Err(SimulationError::ParticleFailed {
                        index,
                        source: Box::new(error),
                    });
                }
                FailurePolicy::Continue => {
                    warn!(index, theta_0 = initial.theta, action_0 = initial.action, %error, "particle failed");
                    failures.push(ParticleFailure {
                        index,
                        initial,
                        error,
                    });
                }
            },
        }
    }

    Ok(Ensemble {
        grid: grid.clone(),
        members,
        failures,
    })
}
