//! Error types for integration and ensemble runs

use crate::physics::math::Scalar;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimulationError {
    /// Invalid time step, horizon, kick schedule, or sampling domain.
    /// Always raised before any integration begins.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// `Omega(J)` requested where `1 + b*J <= 0`.
    #[error("Omega(J) is undefined at J = {action} (requires 1 + b*J > 0)")]
    Domain { action: Scalar },

    #[error("Integration failed at step {index} (t = {time}): {source}")]
    Step {
        index: usize,
        time: Scalar,
        #[source]
        source: Box<SimulationError>,
    },

    #[error("Particle {index} failed: {source}")]
    ParticleFailed {
        index: usize,
        #[source]
        source: Box<SimulationError>,
    },
}

impl SimulationError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Attach the grid position at which a step failed.
    pub fn at_step(self, index: usize, time: Scalar) -> Self {
        Self::Step {
            index,
            time,
            source: Box::new(self),
        }
    }

    /// True when the root cause is an out-of-domain `Omega(J)` evaluation.
    pub fn is_domain_error(&self) -> bool {
        match self {
            Self::Domain { .. } => true,
            Self::Step { source, .. } | Self::ParticleFailed { source, .. } => {
                source.is_domain_error()
            }
            Self::Configuration(_) => false,
        }
    }
}

pub type SimulationResult<T> = Result<T, SimulationError>;
