//! Phase-space state for a single particle

use crate::physics::math::{Scalar, wrap_angle};
use serde::{Deserialize, Serialize};

/// Action-angle pair `(θ, J)`
///
/// `theta` is kept unwrapped while integrating; `action` is unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseState {
    pub theta: Scalar,
    pub action: Scalar,
}

impl PhaseState {
    pub fn new(theta: Scalar, action: Scalar) -> Self {
        Self { theta, action }
    }

    /// Copy of this state with the angle reduced to `[0, 2π)`
    #[inline]
    pub fn wrapped(&self) -> Self {
        Self {
            theta: wrap_angle(self.theta),
            action: self.action,
        }
    }
}
