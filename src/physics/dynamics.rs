//! Dynamics model: rotation law `Ω(J)` and impulsive forcing
//!
//! Hamilton's equations for the two-hammer system read
//!
//! ```text
//! dθ/dt =  ∂H/∂J = Ω(J)          = a / (1 + b·J)^(1/3)
//! dJ/dt = -∂H/∂θ = Σ_k n_k·A_k·sin(n_k·θ)   (only inside kick windows)
//! ```
//!
//! Integrators only see the [`ActionAngleField`] trait, so alternative rotation
//! laws or forcing terms can be swapped in without touching the stepping code.

use crate::error::{SimulationError, SimulationResult};
use crate::physics::kicks::KickSchedule;
use crate::physics::math::Scalar;

/// Right-hand side of Hamilton's equations in action-angle form
pub trait ActionAngleField: Send + Sync {
    /// `dθ/dt` as a function of the action
    fn angular_velocity(&self, action: Scalar) -> SimulationResult<Scalar>;

    /// `dJ/dt` at angle `theta` and time `t`
    fn action_rate(&self, theta: Scalar, t: Scalar) -> Scalar;
}

/// `Ω(J) = a / (1 + b·J)^(1/3)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationLaw {
    a: Scalar,
    b: Scalar,
}

impl RotationLaw {
    /// `a = 1/√2`
    pub const DEFAULT_SCALE: Scalar = 1.0 / core::f64::consts::SQRT_2;
    /// `b = 3√2/π²`
    pub const DEFAULT_STIFFNESS: Scalar =
        3.0 * core::f64::consts::SQRT_2 / (core::f64::consts::PI * core::f64::consts::PI);

    pub fn new(a: Scalar, b: Scalar) -> SimulationResult<Self> {
        if !a.is_finite() || !b.is_finite() {
            return Err(SimulationError::configuration(format!(
                "rotation law coefficients must be finite, got a = {a}, b = {b}"
            )));
        }
        Ok(Self { a, b })
    }

    #[inline]
    pub fn scale(&self) -> Scalar {
        self.a
    }

    #[inline]
    pub fn stiffness(&self) -> Scalar {
        self.b
    }

    /// Rotation rate at action `J`.
    ///
    /// Fails with [`SimulationError::Domain`] when `1 + b·J <= 0`.
    #[inline]
    pub fn omega(&self, action: Scalar) -> SimulationResult<Scalar> {
        let base = 1.0 + self.b * action;
        if base.is_nan() || base <= 0.0 {
            return Err(SimulationError::Domain { action });
        }
        Ok(self.a / libm::pow(base, 1.0 / 3.0))
    }

    /// Smallest action at which `Ω` is still defined (exclusive), if bounded
    pub fn action_lower_bound(&self) -> Option<Scalar> {
        (self.b > 0.0).then(|| -1.0 / self.b)
    }
}

impl Default for RotationLaw {
    fn default() -> Self {
        Self {
            a: Self::DEFAULT_SCALE,
            b: Self::DEFAULT_STIFFNESS,
        }
    }
}

/// Nonlinear rotor driven by a kick schedule
#[derive(Debug, Clone, PartialEq)]
pub struct HammerModel {
    pub rotation: RotationLaw,
    pub kicks: KickSchedule,
}

impl HammerModel {
    pub fn new(rotation: RotationLaw, kicks: KickSchedule) -> Self {
        Self { rotation, kicks }
    }
}

impl ActionAngleField for HammerModel {
    #[inline]
    fn angular_velocity(&self, action: Scalar) -> SimulationResult<Scalar> {
        self.rotation.omega(action)
    }

    #[inline]
    fn action_rate(&self, theta: Scalar, t: Scalar) -> Scalar {
        self.kicks.forcing(theta, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::kicks::{KickEvent, two_hammer_events};

    #[test]
    fn test_default_coefficients() {
        let law = RotationLaw::default();
        assert!((law.scale() - 1.0 / 2.0_f64.sqrt()).abs() < 1e-15);
        let b = 3.0 * 2.0_f64.sqrt() / std::f64::consts::PI.powi(2);
        assert!((law.stiffness() - b).abs() < 1e-15);
    }

    #[test]
    fn test_omega_reference_values() {
        let law = RotationLaw::default();
        assert!((law.omega(0.0).unwrap() - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-15);
        assert!((law.omega(5.1).unwrap() - 0.48022957496833024).abs() < 1e-14);
    }

    #[test]
    fn test_omega_decreases_with_action() {
        let law = RotationLaw::default();
        let mut previous = law.omega(0.0).unwrap();
        for j in 1..50 {
            let current = law.omega(j as Scalar * 0.5).unwrap();
            assert!(current < previous);
            previous = current;
        }
    }

    #[test]
    fn test_omega_domain_error() {
        let law = RotationLaw::default();
        let bound = law.action_lower_bound().unwrap();
        assert!(matches!(
            law.omega(bound - 1e-9),
            Err(SimulationError::Domain { .. })
        ));
        assert!(matches!(
            law.omega(bound - 1.0),
            Err(SimulationError::Domain { .. })
        ));
        assert!(law.omega(bound + 1e-6).is_ok());
        assert!(law.omega(Scalar::NAN).is_err());
    }

    #[test]
    fn test_rejects_non_finite_coefficients() {
        assert!(RotationLaw::new(Scalar::NAN, 1.0).is_err());
        assert!(RotationLaw::new(1.0, Scalar::INFINITY).is_err());
        assert!(RotationLaw::new(0.5, 0.0).unwrap().action_lower_bound().is_none());
    }

    #[test]
    fn test_model_delegates_to_parts() {
        let kicks = KickSchedule::new(two_hammer_events(), 0.09).unwrap();
        let model = HammerModel::new(RotationLaw::default(), kicks);
        assert_eq!(
            model.angular_velocity(2.0).unwrap(),
            RotationLaw::default().omega(2.0).unwrap()
        );
        assert_eq!(
            model.action_rate(0.4, 0.0),
            KickEvent::new(0.0, 1, 0.1).impulse(0.4)
        );
        assert_eq!(model.action_rate(0.4, 42.0), 0.0);
    }
}
