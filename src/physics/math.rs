/// Scalar type for physics calculations (f64 for precision)
pub type Scalar = f64;

/// Full turn, the period of the angle variable
pub const TAU: Scalar = core::f64::consts::TAU;

/// Reduce an angle to `[0, 2π)` for output.
///
/// The working state is never wrapped; only emitted samples are.
#[inline]
pub fn wrap_angle(theta: Scalar) -> Scalar {
    let wrapped = theta.rem_euclid(TAU);
    // rem_euclid rounds tiny negative inputs up to exactly TAU
    if wrapped >= TAU { 0.0 } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_angle_positive() {
        assert_eq!(wrap_angle(0.13), 0.13);
        assert!((wrap_angle(TAU + 0.5) - 0.5).abs() < 1e-12);
        assert!((wrap_angle(10.0 * TAU + 1.0) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrap_angle_stays_in_half_open_range() {
        for theta in [-1e-17, -TAU, -0.5, 0.0, TAU, 4.0 * TAU - 1e-15, 1e6] {
            let wrapped = wrap_angle(theta);
            assert!(
                (0.0..TAU).contains(&wrapped),
                "wrap_angle({theta}) = {wrapped}"
            );
        }
    }

    #[test]
    fn test_wrap_angle_negative() {
        assert!((wrap_angle(-0.5) - (TAU - 0.5)).abs() < 1e-12);
    }
}
