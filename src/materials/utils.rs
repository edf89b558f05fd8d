//! Helper functions for materials
//!
//! Math and parameter conversions shared by the constitutive models.

use crate::math::Real;

/// Drucker-Prager cone opening from a friction angle in degrees:
/// `alpha = sqrt(2/3) * 2 sin(phi) / (3 - sin(phi))`.
#[inline]
pub fn friction_alpha(phi_degrees: Real) -> Real {
    let sin_phi = phi_degrees.to_radians().sin();
    (2.0 / 3.0 as Real).sqrt() * 2.0 * sin_phi / (3.0 - sin_phi)
}

/// Physics parameter conversions shared by solid materials.
pub mod physics {
    use crate::math::Real;

    /// Lamé parameters (lambda, mu) from Young's modulus and Poisson ratio.
    #[inline]
    pub fn lame_lambda_mu(young_modulus: Real, poisson_ratio: Real) -> (Real, Real) {
        let lambda = young_modulus * poisson_ratio
            / ((1.0 + poisson_ratio) * (1.0 - 2.0 * poisson_ratio));
        let mu = shear_modulus(young_modulus, poisson_ratio);
        (lambda, mu)
    }

    /// Shear modulus (mu) from Young's modulus and Poisson ratio.
    #[inline]
    pub fn shear_modulus(young_modulus: Real, poisson_ratio: Real) -> Real {
        young_modulus / (2.0 * (1.0 + poisson_ratio))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn friction_alpha_increases_with_angle() {
        let low = friction_alpha(10.0);
        let high = friction_alpha(45.0);
        assert!(low > 0.0);
        assert!(high > low);
    }

    #[test]
    fn lame_conversion_matches_hand_values() {
        // E = 1.4e5, nu = 0.2 gives lambda = mu/1.5... check directly.
        let (lambda, mu) = physics::lame_lambda_mu(1.4e5, 0.2);
        assert!((mu - 1.4e5 / 2.4).abs() < 1.0);
        assert!((lambda - 1.4e5 * 0.2 / (1.2 * 0.6)).abs() < 1.0);
    }
}
