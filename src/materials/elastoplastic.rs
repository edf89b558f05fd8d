//! Snow-like elastoplastic material
//!
//! Fixed-corotated elasticity with exponential hardening driven by the
//! plastic volume change, and plasticity that clamps the elastic stretch
//! into a critical compression/stretch band. The clamp is what turns
//! excess deformation into permanent (plastic) deformation.

use crate::config::constants::{
    HARDENING_EXPONENT_CLAMP, PLASTIC_SINGULAR_VALUE_MAX, PLASTIC_SINGULAR_VALUE_MIN,
};
use crate::config::materials::ElastoplasticParams;
use crate::error::SimulationFault;
use crate::math::{Matrix, Real, Vector, matrix_determinant, polar_decompose, svd};

#[derive(Clone, Copy, Debug)]
pub struct Elastoplastic {
    pub params: ElastoplasticParams,
}

impl Elastoplastic {
    pub fn new(params: ElastoplasticParams) -> Self {
        Self { params }
    }

    /// Derivative of the strain energy with respect to the elastic
    /// deformation gradient, with Lamé parameters hardened by
    /// `exp(min(hardening * (1 - J_p), 10))`.
    fn energy_gradient(&self, dg_e: &Matrix, dg_p: &Matrix) -> Result<Matrix, SimulationFault> {
        let j_e = matrix_determinant(dg_e);
        let j_p = matrix_determinant(dg_p);
        let hardening = (self.params.hardening * (1.0 - j_p))
            .min(HARDENING_EXPONENT_CLAMP)
            .exp();
        let mu = self.params.mu_0 * hardening;
        let lambda = self.params.lambda_0 * hardening;
        let (r, _s) = polar_decompose(dg_e).ok_or(SimulationFault::DegenerateFactorization {
            matrix: *dg_e,
        })?;
        Ok(2.0 * mu * (*dg_e - r) + lambda * (j_e - 1.0) * j_e * dg_e.transpose().inverse())
    }

    /// Piola stress times the elastic cofactor, scattered as a grid force.
    pub fn calculate_force(
        &self,
        dg_e: &Matrix,
        dg_p: &Matrix,
        volume: Real,
    ) -> Result<Matrix, SimulationFault> {
        Ok(-volume * self.energy_gradient(dg_e, dg_p)? * dg_e.transpose())
    }

    /// Clamp the elastic stretch, then push whatever was clamped off into
    /// the plastic part recovered from the cached total deformation.
    pub fn plasticity(
        &self,
        dg_e: &mut Matrix,
        dg_p: &mut Matrix,
        dg_cache: &Matrix,
    ) -> Result<(), SimulationFault> {
        let svd_e = svd(dg_e).ok_or(SimulationFault::DegenerateFactorization {
            matrix: *dg_e,
        })?;
        let clamped = svd_e.singular_values.clamp(
            Vector::splat(1.0 - self.params.theta_c),
            Vector::splat(1.0 + self.params.theta_s),
        );
        *dg_e = svd_e.recompose_with(clamped);
        *dg_p = dg_e.inverse() * *dg_cache;

        let svd_p = svd(dg_p).ok_or(SimulationFault::DegenerateFactorization {
            matrix: *dg_p,
        })?;
        let clamped_p = svd_p.singular_values.clamp(
            Vector::splat(PLASTIC_SINGULAR_VALUE_MIN),
            Vector::splat(PLASTIC_SINGULAR_VALUE_MAX),
        );
        *dg_p = svd_p.recompose_with(clamped_p);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{diagonal_from_vec, identity_matrix};

    #[test]
    fn undeformed_state_is_stress_free() {
        let material = Elastoplastic::new(ElastoplasticParams::default());
        let identity = identity_matrix();
        let force = material.calculate_force(&identity, &identity, 1.0).unwrap();
        // Moduli are ~1e5, so anything at unit scale would be real stress.
        assert!(crate::math::frobenius_norm(&force) < 1.0);
    }

    #[test]
    fn plasticity_clamps_stretch() {
        let params = ElastoplasticParams {
            theta_s: 0.1,
            ..ElastoplasticParams::default()
        };
        let material = Elastoplastic::new(params);
        let mut dg_e = diagonal_from_vec(Vector::new(2.0, 1.0, 1.0));
        let mut dg_p = identity_matrix();
        let dg_cache = dg_e;
        material.plasticity(&mut dg_e, &mut dg_p, &dg_cache).unwrap();

        let sig = svd(&dg_e).unwrap().singular_values;
        assert!((sig.max_element() - 1.1).abs() < 1e-4);
        assert!(matrix_determinant(&dg_e) > 0.0);
        assert!(matrix_determinant(&dg_p) > 0.0);
    }

    #[test]
    fn plasticity_preserves_admissible_state() {
        let material = Elastoplastic::new(ElastoplasticParams::default());
        let mut dg_e = diagonal_from_vec(Vector::new(1.001, 0.999, 1.0));
        let mut dg_p = identity_matrix();
        let dg_cache = dg_e;
        let before = dg_e;
        material.plasticity(&mut dg_e, &mut dg_p, &dg_cache).unwrap();
        assert!(crate::math::frobenius_norm(&(dg_e - before)) < 1e-4);
    }
}
