//! Sand-like granular material
//!
//! Stress comes from Hencky (logarithmic) strain evaluated on the singular
//! values of the elastic deformation gradient; plasticity projects the log
//! strain onto a Drucker-Prager yield cone whose opening hardens with
//! accumulated plastic strain.

use crate::config::constants::SVD_RECONSTRUCTION_TOLERANCE;
use crate::config::materials::DruckerPragerParams;
use crate::error::SimulationFault;
use crate::materials::utils::friction_alpha;
use crate::math::{
    DIM, DecomposedTensor, Matrix, Real, Vector, diagonal_from_vec, frobenius_norm, matrix_trace,
    svd,
};

#[derive(Clone, Copy, Debug)]
pub struct DruckerPrager {
    pub params: DruckerPragerParams,
    /// Current cone opening; re-derived from the hardening curve after
    /// every plastic step.
    pub alpha: Real,
    /// Accumulated plastic strain.
    pub q: Real,
}

impl DruckerPrager {
    pub fn new(params: DruckerPragerParams) -> Self {
        Self {
            alpha: params.alpha,
            q: 0.0,
            params,
        }
    }

    pub fn calculate_force(&self, dg_e: &Matrix, volume: Real) -> Result<Matrix, SimulationFault> {
        let svd_e = svd(dg_e).ok_or(SimulationFault::DegenerateFactorization {
            matrix: *dg_e,
        })?;
        let sig = svd_e.singular_values;
        if sig.min_element() <= 0.0 {
            return Err(SimulationFault::NonPositiveSingularValue {
                matrix: *dg_e,
                singular_values: sig,
            });
        }

        let log_sig = Vector::new(sig.x.ln(), sig.y.ln(), sig.z.ln());
        let inv_sig = sig.recip();
        let center = diagonal_from_vec(2.0 * self.params.mu_0 * inv_sig * log_sig)
            + self.params.lambda_0 * (log_sig.x + log_sig.y + log_sig.z) * diagonal_from_vec(inv_sig);
        Ok(-volume * (svd_e.u * center * svd_e.v.transpose()) * dg_e.transpose())
    }

    /// Project the log strain of `sigma` onto the yield cone. Returns the
    /// projected singular values and the plastic strain increment.
    fn project(&self, sigma: Vector, alpha: Real) -> (Vector, Real) {
        let epsilon = diagonal_from_vec(Vector::new(sigma.x.ln(), sigma.y.ln(), sigma.z.ln()));
        let trace = matrix_trace(&epsilon);
        let decomposed = DecomposedTensor::decompose(&epsilon);
        let epsilon_norm = frobenius_norm(&epsilon);
        let hat_norm = frobenius_norm(&decomposed.deviatoric_part);

        if hat_norm <= 0.0 || trace > 0.0 {
            // Expansion or pure volumetric strain: fully plastic, no
            // deviatoric stress survives.
            return (Vector::ONE, epsilon_norm);
        }

        let delta_gamma = hat_norm
            + (DIM as Real * self.params.lambda_0 + 2.0 * self.params.mu_0)
                / (2.0 * self.params.mu_0)
                * trace
                * alpha;
        if delta_gamma <= 0.0 {
            return (sigma, 0.0);
        }

        let h = epsilon - delta_gamma / hat_norm * decomposed.deviatoric_part;
        let projected = Vector::new(
            h.x_axis.x.exp(),
            h.y_axis.y.exp(),
            h.z_axis.z.exp(),
        );
        (projected, delta_gamma)
    }

    pub fn plasticity(&mut self, dg_e: &mut Matrix, dg_p: &mut Matrix) -> Result<(), SimulationFault> {
        let svd_e = svd(dg_e).ok_or(SimulationFault::DegenerateFactorization {
            matrix: *dg_e,
        })?;

        // The projection only makes sense if the factorization actually
        // represents dg_e; drift past tolerance means the factorization
        // cannot be trusted and the run halts.
        let reconstructed = svd_e.recompose();
        let error = frobenius_norm(&(reconstructed - *dg_e));
        if !(error < SVD_RECONSTRUCTION_TOLERANCE) {
            return Err(SimulationFault::ReconstructionMismatch {
                matrix: *dg_e,
                reconstructed,
                error,
            });
        }

        let (projected, delta_q) = self.project(svd_e.singular_values, self.alpha);
        *dg_e = svd_e.recompose_with(projected);
        *dg_p = svd_e.v
            * diagonal_from_vec(projected.recip())
            * diagonal_from_vec(svd_e.singular_values)
            * svd_e.v.transpose()
            * *dg_p;

        self.q += delta_q;
        let phi = self.params.h_0
            + (self.params.h_1 * self.q - self.params.h_3) * (-self.params.h_2 * self.q).exp();
        self.alpha = friction_alpha(phi);
        Ok(())
    }
}
