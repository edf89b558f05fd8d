//! Fault types for the stepping core.
//!
//! Numerical-degeneracy faults carry the offending state so the caller can
//! log a full dump before halting; they are never retried internally.

use thiserror::Error;

use crate::math::{Matrix, Real, Vector};

#[derive(Debug, Clone, Error)]
pub enum SimulationFault {
    /// SVD/polar factorization produced missing or non-finite factors.
    #[error("degenerate factorization of {matrix:?}")]
    DegenerateFactorization { matrix: Matrix },

    /// Hencky strain needs strictly positive singular values.
    #[error("non-positive singular value {singular_values:?} of {matrix:?}")]
    NonPositiveSingularValue {
        matrix: Matrix,
        singular_values: Vector,
    },

    /// Recomposed SVD drifted past tolerance from its input, so the
    /// factorization cannot be trusted for the plastic projection.
    #[error(
        "SVD reconstruction mismatch ({error:.3e}): {reconstructed:?} vs {matrix:?}"
    )]
    ReconstructionMismatch {
        matrix: Matrix,
        reconstructed: Matrix,
        error: Real,
    },
}
