// Calibrated constants for the MPM stepping core. The transfer and
// plasticity values are physical calibration for the snow/sand models
// and are not meant to be tuned per scene.
use bevy::math::Vec4;

use crate::math::{Real, Vector};

// Global physics
pub const GRAVITY: Vector = Vector::new(0.0, -9.8, 0.0);

// Normalizes the cubic-kernel second moment in APIC momentum transfer.
pub const APIC_MOMENTUM_SCALE: Real = 3.0;

// Keeps advected particles strictly inside the index domain.
pub const POSITION_EPS: Real = 1e-4;

// Exponent cap for the elastoplastic hardening factor.
pub const HARDENING_EXPONENT_CLAMP: Real = 10.0;

// Admissible singular-value range for the plastic deformation gradient.
pub const PLASTIC_SINGULAR_VALUE_MIN: Real = 0.1;
pub const PLASTIC_SINGULAR_VALUE_MAX: Real = 10.0;

// Frobenius tolerance before an SVD recomposition counts as a fault.
pub const SVD_RECONSTRUCTION_TOLERANCE: Real = 1e-4;

// Signed distance beyond which grid nodes ignore the boundary.
pub const BOUNDARY_INFLUENCE_BAND: Real = 1.0;

// Tangential speeds below this are not normalized during friction.
pub const TANGENT_EPS: Real = 1e-6;

// Fixed display color for exported render particles.
pub const RENDER_COLOR: Vec4 = Vec4::new(0.8, 0.9, 1.0, 0.5);
