//! Cubic B-spline interpolation kernel
//!
//! Shared by the rasterize/force/resample transfer stages. The kernel has
//! support `|x| < 2`, so every particle touches the 4x4x4 block of nodes
//! whose corner sits at `floor(pos) - 1`.

use bevy::math::IVec3;

use crate::math::{Real, Vector};

/// Nodes per axis in the transfer stencil.
pub const STENCIL_WIDTH: i32 = 4;
/// Total nodes in a complete stencil; the affine transfer is only valid
/// when all of them contributed.
pub const STENCIL_NODES: usize = 64;

/// 1D cubic B-spline weight. Callers guarantee `|x| <= 2`; violating that
/// is a stencil-bound defect upstream, not a recoverable condition.
#[inline(always)]
pub fn bspline(x: Real) -> Real {
    let x = x.abs();
    debug_assert!(x <= 2.0);
    if x < 1.0 {
        0.5 * x * x * x - x * x + 2.0 / 3.0
    } else {
        -1.0 / 6.0 * x * x * x + x * x - 2.0 * x + 4.0 / 3.0
    }
}

/// Derivative of [`bspline`], same support contract.
#[inline(always)]
pub fn bspline_derivative(x: Real) -> Real {
    let s = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x * s;
    debug_assert!(x <= 2.0);
    let xx = x * x;
    let val = if x < 1.0 {
        1.5 * xx - 2.0 * x
    } else {
        -0.5 * xx + 2.0 * x - 2.0
    };
    s * val
}

/// Separable 3D weight.
#[inline(always)]
pub fn weight(d: Vector) -> Real {
    bspline(d.x) * bspline(d.y) * bspline(d.z)
}

/// Gradient of the separable 3D weight.
#[inline(always)]
pub fn weight_gradient(d: Vector) -> Vector {
    Vector::new(
        bspline_derivative(d.x) * bspline(d.y) * bspline(d.z),
        bspline(d.x) * bspline_derivative(d.y) * bspline(d.z),
        bspline(d.x) * bspline(d.y) * bspline_derivative(d.z),
    )
}

/// Enumerate the 64 node coordinates of a particle's stencil, unclipped.
/// Transfer code filters against the grid bounds and counts the survivors
/// to detect incomplete stencils near the domain boundary.
#[inline]
pub fn stencil(position: Vector) -> impl Iterator<Item = IVec3> {
    let base = position.floor().as_ivec3() - IVec3::ONE;
    (0..STENCIL_WIDTH).flat_map(move |i| {
        (0..STENCIL_WIDTH).flat_map(move |j| {
            (0..STENCIL_WIDTH).map(move |k| base + IVec3::new(i, j, k))
        })
    })
}
