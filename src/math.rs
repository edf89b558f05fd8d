use bevy::math::{Mat3, Vec3};
use nalgebra as na;

pub type Real = f32;
pub const DIM: usize = 3;

pub type Vector = Vec3;
pub type Matrix = Mat3;
pub type Point = Vec3;

#[inline(always)]
pub fn zero_vector() -> Vector {
    Vec3::ZERO
}

#[inline(always)]
pub fn repeat_vector(value: Real) -> Vector {
    Vec3::splat(value)
}

#[inline(always)]
pub fn zero_matrix() -> Matrix {
    Mat3::ZERO
}

#[inline(always)]
pub fn identity_matrix() -> Matrix {
    Mat3::IDENTITY
}

#[inline(always)]
pub fn matrix_trace(m: &Matrix) -> Real {
    m.x_axis.x + m.y_axis.y + m.z_axis.z
}

#[inline(always)]
pub fn matrix_transpose(m: &Matrix) -> Matrix {
    m.transpose()
}

#[inline(always)]
pub fn matrix_determinant(m: &Matrix) -> Real {
    m.determinant()
}

#[inline(always)]
pub fn matrix_is_finite(m: &Matrix) -> bool {
    m.x_axis.is_finite() && m.y_axis.is_finite() && m.z_axis.is_finite()
}

#[inline(always)]
pub fn diagonal_from_value(value: Real) -> Matrix {
    Matrix::from_diagonal(Vec3::splat(value))
}

#[inline(always)]
pub fn diagonal_from_vec(vec: Vector) -> Matrix {
    Matrix::from_diagonal(vec)
}

/// Column-major outer product `a * b^T`.
#[inline(always)]
pub fn outer_product(a: Vector, b: Vector) -> Matrix {
    Matrix::from_cols(a * b.x, a * b.y, a * b.z)
}

#[inline(always)]
pub fn frobenius_norm(m: &Matrix) -> Real {
    (m.x_axis.length_squared() + m.y_axis.length_squared() + m.z_axis.length_squared()).sqrt()
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct DecomposedTensor {
    pub deviatoric_part: Matrix,
    pub spherical_part: Real,
}

impl DecomposedTensor {
    pub fn decompose(tensor: &Matrix) -> Self {
        let spherical_part = matrix_trace(tensor) / (DIM as Real);
        let mut deviatoric_part = *tensor;
        deviatoric_part.x_axis.x -= spherical_part;
        deviatoric_part.y_axis.y -= spherical_part;
        deviatoric_part.z_axis.z -= spherical_part;
        Self {
            deviatoric_part,
            spherical_part,
        }
    }

    pub fn zero() -> Self {
        Self {
            deviatoric_part: zero_matrix(),
            spherical_part: 0.0,
        }
    }

    pub fn recompose(&self) -> Matrix {
        let mut result = self.deviatoric_part;
        result.x_axis.x += self.spherical_part;
        result.y_axis.y += self.spherical_part;
        result.z_axis.z += self.spherical_part;
        result
    }
}

#[inline]
fn to_nalgebra(m: &Matrix) -> na::Matrix3<Real> {
    na::Matrix3::from_column_slice(&m.to_cols_array())
}

#[inline]
fn from_nalgebra(m: &na::Matrix3<Real>) -> Matrix {
    Matrix::from_cols(
        Vec3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]),
        Vec3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]),
        Vec3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]),
    )
}

/// Full singular value decomposition `m = u * diag(singular_values) * v^T`.
#[derive(Copy, Clone, Debug)]
pub struct Svd3 {
    pub u: Matrix,
    pub singular_values: Vector,
    pub v: Matrix,
}

impl Svd3 {
    pub fn recompose(&self) -> Matrix {
        self.u * diagonal_from_vec(self.singular_values) * self.v.transpose()
    }

    /// Recompose after replacing the singular values.
    pub fn recompose_with(&self, singular_values: Vector) -> Matrix {
        self.u * diagonal_from_vec(singular_values) * self.v.transpose()
    }
}

/// Factorize via nalgebra. Returns `None` when the factorization fails to
/// converge or produces non-finite factors; callers treat that as a
/// numerical fault, not a recoverable state.
pub fn svd(m: &Matrix) -> Option<Svd3> {
    let decomposition = to_nalgebra(m).svd_unordered(true, true);
    let (Some(u), Some(v_t)) = (decomposition.u, decomposition.v_t) else {
        return None;
    };
    let singular_values = Vector::new(
        decomposition.singular_values[0],
        decomposition.singular_values[1],
        decomposition.singular_values[2],
    );
    let u = from_nalgebra(&u);
    let v = from_nalgebra(&v_t.transpose());
    if !singular_values.is_finite() || !matrix_is_finite(&u) || !matrix_is_finite(&v) {
        return None;
    }
    Some(Svd3 {
        u,
        singular_values,
        v,
    })
}

/// Polar decomposition `m = r * s` with `r` a rotation and `s` symmetric,
/// built from the SVD as `r = u * v^T`, `s = v * sig * v^T`.
pub fn polar_decompose(m: &Matrix) -> Option<(Matrix, Matrix)> {
    let svd = svd(m)?;
    let r = svd.u * svd.v.transpose();
    let s = svd.v * diagonal_from_vec(svd.singular_values) * svd.v.transpose();
    if !matrix_is_finite(&r) || !matrix_is_finite(&s) {
        return None;
    }
    Some((r, s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposed_tensor_roundtrip() {
        let m = Matrix::from_cols(
            Vec3::new(2.0, 0.5, 0.0),
            Vec3::new(0.5, -1.0, 0.25),
            Vec3::new(0.0, 0.25, 3.0),
        );
        let decomposed = DecomposedTensor::decompose(&m);
        assert!((matrix_trace(&decomposed.deviatoric_part)).abs() < 1e-5);
        let back = decomposed.recompose();
        assert!(frobenius_norm(&(back - m)) < 1e-5);
    }

    #[test]
    fn svd_recomposes_input() {
        let m = Matrix::from_cols(
            Vec3::new(1.2, 0.1, 0.0),
            Vec3::new(-0.2, 0.9, 0.05),
            Vec3::new(0.0, 0.1, 1.1),
        );
        let svd = svd(&m).unwrap();
        assert!(frobenius_norm(&(svd.recompose() - m)) < 1e-5);
    }

    #[test]
    fn polar_factor_is_rotation() {
        let m = Matrix::from_cols(
            Vec3::new(1.5, 0.2, 0.0),
            Vec3::new(0.0, 0.8, 0.1),
            Vec3::new(0.1, 0.0, 1.0),
        );
        let (r, s) = polar_decompose(&m).unwrap();
        assert!(frobenius_norm(&(r.transpose() * r - identity_matrix())) < 1e-5);
        assert!((matrix_determinant(&r) - 1.0).abs() < 1e-5);
        assert!(frobenius_norm(&(r * s - m)) < 1e-4);
    }
}
