//! Level-set boundary contract
//!
//! The simulation consumes boundaries purely through signed-distance
//! sampling; the actual level-set data structure lives outside this crate.
//! Analytic half-space and sphere surfaces are provided for tests and
//! small scenes.

use crate::math::{Real, Vector};

/// Sampling contract for an implicit boundary. Positions are in grid-index
/// units, distances in the same scale.
pub trait LevelSet: Send + Sync {
    /// Signed distance at `position`; negative inside the solid.
    fn sample(&self, position: Vector, time: Real) -> Real;

    /// Unit-ish outward normal of the signed distance field.
    fn spatial_gradient(&self, position: Vector, time: Real) -> Vector;

    /// Rate at which the surface advances along its outward normal; the
    /// boundary solver reconstructs the boundary velocity as
    /// `temporal_derivative * spatial_gradient`.
    fn temporal_derivative(&self, position: Vector, time: Real) -> Real;

    /// Coulomb friction coefficient; a negative value means sticky.
    fn friction(&self) -> Real;
}

/// Flat boundary advancing with constant speed along its normal.
#[derive(Clone, Copy, Debug)]
pub struct HalfSpace {
    pub origin: Vector,
    pub normal: Vector,
    /// Surface speed along `normal`.
    pub speed: Real,
    pub friction: Real,
}

impl HalfSpace {
    pub fn new(origin: Vector, normal: Vector, friction: Real) -> Self {
        Self {
            origin,
            normal: normal.normalize(),
            speed: 0.0,
            friction,
        }
    }

    pub fn with_speed(mut self, speed: Real) -> Self {
        self.speed = speed;
        self
    }
}

impl LevelSet for HalfSpace {
    fn sample(&self, position: Vector, time: Real) -> Real {
        (position - self.origin).dot(self.normal) - self.speed * time
    }

    fn spatial_gradient(&self, _position: Vector, _time: Real) -> Vector {
        self.normal
    }

    fn temporal_derivative(&self, _position: Vector, _time: Real) -> Real {
        self.speed
    }

    fn friction(&self) -> Real {
        self.friction
    }
}

/// Static sphere obstacle.
#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub center: Vector,
    pub radius: Real,
    pub friction: Real,
}

impl Sphere {
    pub fn new(center: Vector, radius: Real, friction: Real) -> Self {
        Self {
            center,
            radius,
            friction,
        }
    }
}

impl LevelSet for Sphere {
    fn sample(&self, position: Vector, _time: Real) -> Real {
        (position - self.center).length() - self.radius
    }

    fn spatial_gradient(&self, position: Vector, _time: Real) -> Vector {
        let offset = position - self.center;
        let length = offset.length();
        if length > 1e-6 {
            offset / length
        } else {
            Vector::Y
        }
    }

    fn temporal_derivative(&self, _position: Vector, _time: Real) -> Real {
        0.0
    }

    fn friction(&self) -> Real {
        self.friction
    }
}
