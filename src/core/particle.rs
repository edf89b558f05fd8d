//! Material particles for MPM simulation
//!
//! Particles carry position, velocity, mass and the elastic/plastic split
//! of their deformation gradient, plus the per-step transfer scratch the
//! solver fills in (APIC matrix, cached total deformation, stress force).

use crate::config::materials::MaterialConfig;
use crate::error::SimulationFault;
use crate::geometry::LevelSet;
use crate::materials::MaterialModel;
use crate::math::{
    Matrix, Real, Vector, diagonal_from_value, identity_matrix, zero_matrix, zero_vector,
};

#[derive(Clone)]
pub struct Particle {
    /// Continuous position in grid-index units.
    pub position: Vector,
    pub velocity: Vector,
    pub mass: Real,
    pub volume: Real,

    /// Elastic part of the deformation gradient.
    pub dg_e: Matrix,
    /// Plastic part; `dg_e * dg_p` approximates the total deformation.
    pub dg_p: Matrix,
    /// Pre-split total deformation cached by resampling for the same
    /// step's plasticity update.
    pub dg_cache: Matrix,

    /// APIC affine velocity matrix; zeroed when the stencil is incomplete
    /// or the affine transfer is disabled.
    pub apic_b: Matrix,
    /// Stress-like force computed once per step and scattered to the grid.
    pub tmp_force: Matrix,

    pub material: MaterialModel,

    /// Set when a numerical fault originated at this particle.
    pub failed: bool,
}

impl Particle {
    /// Build a particle from a material configuration. The plastic part
    /// starts as `compression * I` so seeded material can begin pre-packed.
    pub fn from_config(position: Vector, config: &MaterialConfig) -> Self {
        Self {
            position,
            velocity: config.initial_velocity,
            mass: 1.0,
            volume: 1.0,
            dg_e: identity_matrix(),
            dg_p: diagonal_from_value(config.compression),
            dg_cache: identity_matrix(),
            apic_b: zero_matrix(),
            tmp_force: zero_matrix(),
            material: MaterialModel::from_config(config),
            failed: false,
        }
    }

    pub fn new(position: Vector) -> Self {
        Self::from_config(position, &MaterialConfig::default())
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_mass(mut self, mass: Real) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_volume(mut self, volume: Real) -> Self {
        self.volume = volume;
        self
    }

    #[inline(always)]
    pub fn momentum(&self) -> Vector {
        self.velocity * self.mass
    }

    /// Evaluate the material response into `tmp_force`.
    pub fn calculate_force(&mut self) -> Result<(), SimulationFault> {
        self.tmp_force = self
            .material
            .calculate_force(&self.dg_e, &self.dg_p, self.volume)?;
        Ok(())
    }

    /// Re-split the cached total deformation into admissible elastic and
    /// plastic parts.
    pub fn plasticity(&mut self) -> Result<(), SimulationFault> {
        self.material
            .plasticity(&mut self.dg_e, &mut self.dg_p, &self.dg_cache)
    }

    /// Project the particle out of the boundary and drop any remaining
    /// inward normal velocity; friction is handled at the grid stage.
    pub fn resolve_collision(&mut self, level_set: &dyn LevelSet, time: Real) {
        let phi = level_set.sample(self.position, time);
        if phi < 0.0 {
            let normal = level_set.spatial_gradient(self.position, time);
            self.position -= phi * normal;
            let normal_speed = self.velocity.dot(normal);
            if normal_speed < 0.0 {
                self.velocity -= normal_speed * normal;
            }
        }
    }
}

impl Default for Particle {
    fn default() -> Self {
        Self::new(zero_vector())
    }
}
