use bevy::prelude::*;

use crate::config::constants::GRAVITY;
use crate::math::{Real, Vector};

/// Top-level parameters for one simulation instance.
#[derive(Resource, Clone)]
pub struct SimulationParams {
    /// Grid resolution; particle positions live in `[0, resolution)` index units.
    pub resolution: UVec3,

    /// Gravitational acceleration applied as a grid impulse each substep.
    pub gravity: Vector,

    /// Fixed substep size driven by the plugin schedule.
    pub delta_t: Real,

    /// Carry an affine velocity field per particle (APIC). When false the
    /// resample stage falls back to a FLIP-style velocity blend.
    pub apic: bool,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            resolution: UVec3::splat(64),
            gravity: GRAVITY,
            delta_t: 1e-3,
            apic: true,
        }
    }
}

impl SimulationParams {
    pub fn with_resolution(mut self, resolution: UVec3) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_gravity(mut self, gravity: Vector) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_timestep(mut self, delta_t: Real) -> Self {
        self.delta_t = delta_t;
        self
    }

    /// Disable the affine transfer and use the FLIP blend instead.
    pub fn without_apic(mut self) -> Self {
        self.apic = false;
        self
    }
}
