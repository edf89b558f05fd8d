pub mod grid;
pub mod kernel;
pub mod mpm_state;
pub mod particle;
pub mod particle_set;

pub use grid::{Grid, GridNode};
pub use kernel::{
    STENCIL_NODES, STENCIL_WIDTH, bspline, bspline_derivative, stencil, weight, weight_gradient,
};
pub use mpm_state::{MpmState, RenderParticle};
pub use particle::Particle;
pub use particle_set::ParticleSet;
