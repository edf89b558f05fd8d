pub mod g2p;
pub mod grid_update;
pub mod p2g;

pub use g2p::resample;
pub use grid_update::apply_boundary_conditions;
pub use p2g::{apply_deformation_force, rasterize};
