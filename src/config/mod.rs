//! Configuration and parameters
//!
//! Constants, solver settings, and material presets.

pub mod constants;
pub mod materials;
pub mod solver_params;

pub use constants::*;
pub use materials::*;
pub use solver_params::*;
