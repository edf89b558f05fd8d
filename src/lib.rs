use bevy::prelude::*;

pub mod config;
pub mod core;
pub mod error;
pub mod geometry;
pub mod materials;
pub mod math;
pub mod solver;

// Public re-exports for clean API
pub use crate::config::{MaterialConfig, MaterialKind, MaterialLibrary, SimulationParams};
pub use crate::core::{Grid, MpmState, Particle, ParticleSet, RenderParticle};
pub use crate::error::SimulationFault;
pub use crate::geometry::{HalfSpace, LevelSet, Sphere};
pub use crate::materials::MaterialModel;

pub struct MpmPlugin;

impl Plugin for MpmPlugin {
    fn build(&self, app: &mut App) {
        let params = SimulationParams::default();
        app.insert_resource(MpmState::new(params.clone()))
            .insert_resource(params)
            .insert_resource(MaterialLibrary::standard())
            .add_systems(Update, step_simulation);
    }
}

/// Advance the simulation by one fixed substep per frame. A numerical
/// fault halts stepping; the faulted state stays around for inspection.
pub fn step_simulation(mut state: ResMut<MpmState>) {
    if state.is_faulted() {
        return;
    }
    let delta_t = state.params().delta_t;
    if let Err(fault) = state.substep(delta_t) {
        error!("substep aborted: {fault}");
    }
}
