//! Particle-to-Grid (P2G) transfer operations
//!
//! Rasterizes mass and APIC momentum onto the grid, then scatters the
//! per-particle deformation forces. Both scatters run particle-parallel
//! with per-node locking; mass and force accumulation never race.

use std::sync::Mutex;

use bevy::prelude::*;
use rayon::prelude::*;

use crate::config::constants::APIC_MOMENTUM_SCALE;
use crate::core::grid::Grid;
use crate::core::kernel::{stencil, weight, weight_gradient};
use crate::core::particle::Particle;
use crate::error::SimulationFault;
use crate::math::Real;

/// Reset the grid and accumulate `weight * mass` and APIC momentum from
/// every particle, then divide momentum through by mass. Nodes that
/// receive no mass keep a zero velocity.
pub fn rasterize(grid: &mut Grid, particles: &[Particle]) {
    grid.reset();
    let shared = &*grid;
    particles.par_iter().for_each(|particle| {
        for coord in stencil(particle.position) {
            if !shared.contains(coord) {
                continue;
            }
            let d_pos = coord.as_vec3() - particle.position;
            let contribution = weight(d_pos) * particle.mass;
            let index = shared.linear_index(coord);
            let mut node = shared.node(index).lock().unwrap();
            node.mass += contribution;
            node.velocity += contribution
                * (particle.velocity + APIC_MOMENTUM_SCALE * (particle.apic_b * d_pos));
        }
    });
    grid.normalize_velocities();
}

/// Evaluate each particle's constitutive force, then scatter
/// `delta_t / mass * tmp_force * grad_w` into the grid velocities.
/// A constitutive fault aborts the step before any force reaches the grid.
pub fn apply_deformation_force(
    grid: &Grid,
    particles: &mut [Particle],
    delta_t: Real,
) -> Result<(), SimulationFault> {
    let faults = Mutex::new(Vec::new());
    particles.par_iter_mut().for_each(|particle| {
        if let Err(fault) = particle.calculate_force() {
            particle.failed = true;
            error!(
                "{} force computation failed at {:?}: {fault}",
                particle.material.material_name(),
                particle.position
            );
            faults.lock().unwrap().push(fault);
        }
    });
    if let Some(fault) = faults.into_inner().unwrap().into_iter().next() {
        return Err(fault);
    }

    particles.par_iter().for_each(|particle| {
        for coord in stencil(particle.position) {
            if !grid.contains(coord) {
                continue;
            }
            let d_pos = particle.position - coord.as_vec3();
            let force = particle.tmp_force * weight_gradient(d_pos);
            let index = grid.linear_index(coord);
            let mut node = grid.node(index).lock().unwrap();
            if node.mass == 0.0 {
                continue;
            }
            let mass = node.mass;
            node.velocity += (delta_t / mass) * force;
        }
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::UVec3;
    use crate::math::Vector;

    fn interior_particles() -> Vec<Particle> {
        vec![
            Particle::new(Vector::new(8.4, 8.6, 8.2)).with_velocity(Vector::new(1.0, 0.0, -2.0)),
            Particle::new(Vector::new(9.1, 8.9, 8.7))
                .with_velocity(Vector::new(0.0, 3.0, 0.0))
                .with_mass(2.0),
        ]
    }

    #[test]
    fn rasterize_conserves_mass() {
        let mut grid = Grid::new(UVec3::splat(16));
        let particles = interior_particles();
        let particle_mass: f32 = particles.iter().map(|p| p.mass).sum();
        rasterize(&mut grid, &particles);
        assert!((grid.total_mass() - particle_mass).abs() < 1e-4);
    }

    #[test]
    fn rasterize_conserves_momentum() {
        let mut grid = Grid::new(UVec3::splat(16));
        let particles = interior_particles();
        let particle_momentum: Vector = particles.iter().map(|p| p.momentum()).sum();
        rasterize(&mut grid, &particles);
        assert!((grid.total_momentum() - particle_momentum).length() < 1e-4);
    }

    #[test]
    fn undeformed_particles_scatter_no_force() {
        let mut grid = Grid::new(UVec3::splat(16));
        let mut particles = interior_particles();
        rasterize(&mut grid, &particles);
        let momentum_before = grid.total_momentum();
        apply_deformation_force(&grid, &mut particles, 1e-3).unwrap();
        assert!((grid.total_momentum() - momentum_before).length() < 1e-4);
    }
}
