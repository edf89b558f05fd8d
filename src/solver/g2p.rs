//! Grid-to-Particle (G2P) transfer operations
//!
//! Gathers velocities, the APIC affine matrix, and the velocity gradient
//! back to particles, then folds the incremental deformation into the
//! elastic gradient while caching the unsplit total for plasticity.

use rayon::prelude::*;

use crate::core::grid::Grid;
use crate::core::kernel::{STENCIL_NODES, stencil, weight, weight_gradient};
use crate::core::particle::Particle;
use crate::math::{Real, identity_matrix, outer_product, zero_matrix, zero_vector};

/// Resample grid velocities to particles. With APIC enabled the particle
/// takes the gathered velocity and a fresh affine matrix; otherwise it
/// takes the FLIP blend against the pre-force velocity backup. A particle
/// whose stencil was clipped by the domain boundary gets no affine matrix.
pub fn resample(grid: &Grid, particles: &mut [Particle], delta_t: Real, apic: bool) {
    let alpha = if apic { 0.0 } else { 1.0 };
    particles.par_iter_mut().for_each(|particle| {
        let mut velocity = zero_vector();
        let mut backup_velocity = zero_vector();
        let mut affine = zero_matrix();
        let mut cdg = zero_matrix();
        let mut count = 0usize;

        for coord in stencil(particle.position) {
            if !grid.contains(coord) {
                continue;
            }
            count += 1;
            let d_pos = particle.position - coord.as_vec3();
            let w = weight(d_pos);
            let grad_w = weight_gradient(d_pos);
            let index = grid.linear_index(coord);
            let grid_velocity = grid.node(index).lock().unwrap().velocity;

            velocity += w * grid_velocity;
            affine += w * outer_product(grid_velocity, -d_pos);
            backup_velocity += w * grid.velocity_backup(index);
            cdg += outer_product(grid_velocity, grad_w);
        }

        if count != STENCIL_NODES || !apic {
            affine = zero_matrix();
        }
        particle.apic_b = affine;

        let cdg = identity_matrix() + delta_t * cdg;
        particle.velocity =
            (1.0 - alpha) * velocity + alpha * (velocity - backup_velocity + particle.velocity);

        let total = cdg * particle.dg_e * particle.dg_p;
        particle.dg_e = cdg * particle.dg_e;
        particle.dg_cache = total;
    });
}
