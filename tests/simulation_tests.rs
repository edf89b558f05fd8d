//! End-to-end substep scenarios.

use std::sync::Arc;

use bevy::math::{IVec3, UVec3};

use mpm3d::geometry::HalfSpace;
use mpm3d::math::{Real, Vector, matrix_determinant};
use mpm3d::{MaterialConfig, MpmState, Particle, SimulationParams};

const DT: Real = 1e-3;

fn state_with_gravity(gravity: Vector) -> MpmState {
    let params = SimulationParams::default()
        .with_resolution(UVec3::splat(32))
        .with_gravity(gravity)
        .with_timestep(DT);
    MpmState::new(params)
}

#[test]
fn free_fall_matches_gravity_impulse() {
    let mut state = state_with_gravity(Vector::new(0.0, -9.8, 0.0));
    state.add_particle(Particle::new(Vector::splat(16.5)));

    state.substep(DT).unwrap();

    let particle = &state.particles()[0];
    assert!((particle.velocity.y + 9.8 * DT).abs() < 1e-4);
    assert!(particle.velocity.x.abs() < 1e-4);
    assert!(particle.velocity.z.abs() < 1e-4);
    assert!(particle.position.y < 16.5);
    assert!((state.current_time() - DT).abs() < 1e-9);
}

#[test]
fn free_fall_without_apic_gives_same_impulse() {
    let params = SimulationParams::default()
        .with_resolution(UVec3::splat(32))
        .with_gravity(Vector::new(0.0, -9.8, 0.0))
        .with_timestep(DT)
        .without_apic();
    let mut state = MpmState::new(params);
    state.add_particle(Particle::new(Vector::splat(16.5)));

    state.substep(DT).unwrap();

    let particle = &state.particles()[0];
    assert!((particle.velocity.y + 9.8 * DT).abs() < 1e-4);
    assert_eq!(particle.apic_b, mpm3d::math::zero_matrix());
}

#[test]
fn sticky_boundary_zeroes_band_nodes() {
    let mut state = state_with_gravity(Vector::new(0.0, -9.8, 0.0));
    state.set_level_set(Arc::new(HalfSpace::new(
        Vector::new(0.0, 4.0, 0.0),
        Vector::Y,
        -1.0,
    )));
    state.add_particle(
        Particle::new(Vector::new(16.5, 5.2, 16.5)).with_velocity(Vector::new(0.0, -2.0, 0.0)),
    );

    state.substep(DT).unwrap();

    // The y = 5 plane sits at phi = 1, inside the boundary band; the
    // boundary is static, so post-step grid velocity there is exactly zero.
    let grid = state.grid();
    let index = grid.linear_index(IVec3::new(16, 5, 16));
    let velocity = grid.node(index).lock().unwrap().velocity;
    assert_eq!(velocity, Vector::ZERO);
}

#[test]
fn mass_is_conserved_through_a_substep() {
    let mut state = state_with_gravity(Vector::new(0.0, -9.8, 0.0));
    for i in 0..4 {
        for j in 0..4 {
            state.add_particle(
                Particle::new(Vector::new(14.2 + i as Real, 15.3, 14.1 + j as Real))
                    .with_mass(1.5),
            );
        }
    }
    let particle_mass = state.particle_set().total_mass();

    state.substep(DT).unwrap();

    assert!((state.grid_mut().total_mass() - particle_mass).abs() < 1e-3);
}

#[test]
fn momentum_is_consistent_without_gravity() {
    let mut state = state_with_gravity(Vector::ZERO);
    state.add_particle(Particle::new(Vector::new(14.4, 16.5, 15.2)).with_velocity(Vector::X));
    state.add_particle(
        Particle::new(Vector::new(17.6, 16.1, 16.8))
            .with_velocity(Vector::new(0.0, 0.5, -1.0))
            .with_mass(2.0),
    );
    let momentum_before = state.particle_set().total_momentum();

    state.substep(DT).unwrap();

    // No gravity, no boundary, undeformed material: the grid holds the
    // particles' momentum and hands it back.
    assert!((state.grid_mut().total_momentum() - momentum_before).length() < 1e-3);
    assert!((state.particle_set().total_momentum() - momentum_before).length() < 1e-3);
}

#[test]
fn deformation_gradients_stay_invertible() {
    let mut state = state_with_gravity(Vector::new(0.0, -9.8, 0.0));
    let snow = MaterialConfig::snow().with_compression(0.95);
    let sand = MaterialConfig::sand();
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                let offset = Vector::new(i as Real, j as Real, k as Real);
                state.add_particle(Particle::from_config(
                    Vector::new(12.4, 14.3, 12.6) + offset,
                    &snow,
                ));
                state.add_particle(Particle::from_config(
                    Vector::new(18.5, 14.2, 18.4) + offset,
                    &sand,
                ));
            }
        }
    }

    for _ in 0..5 {
        state.substep(1e-4).unwrap();
    }

    for particle in state.particles() {
        assert!(matrix_determinant(&particle.dg_e) > 0.0);
        assert!(matrix_determinant(&particle.dg_p) > 0.0);
        assert!(!particle.failed);
    }
}

#[test]
fn particles_settle_onto_friction_floor() {
    let params = SimulationParams::default()
        .with_resolution(UVec3::splat(32))
        .with_gravity(Vector::new(0.0, -9.8, 0.0))
        .with_timestep(1e-4);
    let mut state = MpmState::new(params);
    state.set_level_set(Arc::new(HalfSpace::new(
        Vector::new(0.0, 4.0, 0.0),
        Vector::Y,
        0.4,
    )));
    state.add_particle(
        Particle::new(Vector::new(16.5, 5.5, 16.5)).with_velocity(Vector::new(0.0, -2.0, 0.0)),
    );

    for _ in 0..5000 {
        state.substep(1e-4).unwrap();
    }

    let particle = &state.particles()[0];
    // Never through the floor, and no longer falling fast.
    assert!(particle.position.y >= 4.0 - 1e-3);
    assert!(particle.velocity.y.abs() < 0.5);
    assert!(particle.velocity.is_finite());
}
