// Headless demo: drop a snowball onto a friction floor and report timings.
use std::sync::Arc;
use std::time::Instant;

use bevy::math::UVec3;

use mpm3d::geometry::HalfSpace;
use mpm3d::math::{Real, Vector};
use mpm3d::{MaterialLibrary, MpmState, SimulationParams};

const STEPS: usize = 200;

fn main() {
    let params = SimulationParams::default()
        .with_resolution(UVec3::splat(32))
        .with_timestep(2e-4);
    let delta_t = params.delta_t;

    let mut state = MpmState::new(params);
    state.set_level_set(Arc::new(HalfSpace::new(
        Vector::new(0.0, 4.0, 0.0),
        Vector::Y,
        0.4,
    )));

    let library = MaterialLibrary::standard();
    let snow = library.get("snow").expect("standard library has snow");
    let ball_center = Vector::new(16.0, 20.0, 16.0);
    let seeded = state.add_particles(snow, |uvw| {
        let position = uvw * 32.0;
        if (position - ball_center).length() < 4.0 { 1.0 } else { 0.0 }
    });
    println!("seeded {seeded} particles");

    let start = Instant::now();
    for step in 0..STEPS {
        if let Err(fault) = state.substep(delta_t) {
            println!("halted at step {step}: {fault}");
            return;
        }
    }
    let avg_ms = start.elapsed().as_secs_f64() * 1000.0 / STEPS as f64;
    println!("{STEPS} substeps: {avg_ms:.3}ms avg");

    let snapshot = state.render_particles();
    let mean_height =
        snapshot.iter().map(|p| p.position.y).sum::<Real>() / snapshot.len().max(1) as Real;
    println!(
        "{} render particles, mean centered height {:.2} at t = {:.3}",
        snapshot.len(),
        mean_height,
        state.current_time()
    );
}
