// Headless plugin demo: a snowball dropped toward a sticky floor, stepped
// through the bevy schedule one substep per frame.
use std::sync::Arc;

use bevy::prelude::*;

use mpm3d::geometry::HalfSpace;
use mpm3d::math::Vector;
use mpm3d::{MaterialLibrary, MpmPlugin, MpmState};

const FRAMES: usize = 100;

fn main() {
    let mut app = App::new();
    app.add_plugins(MpmPlugin);

    {
        let world = app.world_mut();
        let library = world.resource::<MaterialLibrary>().clone();
        let snow = library.get("snow").expect("standard library has snow");
        let mut state = world.resource_mut::<MpmState>();
        state.set_level_set(Arc::new(HalfSpace::new(
            Vector::new(0.0, 8.0, 0.0),
            Vector::Y,
            -1.0,
        )));
        let ball_center = Vector::new(32.0, 44.0, 32.0);
        state.add_particles(snow, |uvw| {
            let position = uvw * 64.0;
            if (position - ball_center).length() < 6.0 { 1.0 } else { 0.0 }
        });
    }

    for _ in 0..FRAMES {
        app.update();
    }

    let state = app.world().resource::<MpmState>();
    println!(
        "{} particles at t = {:.3}, faulted: {}",
        state.particle_count(),
        state.current_time(),
        state.is_faulted()
    );
}
