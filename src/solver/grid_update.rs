//! Grid-stage boundary conditions
//!
//! Applies level-set collisions to grid velocities: a sticky or Coulomb
//! friction response in the near-surface band, and full velocity removal
//! inside the solid. Everything happens in the boundary's reference frame.

use crate::config::constants::{BOUNDARY_INFLUENCE_BAND, TANGENT_EPS};
use crate::core::grid::Grid;
use crate::geometry::LevelSet;
use crate::math::{Real, zero_vector};

pub fn apply_boundary_conditions(grid: &mut Grid, level_set: &dyn LevelSet, time: Real) {
    for index in 0..grid.node_count() {
        let position = grid.coord_of(index).as_vec3();
        let phi = level_set.sample(position, time);
        if phi > BOUNDARY_INFLUENCE_BAND {
            continue;
        }
        let normal = level_set.spatial_gradient(position, time);
        let boundary_velocity = level_set.temporal_derivative(position, time) * normal;

        let node = grid.node_mut(index);
        let mut v = node.velocity - boundary_velocity;
        if phi > 0.0 {
            let pressure = (-v.dot(normal)).max(0.0);
            let mu = level_set.friction();
            if mu < 0.0 {
                // Sticky surface: no relative motion survives.
                v = zero_vector();
            } else {
                let mut tangent = v - normal * v.dot(normal);
                if tangent.length() > TANGENT_EPS {
                    tangent = tangent.normalize();
                }
                let friction = -(tangent.dot(v)).clamp(-mu * pressure, mu * pressure);
                v = v + normal * pressure + tangent * friction;
            }
        } else {
            v = zero_vector();
        }
        node.velocity = v + boundary_velocity;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::UVec3;
    use crate::geometry::HalfSpace;
    use crate::math::Vector;

    fn filled_grid(velocity: Vector) -> Grid {
        let mut grid = Grid::new(UVec3::splat(8));
        for index in 0..grid.node_count() {
            let node = grid.node_mut(index);
            node.mass = 1.0;
            node.velocity = velocity;
        }
        grid
    }

    fn node_at(grid: &mut Grid, x: i32, y: i32, z: i32) -> Vector {
        let index = grid.linear_index(bevy::math::IVec3::new(x, y, z));
        grid.node_mut(index).velocity
    }

    #[test]
    fn sticky_band_zeroes_relative_velocity() {
        let floor = HalfSpace::new(Vector::new(0.0, 1.5, 0.0), Vector::Y, -1.0);
        let mut grid = filled_grid(Vector::new(0.0, -1.0, 0.0));
        apply_boundary_conditions(&mut grid, &floor, 0.0);
        // y = 2 sits at phi = 0.5, inside the band: exactly zero.
        assert_eq!(node_at(&mut grid, 4, 2, 4), zero_vector());
        // y = 1 is inside the solid: also zero.
        assert_eq!(node_at(&mut grid, 4, 1, 4), zero_vector());
        // y = 4 is beyond the influence band: untouched.
        assert_eq!(node_at(&mut grid, 4, 4, 4), Vector::new(0.0, -1.0, 0.0));
    }

    #[test]
    fn friction_clamps_tangential_slide() {
        let floor = HalfSpace::new(Vector::new(0.0, 1.5, 0.0), Vector::Y, 0.5);
        let mut grid = filled_grid(Vector::new(2.0, -1.0, 0.0));
        apply_boundary_conditions(&mut grid, &floor, 0.0);
        let v = node_at(&mut grid, 4, 2, 4);
        // Normal approach removed, tangential speed reduced by mu * pressure.
        assert!((v.y - 0.0).abs() < 1e-5);
        assert!((v.x - 1.5).abs() < 1e-5);
    }

    #[test]
    fn boundary_application_is_idempotent() {
        let floor = HalfSpace::new(Vector::new(0.0, 1.5, 0.0), Vector::Y, 0.5);
        // Pure tangential slide already satisfies the constraint.
        let mut grid = filled_grid(Vector::new(1.0, 0.0, 0.5));
        apply_boundary_conditions(&mut grid, &floor, 0.0);
        let first = node_at(&mut grid, 4, 2, 4);
        assert!((first - Vector::new(1.0, 0.0, 0.5)).length() < 1e-6);
        apply_boundary_conditions(&mut grid, &floor, 0.0);
        assert!((node_at(&mut grid, 4, 2, 4) - first).length() < 1e-6);
    }

    #[test]
    fn moving_boundary_preserves_surface_velocity() {
        let piston = HalfSpace::new(Vector::new(0.0, 1.5, 0.0), Vector::Y, -1.0).with_speed(0.5);
        let mut grid = filled_grid(zero_vector());
        apply_boundary_conditions(&mut grid, &piston, 0.0);
        // Sticky nodes in the band take on the boundary's own velocity.
        let v = node_at(&mut grid, 4, 2, 4);
        assert!((v - Vector::new(0.0, 0.5, 0.0)).length() < 1e-6);
    }
}
