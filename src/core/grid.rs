//! Background grid for MPM simulation
//!
//! A dense mass/velocity field rebuilt every substep. Each node sits behind
//! its own mutex so the scatter stages (rasterize, force accumulation) can
//! run particle-parallel without losing updates; the sequential grid stages
//! go through `get_mut` and never pay for locking.

use std::sync::Mutex;

use bevy::math::{IVec3, UVec3};

use crate::math::{Real, Vector, zero_vector};

#[derive(Clone, Copy, Debug)]
pub struct GridNode {
    /// During accumulation `velocity` holds momentum; after
    /// [`Grid::normalize_velocities`] it holds velocity.
    pub velocity: Vector,
    pub mass: Real,
}

impl GridNode {
    #[inline(always)]
    pub fn zeroed() -> Self {
        Self {
            velocity: zero_vector(),
            mass: 0.0,
        }
    }

    #[inline(always)]
    pub fn zero(&mut self) {
        self.velocity = zero_vector();
        self.mass = 0.0;
    }
}

pub struct Grid {
    resolution: UVec3,
    nodes: Vec<Mutex<GridNode>>,
    velocity_backup: Vec<Vector>,
}

impl Grid {
    pub fn new(resolution: UVec3) -> Self {
        let count = (resolution.x * resolution.y * resolution.z) as usize;
        Self {
            resolution,
            nodes: (0..count).map(|_| Mutex::new(GridNode::zeroed())).collect(),
            velocity_backup: vec![zero_vector(); count],
        }
    }

    #[inline(always)]
    pub fn resolution(&self) -> UVec3 {
        self.resolution
    }

    #[inline(always)]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline(always)]
    pub fn contains(&self, coord: IVec3) -> bool {
        coord.x >= 0
            && coord.x < self.resolution.x as i32
            && coord.y >= 0
            && coord.y < self.resolution.y as i32
            && coord.z >= 0
            && coord.z < self.resolution.z as i32
    }

    /// Linear index with x fastest; callers pass in-bounds coordinates.
    #[inline(always)]
    pub fn linear_index(&self, coord: IVec3) -> usize {
        let res = self.resolution;
        (coord.x as usize)
            + (res.x as usize) * ((coord.y as usize) + (res.y as usize) * (coord.z as usize))
    }

    #[inline(always)]
    pub fn coord_of(&self, index: usize) -> IVec3 {
        let res = self.resolution;
        let x = index % res.x as usize;
        let y = (index / res.x as usize) % res.y as usize;
        let z = index / (res.x as usize * res.y as usize);
        IVec3::new(x as i32, y as i32, z as i32)
    }

    /// Shared node handle for the lock-guarded scatter stages.
    #[inline(always)]
    pub fn node(&self, index: usize) -> &Mutex<GridNode> {
        &self.nodes[index]
    }

    /// Exclusive node access for the sequential grid stages.
    #[inline(always)]
    pub fn node_mut(&mut self, index: usize) -> &mut GridNode {
        self.nodes[index].get_mut().unwrap()
    }

    /// Zero every node ahead of rasterization.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.get_mut().unwrap().zero();
        }
    }

    /// Momentum -> velocity divide. Zero-mass nodes carry no momentum and
    /// are left untouched.
    pub fn normalize_velocities(&mut self) {
        for node in &mut self.nodes {
            let node = node.get_mut().unwrap();
            if node.mass > 0.0 {
                node.velocity *= 1.0 / node.mass;
            }
        }
    }

    /// Snapshot node velocities for the FLIP blend in resampling.
    pub fn backup_velocity(&mut self) {
        for (backup, node) in self.velocity_backup.iter_mut().zip(&mut self.nodes) {
            *backup = node.get_mut().unwrap().velocity;
        }
    }

    #[inline(always)]
    pub fn velocity_backup(&self, index: usize) -> Vector {
        self.velocity_backup[index]
    }

    /// Apply an acceleration impulse to every node carrying mass.
    pub fn apply_external_force(&mut self, acceleration: Vector, delta_t: Real) {
        let impulse = acceleration * delta_t;
        for node in &mut self.nodes {
            let node = node.get_mut().unwrap();
            if node.mass > 0.0 {
                node.velocity += impulse;
            }
        }
    }

    pub fn total_mass(&mut self) -> Real {
        self.nodes
            .iter_mut()
            .map(|node| node.get_mut().unwrap().mass)
            .sum()
    }

    /// Total momentum; only meaningful after [`Grid::normalize_velocities`].
    pub fn total_momentum(&mut self) -> Vector {
        self.nodes
            .iter_mut()
            .map(|node| {
                let node = node.get_mut().unwrap();
                node.velocity * node.mass
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_index_roundtrip() {
        let grid = Grid::new(UVec3::new(4, 5, 6));
        for index in 0..grid.node_count() {
            let coord = grid.coord_of(index);
            assert!(grid.contains(coord));
            assert_eq!(grid.linear_index(coord), index);
        }
    }

    #[test]
    fn normalize_skips_empty_nodes() {
        let mut grid = Grid::new(UVec3::splat(2));
        {
            let node = grid.node_mut(0);
            node.mass = 2.0;
            node.velocity = Vector::new(4.0, 0.0, -2.0);
        }
        {
            let node = grid.node_mut(1);
            node.velocity = Vector::new(7.0, 7.0, 7.0); // stale momentum, no mass
        }
        grid.normalize_velocities();
        assert_eq!(grid.node_mut(0).velocity, Vector::new(2.0, 0.0, -1.0));
        assert_eq!(grid.node_mut(1).velocity, Vector::new(7.0, 7.0, 7.0));
        assert_eq!(grid.total_momentum(), Vector::new(4.0, 0.0, -2.0));
    }

    #[test]
    fn external_force_only_touches_massive_nodes() {
        let mut grid = Grid::new(UVec3::splat(2));
        grid.node_mut(3).mass = 1.0;
        grid.backup_velocity();
        grid.apply_external_force(Vector::new(0.0, -10.0, 0.0), 0.1);
        assert_eq!(grid.node_mut(3).velocity, Vector::new(0.0, -1.0, 0.0));
        assert_eq!(grid.node_mut(0).velocity, zero_vector());
        assert_eq!(grid.velocity_backup(3), zero_vector());
    }
}
