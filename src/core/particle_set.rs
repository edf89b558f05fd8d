//! Contiguous particle storage
//!
//! Particles live in one arena and are addressed by index, which keeps the
//! parallel passes cache-friendly and avoids per-particle allocation.

use crate::core::particle::Particle;
use crate::math::{Real, Vector, zero_vector};

#[derive(Clone, Default)]
pub struct ParticleSet {
    particles: Vec<Particle>,
}

impl ParticleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Particle> {
        self.particles.iter_mut()
    }

    pub fn push(&mut self, particle: Particle) -> usize {
        let index = self.particles.len();
        self.particles.push(particle);
        index
    }

    pub fn insert_batch(&mut self, mut batch: Vec<Particle>) {
        self.particles.append(&mut batch);
    }

    pub fn get(&self, index: usize) -> Option<&Particle> {
        self.particles.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Particle> {
        self.particles.get_mut(index)
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn total_mass(&self) -> Real {
        self.particles.iter().map(|p| p.mass).sum()
    }

    pub fn total_momentum(&self) -> Vector {
        self.particles
            .iter()
            .fold(zero_vector(), |acc, p| acc + p.momentum())
    }

    /// Drop particles flagged by a numerical fault. Returns how many were
    /// removed; surrounding tooling calls this before retrying a faulted
    /// run with adjusted parameters.
    pub fn remove_failed(&mut self) -> usize {
        let before = self.particles.len();
        self.particles.retain(|particle| !particle.failed);
        before - self.particles.len()
    }
}
