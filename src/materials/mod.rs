//! Materials for MPM simulation
//!
//! Two constitutive variants behind one flat dispatch enum:
//!
//! * `elastoplastic` - snow-like solids with stretch clamping
//! * `granular` - sand-like solids with a Drucker-Prager yield cone

pub mod elastoplastic;
pub mod granular;
pub mod utils;

pub use elastoplastic::Elastoplastic;
pub use granular::DruckerPrager;

use crate::config::materials::{MaterialConfig, MaterialKind};
use crate::error::SimulationFault;
use crate::math::{Matrix, Real};

/// Per-particle constitutive model and its evolving state.
#[derive(Clone, Copy, Debug)]
pub enum MaterialModel {
    Elastoplastic(Elastoplastic),
    DruckerPrager(DruckerPrager),
}

impl MaterialModel {
    /// Factory selecting the variant from the config's material kind.
    pub fn from_config(config: &MaterialConfig) -> Self {
        match config.kind {
            MaterialKind::Elastoplastic => {
                Self::Elastoplastic(Elastoplastic::new(config.elastoplastic))
            }
            MaterialKind::DruckerPrager => {
                Self::DruckerPrager(DruckerPrager::new(config.drucker_prager))
            }
        }
    }

    pub fn material_name(&self) -> &'static str {
        match self {
            Self::Elastoplastic(_) => "ep",
            Self::DruckerPrager(_) => "dp",
        }
    }

    /// Stress-like quantity scattered to the grid during force application.
    pub fn calculate_force(
        &self,
        dg_e: &Matrix,
        dg_p: &Matrix,
        volume: Real,
    ) -> Result<Matrix, SimulationFault> {
        match self {
            Self::Elastoplastic(material) => material.calculate_force(dg_e, dg_p, volume),
            Self::DruckerPrager(material) => material.calculate_force(dg_e, volume),
        }
    }

    /// Split the cached total deformation back into admissible elastic and
    /// plastic parts.
    pub fn plasticity(
        &mut self,
        dg_e: &mut Matrix,
        dg_p: &mut Matrix,
        dg_cache: &Matrix,
    ) -> Result<(), SimulationFault> {
        match self {
            Self::Elastoplastic(material) => material.plasticity(dg_e, dg_p, dg_cache),
            Self::DruckerPrager(material) => material.plasticity(dg_e, dg_p),
        }
    }
}
