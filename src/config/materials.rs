//! Material configuration
//!
//! Named parameter sets with documented defaults, plus an ordered library
//! of presets so seeding walks groups in registration order.

use bevy::prelude::*;
use indexmap::IndexMap;

use crate::materials::utils::physics;
use crate::math::{Real, Vector, zero_vector};

/// Selects the constitutive variant a particle is built with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaterialKind {
    /// Snow-like elastoplastic solid.
    Elastoplastic,
    /// Sand-like granular solid with a Drucker-Prager yield cone.
    DruckerPrager,
}

impl MaterialKind {
    /// Config-string selector; anything other than `"dp"` means elastoplastic.
    pub fn from_name(name: &str) -> Self {
        if name == "dp" {
            Self::DruckerPrager
        } else {
            Self::Elastoplastic
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Elastoplastic => "ep",
            Self::DruckerPrager => "dp",
        }
    }
}

/// Elastoplastic parameters (fixed-corotated elasticity + hardening).
#[derive(Clone, Copy, Debug)]
pub struct ElastoplasticParams {
    pub hardening: Real,
    pub mu_0: Real,
    pub lambda_0: Real,
    /// Critical compression: elastic singular values clamp at `1 - theta_c`.
    pub theta_c: Real,
    /// Critical stretch: elastic singular values clamp at `1 + theta_s`.
    pub theta_s: Real,
}

impl Default for ElastoplasticParams {
    fn default() -> Self {
        Self {
            hardening: 10.0,
            mu_0: 1e5,
            lambda_0: 1e5,
            theta_c: 2.5e-2,
            theta_s: 7.5e-3,
        }
    }
}

impl ElastoplasticParams {
    /// Derive the Lamé moduli from Young's modulus and Poisson ratio.
    pub fn with_elasticity(mut self, young_modulus: Real, poisson_ratio: Real) -> Self {
        let (lambda, mu) = physics::lame_lambda_mu(young_modulus, poisson_ratio);
        self.lambda_0 = lambda;
        self.mu_0 = mu;
        self
    }
}

/// Drucker-Prager parameters; `h_0..h_3` shape the friction hardening
/// curve `phi(q) = h_0 + (h_1 q - h_3) exp(-h_2 q)` in degrees.
#[derive(Clone, Copy, Debug)]
pub struct DruckerPragerParams {
    pub h_0: Real,
    pub h_1: Real,
    pub h_2: Real,
    pub h_3: Real,
    pub lambda_0: Real,
    pub mu_0: Real,
    /// Initial cone opening.
    pub alpha: Real,
}

impl Default for DruckerPragerParams {
    fn default() -> Self {
        Self {
            h_0: 35.0,
            h_1: 9.0,
            h_2: 0.2,
            h_3: 10.0,
            lambda_0: 204057.0,
            mu_0: 136038.0,
            alpha: 1.0,
        }
    }
}

impl DruckerPragerParams {
    /// Derive the Lamé moduli from Young's modulus and Poisson ratio.
    pub fn with_elasticity(mut self, young_modulus: Real, poisson_ratio: Real) -> Self {
        let (lambda, mu) = physics::lame_lambda_mu(young_modulus, poisson_ratio);
        self.lambda_0 = lambda;
        self.mu_0 = mu;
        self
    }
}

/// Everything needed to seed one group of particles.
#[derive(Clone, Debug)]
pub struct MaterialConfig {
    pub kind: MaterialKind,
    pub elastoplastic: ElastoplasticParams,
    pub drucker_prager: DruckerPragerParams,
    /// Initial isotropic scale of the plastic deformation gradient.
    pub compression: Real,
    pub initial_velocity: Vector,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            kind: MaterialKind::Elastoplastic,
            elastoplastic: ElastoplasticParams::default(),
            drucker_prager: DruckerPragerParams::default(),
            compression: 1.0,
            initial_velocity: zero_vector(),
        }
    }
}

impl MaterialConfig {
    pub fn snow() -> Self {
        Self::default()
    }

    pub fn sand() -> Self {
        Self {
            kind: MaterialKind::DruckerPrager,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: MaterialKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_compression(mut self, compression: Real) -> Self {
        self.compression = compression;
        self
    }

    pub fn with_initial_velocity(mut self, velocity: Vector) -> Self {
        self.initial_velocity = velocity;
        self
    }
}

/// Ordered registry of named material presets. Iteration follows
/// registration order so multi-group scenes seed deterministically.
#[derive(Resource, Clone, Default)]
pub struct MaterialLibrary {
    materials: IndexMap<String, MaterialConfig>,
}

impl MaterialLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Library preloaded with the standard snow and sand presets.
    pub fn standard() -> Self {
        let mut library = Self::new();
        library.register("snow", MaterialConfig::snow());
        library.register("sand", MaterialConfig::sand());
        library
    }

    pub fn register(&mut self, name: impl Into<String>, config: MaterialConfig) {
        self.materials.insert(name.into(), config);
    }

    pub fn get(&self, name: &str) -> Option<&MaterialConfig> {
        self.materials.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &MaterialConfig)> {
        self.materials.iter().map(|(name, config)| (name.as_str(), config))
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }
}
