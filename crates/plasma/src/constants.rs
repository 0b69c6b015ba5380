//! Physical constants provider.
//!
//! Properties snapshot the constants they need at construction, so a test can
//! inject deterministic values and a changed provider never touches formulas.

use serde::{Deserialize, Serialize};

/// Boltzmann constant in CGS units (erg/K), CODATA 2018 exact value.
pub const BOLTZMANN_CGS: f64 = 1.380649e-16;

/// The physical constants available to property constructors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicalConstants {
    /// Boltzmann constant, erg/K.
    pub boltzmann_cgs: f64,
}

impl PhysicalConstants {
    /// Returns the CODATA 2018 constants in CGS units.
    pub fn cgs() -> Self {
        Self {
            boltzmann_cgs: BOLTZMANN_CGS,
        }
    }

    /// Returns a copy with the Boltzmann constant replaced.
    pub fn with_boltzmann(mut self, boltzmann_cgs: f64) -> Self {
        self.boltzmann_cgs = boltzmann_cgs;
        self
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::cgs()
    }
}
