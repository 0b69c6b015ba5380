//! Radiation-field properties.

use plasma::{Calculation, Inputs, PhysicalConstants, PlasmaError, PropertyValue};

use crate::names;

/// `beta_rad = 1 / (k_B * t_rad)`, per cell.
///
/// The Boltzmann constant is snapshotted at construction; `calculate` has no
/// external lookups. Recomputed on every update since `t_rad` changes between
/// solver passes.
#[derive(Debug, Clone)]
pub struct BetaRadiation {
    k_b: f64,
}

impl BetaRadiation {
    /// Creates the property with the Boltzmann constant of `constants`.
    pub fn new(constants: &PhysicalConstants) -> Self {
        Self {
            k_b: constants.boltzmann_cgs,
        }
    }
}

impl Calculation for BetaRadiation {
    fn name(&self) -> &'static str {
        names::BETA_RAD
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[names::T_RAD]
    }

    fn type_str(&self) -> &'static str {
        "per-cell values"
    }

    fn latex_str(&self) -> Option<&'static str> {
        Some(r"$\frac{1}{K_B T_\textrm{rad}}$")
    }

    fn calculate(&mut self, inputs: &Inputs<'_>) -> Result<PropertyValue, PlasmaError> {
        let t_rad = inputs.cell_values(0)?;
        if let Some((cell, t)) = t_rad
            .iter()
            .enumerate()
            .find(|(_, t)| !(t.is_finite() && **t > 0.0))
        {
            return Err(PlasmaError::InvalidInput {
                property: inputs.property().clone(),
                message: format!("t_rad[{cell}] = {t} is not a positive temperature"),
            });
        }
        let beta_rad: Vec<f64> = t_rad.iter().map(|t| 1.0 / (self.k_b * t)).collect();
        Ok(beta_rad.into())
    }
}
