//! Level Boltzmann factors.

use plasma::{Calculation, Inputs, LabeledTable, LevelKey, LevelsTable, PlasmaError, PropertyValue};

use crate::names;

/// `g_k * exp(-E_k * beta_rad_c)` for every level `k` and cell `c`.
///
/// The result keeps the row index of `levels` and has one column per entry of
/// `beta_rad`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LevelBoltzmannFactor;

impl Calculation for LevelBoltzmannFactor {
    fn name(&self) -> &'static str {
        names::LEVEL_BOLTZMANN_FACTOR
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[names::LEVELS, names::BETA_RAD]
    }

    fn type_str(&self) -> &'static str {
        "per-level table"
    }

    fn latex_str(&self) -> Option<&'static str> {
        Some(r"$g_k e^{-E_k / (k_\textrm{B} T_\textrm{rad})}$")
    }

    fn calculate(&mut self, inputs: &Inputs<'_>) -> Result<PropertyValue, PlasmaError> {
        let levels = inputs.levels(0)?;
        let beta_rad = inputs.cell_values(1)?;
        Ok(boltzmann_factors(levels, beta_rad).into())
    }
}

/// Computes the per-level, per-cell Boltzmann factor table.
pub fn boltzmann_factors(levels: &LevelsTable, beta_rad: &[f64]) -> LabeledTable<LevelKey> {
    let records = levels.records();
    LabeledTable::from_fn(levels.index().to_vec(), beta_rad.len(), |row, column| {
        let level = &records[row];
        level.g * (-level.energy * beta_rad[column]).exp()
    })
}
