//! Partition functions.
//!
//! For species `(i, j)` with levels `k`:
//!
//! ```text
//! Z_ij = sum_k g_k * exp(-E_k / (k_B T))
//! ```
//!
//! Metastable levels contribute fully. Non-metastable levels are summed per
//! species and the sum is scaled by the dilution factor `w` of each cell.
//! Species listed in the NLTE override set are instead taken from the iterated
//! level populations once the initializing pass is over.

use std::collections::BTreeMap;
use std::sync::Arc;

use plasma::{
    Calculation, Inputs, LabeledTable, LevelKey, LevelsTable, PartitionFunctionOutput,
    PlasmaError, PropertyName, PropertyValue, SpeciesKey,
};
use tracing::debug;

use crate::names;

/// Per-species partition functions, with NLTE overrides.
#[derive(Debug, Clone, Copy, Default)]
pub struct PartitionFunction;

impl Calculation for PartitionFunction {
    fn name(&self) -> &'static str {
        names::PARTITION_FUNCTION
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[
            names::LEVELS,
            names::LEVEL_BOLTZMANN_FACTOR,
            names::W,
            names::NLTE,
            names::LEVEL_POPULATIONS,
        ]
    }

    fn type_str(&self) -> &'static str {
        "per-level table and per-species table"
    }

    fn latex_str(&self) -> Option<&'static str> {
        Some(r"$Z_{i,j} = \sum_{k=0}^{max(k)_{i,j}} g_k \times e^{-E_k / (k_\textrm{b} T)}$")
    }

    fn calculate(&mut self, inputs: &Inputs<'_>) -> Result<PropertyValue, PlasmaError> {
        let property = inputs.property();
        let levels = inputs.levels(0)?;
        let factors = inputs.level_table(1)?;
        let w = inputs.cell_values(2)?;
        let nlte = inputs.nlte(3)?;

        if factors.index() != levels.index() {
            return Err(PlasmaError::IndexMismatch {
                property: property.clone(),
                input: names::LEVEL_BOLTZMANN_FACTOR.to_string(),
            });
        }
        let n_cells = factors.n_columns();
        if w.len() != n_cells {
            return Err(PlasmaError::ShapeMismatch {
                property: property.clone(),
                message: format!("w has {} cells, level factors have {n_cells}", w.len()),
            });
        }

        let mut partition = sum_by_species(levels, factors, |metastable| metastable);
        for (species, mut sums) in sum_by_species(levels, factors, |metastable| !metastable) {
            let base = partition
                .entry(species)
                .or_insert_with(|| vec![0.0; n_cells]);
            for ((total, sum), dilution) in base.iter_mut().zip(sums.iter_mut()).zip(w) {
                *sum *= dilution;
                *total += *sum;
            }
        }

        if nlte.overrides_active() {
            let populations = inputs.level_table(4)?;
            if populations.n_columns() != n_cells {
                return Err(PlasmaError::ShapeMismatch {
                    property: property.clone(),
                    message: format!(
                        "level populations have {} cells, level factors have {n_cells}",
                        populations.n_columns()
                    ),
                });
            }
            for &species in &nlte.species {
                let overridden = nlte_partition_function(property, levels, populations, species)?;
                debug!(%species, "Partition function taken from level populations");
                partition.insert(species, overridden);
            }
        }

        let index: Vec<SpeciesKey> = partition.keys().copied().collect();
        let partition_functions = LabeledTable::from_rows(
            index,
            n_cells,
            partition.into_values().collect(),
        )?;

        Ok(PartitionFunctionOutput {
            level_population_proportionalities: Arc::clone(factors),
            partition_functions,
        }
        .into())
    }
}

/// Sums the rows of `factors` whose level passes `select(metastable)`,
/// grouped by species, in species-key order.
fn sum_by_species(
    levels: &LevelsTable,
    factors: &LabeledTable<LevelKey>,
    select: impl Fn(bool) -> bool,
) -> BTreeMap<SpeciesKey, Vec<f64>> {
    let mut sums: BTreeMap<SpeciesKey, Vec<f64>> = BTreeMap::new();
    for (record, (key, row)) in levels.records().iter().zip(factors.rows()) {
        if !select(record.metastable) {
            continue;
        }
        let total = sums
            .entry(key.species())
            .or_insert_with(|| vec![0.0; factors.n_columns()]);
        for (t, value) in total.iter_mut().zip(row) {
            *t += value;
        }
    }
    sums
}

/// `g_0 * sum_k (n_k / n_0)` per cell, where `0` is the species' first level.
fn nlte_partition_function(
    property: &PropertyName,
    levels: &LevelsTable,
    populations: &LabeledTable<LevelKey>,
    species: SpeciesKey,
) -> Result<Vec<f64>, PlasmaError> {
    let unknown = || PlasmaError::UnknownSpecies {
        property: property.clone(),
        species,
    };
    let first = levels.first_level_of(species).ok_or_else(unknown)?;
    let reference = populations.row_by_key(&first.level).ok_or_else(unknown)?;
    if let Some(cell) = reference.iter().position(|n| *n == 0.0 || !n.is_finite()) {
        return Err(PlasmaError::InvalidInput {
            property: property.clone(),
            message: format!(
                "population of reference level {} in cell {cell} is {}",
                first.level, reference[cell]
            ),
        });
    }

    let mut ratios = vec![0.0; reference.len()];
    for (_, row) in populations
        .rows()
        .filter(|(key, _)| key.species() == species)
    {
        for ((ratio, n), n_0) in ratios.iter_mut().zip(row).zip(reference) {
            *ratio += n / n_0;
        }
    }
    Ok(ratios.into_iter().map(|r| first.g * r).collect())
}

#[cfg(test)]
mod tests {
    use plasma::{LevelRecord, NlteConfig};

    use super::*;

    const TOLERANCE: f64 = 1e-4;

    fn level(z: u32, ion: u32, l: u32, g: f64, energy: f64, metastable: bool) -> LevelRecord {
        LevelRecord {
            level: LevelKey::new(z, ion, l),
            energy,
            g,
            metastable,
        }
    }

    /// Runs the calculation with `level_boltzmann_factor` computed from
    /// `levels` and `beta_rad`.
    fn run(
        levels: Vec<LevelRecord>,
        beta_rad: &[f64],
        w: Vec<f64>,
        nlte: NlteConfig,
        populations: LabeledTable<LevelKey>,
    ) -> Result<PartitionFunctionOutput, PlasmaError> {
        let levels = LevelsTable::new(levels).unwrap();
        let factors = crate::boltzmann::boltzmann_factors(&levels, beta_rad);
        let name = PropertyName::new(names::PARTITION_FUNCTION).unwrap();
        let mut calculation = PartitionFunction;
        let input_names = calculation.inputs();
        let inputs = Inputs::new(
            &name,
            input_names,
            vec![
                levels.into(),
                factors.into(),
                w.into(),
                nlte.into(),
                populations.into(),
            ],
        );
        let value = calculation.calculate(&inputs)?;
        Ok(value.as_partition_function().unwrap().as_ref().clone())
    }

    fn no_populations(n_cells: usize) -> LabeledTable<LevelKey> {
        LabeledTable::from_fn(Vec::new(), n_cells, |_, _| 0.0)
    }

    fn two_level_helium() -> Vec<LevelRecord> {
        vec![
            level(2, 0, 0, 1.0, 0.0, false),
            level(2, 0, 1, 2.0, 1.0, false),
        ]
    }

    fn species_value(output: &PartitionFunctionOutput, species: SpeciesKey, cell: usize) -> f64 {
        output
            .partition_functions
            .row_by_key(&species)
            .unwrap()[cell]
    }

    #[test]
    fn test_non_metastable_sum_is_diluted() {
        let output = run(
            two_level_helium(),
            &[1.0],
            vec![0.5],
            NlteConfig::default(),
            no_populations(1),
        )
        .unwrap();

        let proportionalities = &output.level_population_proportionalities;
        assert!((proportionalities.row(0)[0] - 1.0).abs() < TOLERANCE);
        assert!((proportionalities.row(1)[0] - 0.7358).abs() < TOLERANCE);
        assert!((species_value(&output, SpeciesKey::new(2, 0), 0) - 0.8679).abs() < TOLERANCE);
    }

    #[test]
    fn test_metastable_levels_are_not_diluted() {
        let output = run(
            vec![
                level(2, 0, 0, 1.0, 0.0, true),
                level(2, 0, 1, 2.0, 1.0, false),
            ],
            &[1.0, 1.0],
            vec![0.5, 1.0],
            NlteConfig::default(),
            no_populations(2),
        )
        .unwrap();

        let expected_diluted = 1.0 + 0.5 * 2.0 * (-1.0f64).exp();
        let expected_undiluted = 1.0 + 2.0 * (-1.0f64).exp();
        let species = SpeciesKey::new(2, 0);
        assert!((species_value(&output, species, 0) - expected_diluted).abs() < 1e-12);
        assert!((species_value(&output, species, 1) - expected_undiluted).abs() < 1e-12);
    }

    #[test]
    fn test_species_from_either_partition_are_kept() {
        let output = run(
            vec![
                level(1, 0, 0, 2.0, 0.0, true),
                level(2, 0, 0, 1.0, 0.0, false),
            ],
            &[1.0],
            vec![0.25],
            NlteConfig::default(),
            no_populations(1),
        )
        .unwrap();

        let table = &output.partition_functions;
        assert_eq!(table.index(), &[SpeciesKey::new(1, 0), SpeciesKey::new(2, 0)]);
        assert_eq!(species_value(&output, SpeciesKey::new(1, 0), 0), 2.0);
        assert_eq!(species_value(&output, SpeciesKey::new(2, 0), 0), 0.25);
    }

    #[test]
    fn test_nlte_override_replaces_boltzmann_value() {
        let species = SpeciesKey::new(2, 0);
        let populations = LabeledTable::from_rows(
            vec![LevelKey::new(2, 0, 0), LevelKey::new(2, 0, 1)],
            1,
            vec![vec![0.6], vec![0.3]],
        )
        .unwrap();

        let output = run(
            two_level_helium(),
            &[1.0],
            vec![0.5],
            NlteConfig::new(vec![species]).with_initializing(false),
            populations,
        )
        .unwrap();

        // g_0 * (0.6 / 0.6 + 0.3 / 0.6)
        assert!((species_value(&output, species, 0) - 1.5).abs() < 1e-12);
    }

    #[test]
    fn test_nlte_override_skipped_while_initializing() {
        let output = run(
            two_level_helium(),
            &[1.0],
            vec![0.5],
            NlteConfig::new(vec![SpeciesKey::new(2, 0)]),
            no_populations(1),
        )
        .unwrap();

        assert!((species_value(&output, SpeciesKey::new(2, 0), 0) - 0.8679).abs() < TOLERANCE);
    }

    #[test]
    fn test_nlte_override_of_unknown_species_fails() {
        let err = run(
            two_level_helium(),
            &[1.0],
            vec![0.5],
            NlteConfig::new(vec![SpeciesKey::new(26, 1)]).with_initializing(false),
            no_populations(1),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            PlasmaError::UnknownSpecies { species, .. } if species == SpeciesKey::new(26, 1)
        ));
    }

    #[test]
    fn test_zero_reference_population_fails() {
        let populations = LabeledTable::from_rows(
            vec![LevelKey::new(2, 0, 0), LevelKey::new(2, 0, 1)],
            1,
            vec![vec![0.0], vec![0.3]],
        )
        .unwrap();
        let err = run(
            two_level_helium(),
            &[1.0],
            vec![0.5],
            NlteConfig::new(vec![SpeciesKey::new(2, 0)]).with_initializing(false),
            populations,
        )
        .unwrap_err();

        assert!(matches!(err, PlasmaError::InvalidInput { .. }));
    }

    #[test]
    fn test_dilution_length_must_match_cells() {
        let err = run(
            two_level_helium(),
            &[1.0, 2.0],
            vec![0.5],
            NlteConfig::default(),
            no_populations(2),
        )
        .unwrap_err();

        assert!(matches!(err, PlasmaError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_factor_index_must_match_levels() {
        let levels = LevelsTable::new(two_level_helium()).unwrap();
        let other = LevelsTable::new(vec![level(2, 0, 0, 1.0, 0.0, false)]).unwrap();
        let factors = crate::boltzmann::boltzmann_factors(&other, &[1.0]);
        let name = PropertyName::new(names::PARTITION_FUNCTION).unwrap();
        let mut calculation = PartitionFunction;
        let inputs = Inputs::new(
            &name,
            calculation.inputs(),
            vec![
                levels.into(),
                factors.into(),
                vec![1.0].into(),
                NlteConfig::default().into(),
                no_populations(1).into(),
            ],
        );

        let err = calculation.calculate(&inputs).unwrap_err();
        assert!(matches!(err, PlasmaError::IndexMismatch { .. }));
    }
}
