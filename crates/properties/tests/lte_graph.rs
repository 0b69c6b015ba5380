//! End-to-end passes over the standard property graph.

use std::sync::Arc;

use plasma::{
    AtomicDataSource, LabeledTable, LevelKey, LevelRecord, LevelsTable, LinesTable, NlteConfig,
    PhysicalConstants, PlasmaError, PropertyName, PropertyValue, SpeciesKey,
};
use properties::{names, BasePlasma};

/// In-memory atomic data with optional datasets.
#[derive(Debug)]
struct Fixture {
    levels: Option<Arc<LevelsTable>>,
    lines: Option<Arc<LinesTable>>,
}

impl AtomicDataSource for Fixture {
    fn has(&self, name: &str) -> bool {
        match name {
            "levels" => self.levels.is_some(),
            "lines" => self.lines.is_some(),
            _ => false,
        }
    }

    fn get(&self, name: &str) -> Option<PropertyValue> {
        match name {
            "levels" => self.levels.clone().map(PropertyValue::Levels),
            "lines" => self.lines.clone().map(PropertyValue::Lines),
            _ => None,
        }
    }
}

fn helium_levels() -> LevelsTable {
    LevelsTable::new(vec![
        LevelRecord {
            level: LevelKey::new(2, 0, 0),
            energy: 0.0,
            g: 1.0,
            metastable: false,
        },
        LevelRecord {
            level: LevelKey::new(2, 0, 1),
            energy: 1.0,
            g: 2.0,
            metastable: false,
        },
    ])
    .unwrap()
}

fn complete_source() -> Arc<dyn AtomicDataSource> {
    Arc::new(Fixture {
        levels: Some(Arc::new(helium_levels())),
        lines: Some(Arc::new(LinesTable::default())),
    })
}

/// `k_B = 1` so that `beta_rad = 1 / t_rad` exactly.
fn unit_constants() -> PhysicalConstants {
    PhysicalConstants::cgs().with_boltzmann(1.0)
}

fn partition_value(plasma: &BasePlasma, species: SpeciesKey) -> Vec<f64> {
    let value = plasma.get(names::PARTITION_FUNCTION).unwrap();
    let output = value.as_partition_function().unwrap();
    output
        .partition_functions
        .row_by_key(&species)
        .unwrap()
        .to_vec()
}

#[test]
fn test_lte_pass_produces_diluted_partition_function() {
    let mut plasma = BasePlasma::lte(
        complete_source(),
        vec![1.0],
        vec![0.5],
        NlteConfig::default(),
        &unit_constants(),
    )
    .unwrap();

    plasma.update().unwrap();

    let z = partition_value(&plasma, SpeciesKey::new(2, 0));
    assert!((z[0] - 0.8679).abs() < 1e-4);
}

#[test]
fn test_level_table_is_shared_with_partition_function_output() {
    let mut plasma = BasePlasma::lte(
        complete_source(),
        vec![1.0, 2.0],
        vec![0.5, 0.5],
        NlteConfig::default(),
        &unit_constants(),
    )
    .unwrap();
    plasma.update().unwrap();

    let factors = plasma.get(names::LEVEL_BOLTZMANN_FACTOR).unwrap();
    let partition = plasma.get(names::PARTITION_FUNCTION).unwrap();
    let factors = factors.as_level_table().unwrap();
    let output = partition.as_partition_function().unwrap();

    assert!(Arc::ptr_eq(factors, &output.level_population_proportionalities));
    assert_eq!(factors.index(), helium_levels().index());
    assert_eq!(factors.n_columns(), 2);
}

#[test]
fn test_second_pass_reflects_new_temperature() {
    let mut plasma = BasePlasma::lte(
        complete_source(),
        vec![1.0],
        vec![1.0],
        NlteConfig::default(),
        &unit_constants(),
    )
    .unwrap();
    plasma.update().unwrap();
    let levels_after_first = plasma.get(names::LEVELS).unwrap();
    let first = partition_value(&plasma, SpeciesKey::new(2, 0));

    plasma.set_input(names::T_RAD, vec![2.0]).unwrap();
    plasma.update().unwrap();
    let second = partition_value(&plasma, SpeciesKey::new(2, 0));

    assert_eq!(
        plasma.get(names::BETA_RAD).unwrap().as_cell_values(),
        Some(&[0.5][..])
    );
    assert!((second[0] - (1.0 + 2.0 * (-0.5f64).exp())).abs() < 1e-12);
    assert_ne!(first, second);
    assert!(levels_after_first.ptr_eq(&plasma.get(names::LEVELS).unwrap()));
}

#[test]
fn test_nlte_pass_overrides_after_initialization() {
    let species = SpeciesKey::new(2, 0);
    let nlte = NlteConfig::new(vec![species]);
    let mut plasma = BasePlasma::lte(
        complete_source(),
        vec![1.0],
        vec![0.5],
        nlte.clone(),
        &unit_constants(),
    )
    .unwrap();

    plasma.update().unwrap();
    let initial = partition_value(&plasma, species);
    assert!((initial[0] - 0.8679).abs() < 1e-4);

    let populations = LabeledTable::from_rows(
        vec![LevelKey::new(2, 0, 0), LevelKey::new(2, 0, 1)],
        1,
        vec![vec![0.8], vec![0.2]],
    )
    .unwrap();
    plasma
        .set_input(names::LEVEL_POPULATIONS, populations)
        .unwrap();
    plasma
        .set_input(names::NLTE, nlte.with_initializing(false))
        .unwrap();
    plasma.update().unwrap();

    let overridden = partition_value(&plasma, species);
    assert!((overridden[0] - 1.25).abs() < 1e-12);
}

#[test]
fn test_missing_lines_aborts_pass_after_levels() {
    let source: Arc<dyn AtomicDataSource> = Arc::new(Fixture {
        levels: Some(Arc::new(helium_levels())),
        lines: None,
    });
    let mut plasma = BasePlasma::lte(
        source,
        vec![1.0],
        vec![1.0],
        NlteConfig::default(),
        &unit_constants(),
    )
    .unwrap();

    let err = plasma.update().unwrap_err();

    assert_eq!(
        err,
        PlasmaError::IncompleteAtomicData {
            name: PropertyName::new("lines").unwrap(),
        }
    );
    assert!(err.is_configuration_error());
    assert!(plasma.get(names::LEVELS).is_some());
    assert!(plasma.get(names::BETA_RAD).is_none());
    assert!(plasma.property(names::LINES).unwrap().value().is_none());
}

#[test]
fn test_labels_in_update_order() {
    let plasma = BasePlasma::lte(
        complete_source(),
        vec![1.0],
        vec![1.0],
        NlteConfig::default(),
        &unit_constants(),
    )
    .unwrap();

    let labels = plasma.labels();
    assert_eq!(labels.len(), 5);
    assert!(labels[0].starts_with("Name: levels\n"));
    assert!(labels[4].starts_with("Name: partition_function\n"));
    let names: Vec<_> = plasma
        .property_names()
        .into_iter()
        .map(|n| n.as_str())
        .collect();
    assert_eq!(
        names,
        [
            "levels",
            "lines",
            "beta_rad",
            "level_boltzmann_factor",
            "partition_function"
        ]
    );
}
