//! Atomic data: the dataset tables and the port through which they are read.
//!
//! [`AtomicDataSource`] is implemented by infrastructure crates (the JSON
//! loader in `atomic-data`, in-memory fixtures in tests). The memoized-source
//! properties are its only consumers; they read each dataset at most once.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{LevelKey, PlasmaError, PropertyValue, SpeciesKey};

// ---------------------------------------------------------------------------
// Port
// ---------------------------------------------------------------------------

/// A source of named atomic datasets.
///
/// For every dataset name the source exposes a capability flag (`has`) and,
/// when the flag is set, the dataset itself (`get`). Implementations must be
/// consistent: `get(name)` returns `Some` whenever `has(name)` is `true`.
pub trait AtomicDataSource: Send + Sync + std::fmt::Debug {
    /// Returns `true` if this source carries the dataset `name`.
    fn has(&self, name: &str) -> bool;

    /// Returns the dataset `name`, or `None` if the source does not carry it.
    fn get(&self, name: &str) -> Option<PropertyValue>;
}

// ---------------------------------------------------------------------------
// Levels
// ---------------------------------------------------------------------------

/// One energy level of one species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelRecord {
    /// `(atomic_number, ion_number, level_number)`.
    pub level: LevelKey,
    /// Level energy above the species ground state, in erg.
    pub energy: f64,
    /// Statistical weight.
    pub g: f64,
    /// Whether the level is metastable (not radiatively depopulated).
    #[serde(default)]
    pub metastable: bool,
}

/// The per-level atomic dataset, in the source's row order.
///
/// The level index is unique and every energy and weight is finite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<LevelRecord>", into = "Vec<LevelRecord>")]
pub struct LevelsTable {
    records: Vec<LevelRecord>,
    index: Vec<LevelKey>,
}

impl LevelsTable {
    /// Builds a levels table, rejecting duplicate keys and non-finite values.
    pub fn new(records: Vec<LevelRecord>) -> Result<Self, PlasmaError> {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.level) {
                return Err(PlasmaError::InvalidTable {
                    message: format!("duplicate level {}", record.level),
                });
            }
            if !record.energy.is_finite() || !record.g.is_finite() {
                return Err(PlasmaError::InvalidTable {
                    message: format!("level {} has a non-finite energy or weight", record.level),
                });
            }
        }
        let index = records.iter().map(|r| r.level).collect();
        Ok(Self { records, index })
    }

    /// Returns the level records in table order.
    pub fn records(&self) -> &[LevelRecord] {
        &self.records
    }

    /// Returns the row index (one key per level, in table order).
    pub fn index(&self) -> &[LevelKey] {
        &self.index
    }

    /// Returns the number of levels.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table holds no levels.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Returns the first level of `species` in table order, which is the
    /// reference level for NLTE population ratios.
    pub fn first_level_of(&self, species: SpeciesKey) -> Option<&LevelRecord> {
        self.records.iter().find(|r| r.level.species() == species)
    }
}

impl TryFrom<Vec<LevelRecord>> for LevelsTable {
    type Error = PlasmaError;

    fn try_from(records: Vec<LevelRecord>) -> Result<Self, Self::Error> {
        Self::new(records)
    }
}

impl From<LevelsTable> for Vec<LevelRecord> {
    fn from(table: LevelsTable) -> Self {
        table.records
    }
}

// ---------------------------------------------------------------------------
// Lines
// ---------------------------------------------------------------------------

/// One bound-bound transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineRecord {
    /// Identifier assigned by the atomic database.
    pub line_id: u64,
    /// Nuclear charge Z.
    pub atomic_number: u32,
    /// Ionization stage.
    pub ion_number: u32,
    /// Level number of the lower level.
    pub level_number_lower: u32,
    /// Level number of the upper level.
    pub level_number_upper: u32,
    /// Rest wavelength in Angstrom.
    pub wavelength: f64,
    /// Absorption oscillator strength.
    pub f_lu: f64,
    /// Emission oscillator strength.
    pub f_ul: f64,
}

/// The per-transition atomic dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinesTable {
    records: Vec<LineRecord>,
}

impl LinesTable {
    /// Wraps a list of transitions.
    pub fn new(records: Vec<LineRecord>) -> Self {
        Self { records }
    }

    /// Returns the transitions in table order.
    pub fn records(&self) -> &[LineRecord] {
        &self.records
    }

    /// Returns the number of transitions.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns `true` if the table holds no transitions.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn level(l: u32, energy: f64) -> LevelRecord {
        LevelRecord {
            level: LevelKey::new(2, 0, l),
            energy,
            g: 1.0,
            metastable: false,
        }
    }

    #[test]
    fn test_levels_table_rejects_duplicate_levels() {
        let err = LevelsTable::new(vec![level(0, 0.0), level(0, 1.0)]).unwrap_err();
        assert!(err.to_string().contains("duplicate level (2, 0, 0)"));
    }

    #[test]
    fn test_levels_table_rejects_non_finite_energy() {
        assert!(LevelsTable::new(vec![level(0, f64::NAN)]).is_err());
    }

    #[test]
    fn test_first_level_of_follows_table_order() {
        let table = LevelsTable::new(vec![level(3, 2.0), level(0, 0.0)]).unwrap();
        let first = table.first_level_of(SpeciesKey::new(2, 0)).unwrap();
        assert_eq!(first.level.level_number, 3);
        assert!(table.first_level_of(SpeciesKey::new(1, 0)).is_none());
    }
}
