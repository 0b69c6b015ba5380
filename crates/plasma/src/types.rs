//! Shared value types for the plasma property domain.
//!
//! Unlike the identifiers in [`crate::identifiers`], these types carry
//! numbers with invariants (a table's data length equals rows × columns, its
//! row index has no duplicates) and participate in property computations.

use std::collections::HashSet;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::PlasmaError;

// ---------------------------------------------------------------------------
// Index keys
// ---------------------------------------------------------------------------

/// Identifies an ion species: an element (`atomic_number`) in a given
/// ionization stage (`ion_number`, 0 = neutral).
///
/// Serialised as a two-element array `[atomic_number, ion_number]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32)", into = "(u32, u32)")]
pub struct SpeciesKey {
    /// Nuclear charge Z.
    pub atomic_number: u32,
    /// Ionization stage.
    pub ion_number: u32,
}

impl SpeciesKey {
    /// Creates a new [`SpeciesKey`].
    pub fn new(atomic_number: u32, ion_number: u32) -> Self {
        Self {
            atomic_number,
            ion_number,
        }
    }
}

impl From<(u32, u32)> for SpeciesKey {
    fn from((atomic_number, ion_number): (u32, u32)) -> Self {
        Self::new(atomic_number, ion_number)
    }
}

impl From<SpeciesKey> for (u32, u32) {
    fn from(key: SpeciesKey) -> Self {
        (key.atomic_number, key.ion_number)
    }
}

impl std::fmt::Display for SpeciesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.atomic_number, self.ion_number)
    }
}

// ---------------------------------------------------------------------------

/// Identifies one energy level of one species.
///
/// Serialised as a three-element array `[atomic_number, ion_number, level_number]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "(u32, u32, u32)", into = "(u32, u32, u32)")]
pub struct LevelKey {
    /// Nuclear charge Z.
    pub atomic_number: u32,
    /// Ionization stage.
    pub ion_number: u32,
    /// Level number within the species, 0 = ground state.
    pub level_number: u32,
}

impl LevelKey {
    /// Creates a new [`LevelKey`].
    pub fn new(atomic_number: u32, ion_number: u32, level_number: u32) -> Self {
        Self {
            atomic_number,
            ion_number,
            level_number,
        }
    }

    /// Returns the species this level belongs to.
    pub fn species(self) -> SpeciesKey {
        SpeciesKey::new(self.atomic_number, self.ion_number)
    }
}

impl From<(u32, u32, u32)> for LevelKey {
    fn from((atomic_number, ion_number, level_number): (u32, u32, u32)) -> Self {
        Self::new(atomic_number, ion_number, level_number)
    }
}

impl From<LevelKey> for (u32, u32, u32) {
    fn from(key: LevelKey) -> Self {
        (key.atomic_number, key.ion_number, key.level_number)
    }
}

impl std::fmt::Display for LevelKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.atomic_number, self.ion_number, self.level_number
        )
    }
}

// ---------------------------------------------------------------------------
// Labeled table
// ---------------------------------------------------------------------------

/// A dense `f64` table with a labeled row index and positional columns.
///
/// Rows are keyed by `K` (a [`LevelKey`] or [`SpeciesKey`]); columns are
/// simulation cells `0..n_columns`. Data is stored row-major.
///
/// ## Invariants
///
/// - `data.len() == index.len() * n_columns`
/// - the row index contains no duplicate keys
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledTable<K> {
    index: Vec<K>,
    n_columns: usize,
    data: Vec<f64>,
}

impl<K> LabeledTable<K>
where
    K: Clone + Eq + Hash + std::fmt::Display,
{
    /// Creates a table from a row index and row-major data.
    ///
    /// Fails if `data` does not hold exactly `index.len() * n_columns` values
    /// or if the index contains a duplicate key.
    pub fn new(index: Vec<K>, n_columns: usize, data: Vec<f64>) -> Result<Self, PlasmaError> {
        if data.len() != index.len() * n_columns {
            return Err(PlasmaError::InvalidTable {
                message: format!(
                    "expected {} values for {} rows x {} columns, got {}",
                    index.len() * n_columns,
                    index.len(),
                    n_columns,
                    data.len()
                ),
            });
        }
        let mut seen = HashSet::with_capacity(index.len());
        for key in &index {
            if !seen.insert(key) {
                return Err(PlasmaError::InvalidTable {
                    message: format!("duplicate row key {key}"),
                });
            }
        }
        Ok(Self {
            index,
            n_columns,
            data,
        })
    }

    /// Creates a table from one vector per row.
    pub fn from_rows(
        index: Vec<K>,
        n_columns: usize,
        rows: Vec<Vec<f64>>,
    ) -> Result<Self, PlasmaError> {
        if rows.len() != index.len() {
            return Err(PlasmaError::InvalidTable {
                message: format!("{} index keys but {} rows", index.len(), rows.len()),
            });
        }
        if let Some(row) = rows.iter().find(|r| r.len() != n_columns) {
            return Err(PlasmaError::InvalidTable {
                message: format!("row of length {} in a {n_columns}-column table", row.len()),
            });
        }
        Self::new(index, n_columns, rows.concat())
    }
}

impl<K> LabeledTable<K> {
    /// Creates a table by evaluating `f(row, column)` for every cell.
    ///
    /// The caller guarantees the index is free of duplicates, typically by
    /// copying it from an existing table.
    pub fn from_fn(
        index: Vec<K>,
        n_columns: usize,
        mut f: impl FnMut(usize, usize) -> f64,
    ) -> Self {
        let mut data = Vec::with_capacity(index.len() * n_columns);
        for row in 0..index.len() {
            for column in 0..n_columns {
                data.push(f(row, column));
            }
        }
        Self {
            index,
            n_columns,
            data,
        }
    }

    /// Returns the row index.
    pub fn index(&self) -> &[K] {
        &self.index
    }

    /// Returns the number of rows.
    pub fn n_rows(&self) -> usize {
        self.index.len()
    }

    /// Returns the number of columns (cells).
    pub fn n_columns(&self) -> usize {
        self.n_columns
    }

    /// Returns row `row` as a slice of `n_columns` values.
    ///
    /// # Panics
    ///
    /// Panics if `row >= n_rows()`.
    pub fn row(&self, row: usize) -> &[f64] {
        let start = row * self.n_columns;
        &self.data[start..start + self.n_columns]
    }

    /// Returns the value at `(row, column)`, or `None` when out of range.
    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        if row < self.n_rows() && column < self.n_columns {
            Some(self.data[row * self.n_columns + column])
        } else {
            None
        }
    }

    /// Iterates over `(key, row)` pairs in index order.
    pub fn rows(&self) -> impl Iterator<Item = (&K, &[f64])> + '_ {
        self.index
            .iter()
            .enumerate()
            .map(move |(i, key)| (key, self.row(i)))
    }
}

impl<K: PartialEq> LabeledTable<K> {
    /// Returns the position of `key` in the row index.
    pub fn position(&self, key: &K) -> Option<usize> {
        self.index.iter().position(|k| k == key)
    }

    /// Returns the row labeled `key`.
    pub fn row_by_key(&self, key: &K) -> Option<&[f64]> {
        self.position(key).map(|i| self.row(i))
    }
}

#[derive(Serialize)]
struct TableView<'a, K> {
    index: &'a [K],
    n_columns: usize,
    rows: Vec<&'a [f64]>,
}

#[derive(Deserialize)]
struct TableRepr<K> {
    index: Vec<K>,
    n_columns: usize,
    rows: Vec<Vec<f64>>,
}

impl<K: Serialize> Serialize for LabeledTable<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        TableView {
            index: &self.index,
            n_columns: self.n_columns,
            rows: (0..self.n_rows()).map(|i| self.row(i)).collect(),
        }
        .serialize(serializer)
    }
}

impl<'de, K> Deserialize<'de> for LabeledTable<K>
where
    K: Deserialize<'de> + Clone + Eq + Hash + std::fmt::Display,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = TableRepr::<K>::deserialize(deserializer)?;
        LabeledTable::from_rows(repr.index, repr.n_columns, repr.rows)
            .map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
