//! Values that flow through the property graph.
//!
//! Every named entry in the context holds a [`PropertyValue`]. Large values are
//! reference-counted so that resolving an input is a cheap clone, and so that a
//! table published by one node can be read by any number of downstream nodes
//! without copying.
//!
//! [`Inputs`] is what a node's `calculate` receives: the resolved values in
//! declaration order, with typed accessors that report mismatches against the
//! node and input names.

use std::sync::Arc;

use serde::Serialize;

use crate::{
    AtomicDataSource, LabeledTable, LevelKey, LevelsTable, LinesTable, NlteConfig, PlasmaError,
    PropertyName, SpeciesKey,
};

/// The output of the partition-function property.
///
/// Both tables are published together because the per-level table is consumed
/// by other downstream properties without being recomputed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionFunctionOutput {
    /// Per-level Boltzmann-weighted proportionalities; row index = levels,
    /// columns = cells.
    pub level_population_proportionalities: Arc<LabeledTable<LevelKey>>,
    /// Per-species partition functions; row index = species in key order,
    /// columns = cells.
    pub partition_functions: LabeledTable<SpeciesKey>,
}

/// A value held in the context under a property name.
#[derive(Debug, Clone)]
pub enum PropertyValue {
    /// The atomic-data source consumed by memoized-source properties.
    AtomicData(Arc<dyn AtomicDataSource>),
    /// The per-level atomic dataset.
    Levels(Arc<LevelsTable>),
    /// The per-transition atomic dataset.
    Lines(Arc<LinesTable>),
    /// One value per simulation cell (`t_rad`, `w`, `beta_rad`).
    CellValues(Arc<[f64]>),
    /// A per-level, per-cell table (`level_boltzmann_factor`, `level_populations`).
    LevelTable(Arc<LabeledTable<LevelKey>>),
    /// The partition-function pair.
    PartitionFunction(Arc<PartitionFunctionOutput>),
    /// The NLTE override set and run phase.
    Nlte(Arc<NlteConfig>),
}

impl PropertyValue {
    /// Returns a short description of the value's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::AtomicData(_) => "atomic data",
            PropertyValue::Levels(_) => "a levels table",
            PropertyValue::Lines(_) => "a lines table",
            PropertyValue::CellValues(_) => "per-cell values",
            PropertyValue::LevelTable(_) => "a per-level table",
            PropertyValue::PartitionFunction(_) => "partition functions",
            PropertyValue::Nlte(_) => "an NLTE configuration",
        }
    }

    /// Returns the per-cell values, if this is a [`PropertyValue::CellValues`].
    pub fn as_cell_values(&self) -> Option<&[f64]> {
        match self {
            PropertyValue::CellValues(values) => Some(&values[..]),
            _ => None,
        }
    }

    /// Returns the levels table, if this is a [`PropertyValue::Levels`].
    pub fn as_levels(&self) -> Option<&Arc<LevelsTable>> {
        match self {
            PropertyValue::Levels(levels) => Some(levels),
            _ => None,
        }
    }

    /// Returns the lines table, if this is a [`PropertyValue::Lines`].
    pub fn as_lines(&self) -> Option<&Arc<LinesTable>> {
        match self {
            PropertyValue::Lines(lines) => Some(lines),
            _ => None,
        }
    }

    /// Returns the per-level table, if this is a [`PropertyValue::LevelTable`].
    pub fn as_level_table(&self) -> Option<&Arc<LabeledTable<LevelKey>>> {
        match self {
            PropertyValue::LevelTable(table) => Some(table),
            _ => None,
        }
    }

    /// Returns the partition-function pair, if this is a
    /// [`PropertyValue::PartitionFunction`].
    pub fn as_partition_function(&self) -> Option<&Arc<PartitionFunctionOutput>> {
        match self {
            PropertyValue::PartitionFunction(output) => Some(output),
            _ => None,
        }
    }

    /// Returns `true` if both values share the same underlying allocation.
    ///
    /// Used to check that memoized values are handed out, not recomputed.
    pub fn ptr_eq(&self, other: &PropertyValue) -> bool {
        match (self, other) {
            (PropertyValue::AtomicData(a), PropertyValue::AtomicData(b)) => Arc::ptr_eq(a, b),
            (PropertyValue::Levels(a), PropertyValue::Levels(b)) => Arc::ptr_eq(a, b),
            (PropertyValue::Lines(a), PropertyValue::Lines(b)) => Arc::ptr_eq(a, b),
            (PropertyValue::CellValues(a), PropertyValue::CellValues(b)) => Arc::ptr_eq(a, b),
            (PropertyValue::LevelTable(a), PropertyValue::LevelTable(b)) => Arc::ptr_eq(a, b),
            (PropertyValue::PartitionFunction(a), PropertyValue::PartitionFunction(b)) => {
                Arc::ptr_eq(a, b)
            }
            (PropertyValue::Nlte(a), PropertyValue::Nlte(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<Vec<f64>> for PropertyValue {
    fn from(values: Vec<f64>) -> Self {
        PropertyValue::CellValues(values.into())
    }
}

impl From<LevelsTable> for PropertyValue {
    fn from(levels: LevelsTable) -> Self {
        PropertyValue::Levels(Arc::new(levels))
    }
}

impl From<LinesTable> for PropertyValue {
    fn from(lines: LinesTable) -> Self {
        PropertyValue::Lines(Arc::new(lines))
    }
}

impl From<LabeledTable<LevelKey>> for PropertyValue {
    fn from(table: LabeledTable<LevelKey>) -> Self {
        PropertyValue::LevelTable(Arc::new(table))
    }
}

impl From<PartitionFunctionOutput> for PropertyValue {
    fn from(output: PartitionFunctionOutput) -> Self {
        PropertyValue::PartitionFunction(Arc::new(output))
    }
}

impl From<NlteConfig> for PropertyValue {
    fn from(config: NlteConfig) -> Self {
        PropertyValue::Nlte(Arc::new(config))
    }
}

impl From<Arc<dyn AtomicDataSource>> for PropertyValue {
    fn from(source: Arc<dyn AtomicDataSource>) -> Self {
        PropertyValue::AtomicData(source)
    }
}

// ---------------------------------------------------------------------------
// Resolved inputs
// ---------------------------------------------------------------------------

/// Generates a typed positional accessor on [`Inputs`].
macro_rules! typed_input {
    (
        $(#[$attr:meta])*
        $fn_name:ident -> $ret:ty, $variant:ident, $expected:literal
    ) => {
        $(#[$attr])*
        pub fn $fn_name(&self, position: usize) -> Result<$ret, PlasmaError> {
            match self.value(position)? {
                PropertyValue::$variant(inner) => Ok(inner),
                other => Err(self.mismatch(position, $expected, other)),
            }
        }
    };
}

/// The resolved inputs of one `calculate` call, in declaration order.
#[derive(Debug)]
pub struct Inputs<'a> {
    property: &'a PropertyName,
    names: &'a [&'static str],
    values: Vec<PropertyValue>,
}

impl<'a> Inputs<'a> {
    /// Pairs resolved values with the names they were resolved from.
    ///
    /// `values[i]` must be the value resolved for `names[i]`.
    pub fn new(
        property: &'a PropertyName,
        names: &'a [&'static str],
        values: Vec<PropertyValue>,
    ) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self {
            property,
            names,
            values,
        }
    }

    /// Returns the name of the property being calculated.
    pub fn property(&self) -> &PropertyName {
        self.property
    }

    /// Returns the value at `position`.
    pub fn value(&self, position: usize) -> Result<&PropertyValue, PlasmaError> {
        self.values
            .get(position)
            .ok_or_else(|| PlasmaError::MissingInput {
                property: self.property.clone(),
                input: self
                    .names
                    .get(position)
                    .map_or_else(|| format!("#{position}"), |n| n.to_string()),
            })
    }

    /// Returns the declared name of the input at `position`.
    pub fn name(&self, position: usize) -> &str {
        self.names.get(position).copied().unwrap_or("?")
    }

    typed_input! {
        /// Returns the atomic-data source at `position`.
        atomic_data -> &Arc<dyn AtomicDataSource>, AtomicData, "atomic data"
    }

    typed_input! {
        /// Returns the levels table at `position`.
        levels -> &Arc<LevelsTable>, Levels, "a levels table"
    }

    typed_input! {
        /// Returns the per-level table at `position`.
        level_table -> &Arc<LabeledTable<LevelKey>>, LevelTable, "a per-level table"
    }

    typed_input! {
        /// Returns the NLTE configuration at `position`.
        nlte -> &Arc<NlteConfig>, Nlte, "an NLTE configuration"
    }

    /// Returns the per-cell values at `position`.
    pub fn cell_values(&self, position: usize) -> Result<&[f64], PlasmaError> {
        match self.value(position)? {
            PropertyValue::CellValues(values) => Ok(&values[..]),
            other => Err(self.mismatch(position, "per-cell values", other)),
        }
    }

    fn mismatch(&self, position: usize, expected: &str, found: &PropertyValue) -> PlasmaError {
        PlasmaError::InputType {
            property: self.property.clone(),
            input: self.name(position).to_string(),
            expected: expected.to_string(),
            found: found.kind().to_string(),
        }
    }
}
