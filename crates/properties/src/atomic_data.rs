//! Memoized atomic-data properties.
//!
//! A single [`AtomicDataProperty`] implementation serves every dataset; members
//! of the family differ only by the name they load. The dataset is read from
//! the source once and frozen: later updates hand back the cached value even
//! though the source is resolved again as an input.

use plasma::{Calculation, Inputs, PlasmaError, PropertyValue};
use tracing::{debug, warn};

use crate::names;

/// Load state of a memoized dataset.
#[derive(Debug)]
enum Memo {
    Uninitialized,
    Cached(PropertyValue),
}

/// A property whose value is a dataset loaded once from the atomic-data source.
#[derive(Debug)]
pub struct AtomicDataProperty {
    name: &'static str,
    type_str: &'static str,
    accepts: fn(&PropertyValue) -> bool,
    state: Memo,
}

impl AtomicDataProperty {
    /// Creates a memoized property for the dataset `name`.
    ///
    /// `accepts` decides whether a value handed out by the source has the
    /// kind this dataset must have; anything else is rejected before caching.
    pub fn new(
        name: &'static str,
        type_str: &'static str,
        accepts: fn(&PropertyValue) -> bool,
    ) -> Self {
        Self {
            name,
            type_str,
            accepts,
            state: Memo::Uninitialized,
        }
    }

    /// The per-level dataset (`levels`).
    pub fn levels() -> Self {
        Self::new(names::LEVELS, "levels table", |v| v.as_levels().is_some())
    }

    /// The per-transition dataset (`lines`).
    pub fn lines() -> Self {
        Self::new(names::LINES, "lines table", |v| v.as_lines().is_some())
    }

    /// Returns `true` once the dataset has been loaded.
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, Memo::Cached(_))
    }
}

impl Calculation for AtomicDataProperty {
    fn name(&self) -> &'static str {
        self.name
    }

    fn inputs(&self) -> &'static [&'static str] {
        &[names::ATOMIC_DATA]
    }

    fn type_str(&self) -> &'static str {
        self.type_str
    }

    fn calculate(&mut self, inputs: &Inputs<'_>) -> Result<PropertyValue, PlasmaError> {
        if let Memo::Cached(value) = &self.state {
            return Ok(value.clone());
        }

        let source = inputs.atomic_data(0)?;
        let incomplete = || PlasmaError::IncompleteAtomicData {
            name: inputs.property().clone(),
        };
        if !source.has(self.name) {
            warn!(dataset = self.name, "Atomic data source does not provide dataset");
            return Err(incomplete());
        }
        let value = source.get(self.name).ok_or_else(incomplete)?;
        if !(self.accepts)(&value) {
            return Err(PlasmaError::InputType {
                property: inputs.property().clone(),
                input: self.name.to_string(),
                expected: self.type_str.to_string(),
                found: value.kind().to_string(),
            });
        }

        debug!(dataset = self.name, kind = value.kind(), "Loaded atomic dataset");
        self.state = Memo::Cached(value.clone());
        Ok(value)
    }
}
