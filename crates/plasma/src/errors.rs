//! Top-level error type for the plasma property graph.
//!
//! [`PlasmaError`] covers every condition under which a node cannot produce its
//! value. Errors surface synchronously from `update`; nodes never recover
//! locally and never mutate their value slot on failure. The first failing node
//! aborts the pass, and the error names the property that could not be produced.
//!
//! Infrastructure crates (atomic data loading, configuration) define their own
//! error types and convert at the composition root.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{PropertyName, SpeciesKey};

/// Errors raised while assembling or updating the property graph.
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub enum PlasmaError {
    /// The atomic-data source reports that it does not carry the dataset a
    /// memoized-source node needs (`has(name)` is false).
    ///
    /// This is a static configuration fact; it is never retried.
    #[error("Incomplete atomic data: the atomic data source does not provide '{name}'")]
    IncompleteAtomicData {
        /// Name of the property (and dataset) that could not be loaded.
        name: PropertyName,
    },

    /// The context holds no value for one of the node's declared inputs.
    ///
    /// Usually means the graph was assembled out of order or an external input
    /// (`t_rad`, `w`, ...) was never supplied.
    #[error("Property '{property}' requires input '{input}', which is not available")]
    MissingInput {
        /// Property whose update failed.
        property: PropertyName,
        /// Declared input that could not be resolved.
        input: String,
    },

    /// A resolved input has a different kind than the node expects.
    #[error("Property '{property}' expected input '{input}' to be {expected}, found {found}")]
    InputType {
        /// Property whose update failed.
        property: PropertyName,
        /// Name of the offending input.
        input: String,
        /// Kind the node expected.
        expected: String,
        /// Kind actually found in the context.
        found: String,
    },

    /// Column counts or vector lengths of upstream values disagree.
    #[error("Shape mismatch in '{property}': {message}")]
    ShapeMismatch {
        /// Property whose update failed.
        property: PropertyName,
        /// Description of the disagreeing shapes.
        message: String,
    },

    /// The row index of an upstream table does not match the primary upstream
    /// table the node broadcasts against.
    #[error("Row index of input '{input}' does not match the levels index in '{property}'")]
    IndexMismatch {
        /// Property whose update failed.
        property: PropertyName,
        /// Input whose row index disagrees.
        input: String,
    },

    /// An input carries non-physical values (e.g. a non-positive temperature).
    #[error("Invalid input for '{property}': {message}")]
    InvalidInput {
        /// Property whose update failed.
        property: PropertyName,
        /// Description of the rejected values.
        message: String,
    },

    /// An NLTE override names a species for which no levels or populations
    /// are known.
    #[error("Property '{property}' cannot override unknown species {species}")]
    UnknownSpecies {
        /// Property whose update failed.
        property: PropertyName,
        /// The species listed in the override set.
        species: SpeciesKey,
    },

    /// Two nodes were registered under the same name.
    #[error("A property named '{name}' is already registered")]
    DuplicateProperty {
        /// The clashing name.
        name: PropertyName,
    },

    /// A property or input name is empty.
    #[error("Property names must not be empty")]
    InvalidName,

    /// A labeled table was constructed with inconsistent shape or index.
    #[error("Invalid table: {message}")]
    InvalidTable {
        /// Description of the inconsistency.
        message: String,
    },
}

impl PlasmaError {
    /// Returns `true` if the error reflects how the graph or its data sources
    /// were configured, rather than the numbers flowing through it.
    ///
    /// Callers report these as configuration problems instead of run failures.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            PlasmaError::IncompleteAtomicData { .. }
                | PlasmaError::MissingInput { .. }
                | PlasmaError::UnknownSpecies { .. }
                | PlasmaError::DuplicateProperty { .. }
                | PlasmaError::InvalidName
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_incomplete_atomic_data_names_the_dataset() {
        let err = PlasmaError::IncompleteAtomicData {
            name: PropertyName::new("lines").unwrap(),
        };
        assert!(err.to_string().contains("'lines'"));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_numeric_errors_are_not_configuration_errors() {
        let err = PlasmaError::InvalidInput {
            property: PropertyName::new("beta_rad").unwrap(),
            message: "t_rad[0] = 0 is not positive".to_string(),
        };
        assert!(!err.is_configuration_error());
    }
}
