//! Core domain for the plasma property graph.
//!
//! This crate contains the property node contract, the context through which
//! properties resolve each other by name, the value and identifier types that
//! flow through the graph, and the ports implemented by infrastructure crates
//! (atomic-data sources). Concrete properties live in the `properties` crate.
//!
//! ## Architectural Layer
//!
//! **Business logic + port definitions.** This crate has no I/O dependencies.
//! It defines *what* a property needs; other crates define *how* to supply it.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | `PropertyName`, `PlasmaRunId` |
//! | [`types`] | Index keys, `LabeledTable`, `Timestamp` |
//! | [`atomic`] | Levels/lines datasets and the `AtomicDataSource` port |
//! | [`value`] | `PropertyValue` and resolved `Inputs` |
//! | [`property`] | The `Calculation` contract and the `PlasmaProperty` node |
//! | [`context`] | The `PlasmaContext` port and the in-memory `ValueRegistry` |
//! | [`nlte`] | NLTE override configuration |
//! | [`constants`] | Physical constants provider |
//! | [`errors`] | `PlasmaError` |

pub mod atomic;
pub mod constants;
pub mod context;
pub mod errors;
pub mod identifiers;
pub mod nlte;
pub mod property;
pub mod types;
pub mod value;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use atomic::{AtomicDataSource, LevelRecord, LevelsTable, LineRecord, LinesTable};
pub use constants::{PhysicalConstants, BOLTZMANN_CGS};
pub use context::{PlasmaContext, ValueRegistry};
pub use errors::PlasmaError;
pub use identifiers::{PlasmaRunId, PropertyName};
pub use nlte::NlteConfig;
pub use property::{Calculation, PlasmaProperty};
pub use types::{LabeledTable, LevelKey, SpeciesKey, Timestamp};
pub use value::{Inputs, PartitionFunctionOutput, PropertyValue};
