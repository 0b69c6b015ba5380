//! Concrete plasma properties and the `BasePlasma` driver.
//!
//! Each property implements [`plasma::Calculation`] and nothing else. The
//! families provided here:
//!
//! | Property | Kind | Inputs |
//! |----------|------|--------|
//! | `levels`, `lines` | memoized atomic data | `atomic_data` |
//! | `beta_rad` | formula | `t_rad` |
//! | `level_boltzmann_factor` | formula | `levels`, `beta_rad` |
//! | `partition_function` | formula + NLTE override | `levels`, `level_boltzmann_factor`, `w`, `nlte`, `level_populations` |
//!
//! ## Architectural Layer
//!
//! **Orchestration layer.** Properties sequence domain computations over
//! values resolved from the context. They know nothing about where atomic data
//! or configuration come from.

pub mod atomic_data;
pub mod boltzmann;
pub mod driver;
pub mod names;
pub mod partition;
pub mod radiation;

pub use atomic_data::AtomicDataProperty;
pub use boltzmann::{boltzmann_factors, LevelBoltzmannFactor};
pub use driver::BasePlasma;
pub use partition::PartitionFunction;
pub use radiation::BetaRadiation;
