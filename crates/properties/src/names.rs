//! Names under which values are published in the context.
//!
//! Computed properties and externally supplied inputs share one namespace.

/// The atomic-data source (supplied by the caller).
pub const ATOMIC_DATA: &str = "atomic_data";
/// Radiation temperature per cell, K (supplied by the caller).
pub const T_RAD: &str = "t_rad";
/// Dilution factor per cell (supplied by the caller).
pub const W: &str = "w";
/// NLTE override set and run phase (supplied by the caller).
pub const NLTE: &str = "nlte";
/// Iterated level populations (supplied by the caller).
pub const LEVEL_POPULATIONS: &str = "level_populations";

/// Per-level atomic dataset.
pub const LEVELS: &str = "levels";
/// Per-transition atomic dataset.
pub const LINES: &str = "lines";
/// `1 / (k_B T_rad)` per cell.
pub const BETA_RAD: &str = "beta_rad";
/// `g * exp(-E * beta_rad)` per level and cell.
pub const LEVEL_BOLTZMANN_FACTOR: &str = "level_boltzmann_factor";
/// Per-level proportionalities and per-species partition functions.
pub const PARTITION_FUNCTION: &str = "partition_function";
