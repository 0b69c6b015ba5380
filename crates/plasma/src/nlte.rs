//! NLTE override configuration.
//!
//! Species listed here have their Boltzmann-equilibrium partition function
//! replaced by one derived from the iterated level populations. The override
//! is skipped on the initializing pass, when no populations exist yet.

use serde::{Deserialize, Serialize};

use crate::SpeciesKey;

/// The NLTE override set together with the current run phase.
///
/// The run phase is supplied by the caller per pass; it is not node state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NlteConfig {
    /// Species whose partition function is taken from level populations.
    #[serde(default)]
    pub species: Vec<SpeciesKey>,
    /// `true` on the first solver pass, before level populations exist.
    #[serde(default)]
    pub initializing: bool,
}

impl NlteConfig {
    /// Creates a configuration overriding `species`, in the initializing phase.
    pub fn new(species: Vec<SpeciesKey>) -> Self {
        Self {
            species,
            initializing: true,
        }
    }

    /// Returns a copy of this configuration with the run phase set.
    pub fn with_initializing(mut self, initializing: bool) -> Self {
        self.initializing = initializing;
        self
    }

    /// Returns `true` if overrides apply on this pass.
    pub fn overrides_active(&self) -> bool {
        !self.species.is_empty() && !self.initializing
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(vec![], false, false)]
    #[case(vec![], true, false)]
    #[case(vec![SpeciesKey::new(2, 0)], true, false)]
    #[case(vec![SpeciesKey::new(2, 0)], false, true)]
    fn test_overrides_active(
        #[case] species: Vec<SpeciesKey>,
        #[case] initializing: bool,
        #[case] expected: bool,
    ) {
        let config = NlteConfig::new(species).with_initializing(initializing);
        assert_eq!(config.overrides_active(), expected);
    }
}
