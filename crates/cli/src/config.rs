//! Run configuration.
//!
//! Loaded from a TOML file such as:
//!
//! ```toml
//! atomic_data = "helium.json"
//! t_rad = [10000.0, 12000.0]
//! w = [0.5, 0.4]
//! level_populations = "populations.json"
//!
//! [nlte]
//! species = [[2, 1]]
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.
//! The configuration is validated at load time; a run never starts with an
//! invalid one.

use std::path::{Path, PathBuf};

use plasma::{NlteConfig, PhysicalConstants, SpeciesKey};
use serde::Deserialize;
use thiserror::Error;

/// Errors raised while loading or validating the run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration '{path}': {source}")]
    Read {
        /// Path of the configuration file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML or has unknown keys.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but its values are inconsistent.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// Description of the problem.
        message: String,
    },
}

/// NLTE section of the run configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NlteSection {
    /// Species whose partition function comes from level populations.
    #[serde(default)]
    pub species: Vec<SpeciesKey>,
}

/// The run configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// JSON atomic data file.
    pub atomic_data: PathBuf,
    /// Radiation temperature per cell, K.
    pub t_rad: Vec<f64>,
    /// Dilution factor per cell.
    pub w: Vec<f64>,
    /// NLTE overrides.
    #[serde(default)]
    pub nlte: NlteSection,
    /// JSON level-population table, required when NLTE species are listed.
    #[serde(default)]
    pub level_populations: Option<PathBuf>,
    /// Override of the Boltzmann constant, erg/K.
    #[serde(default)]
    pub boltzmann_cgs: Option<f64>,
}

impl RunConfig {
    /// Reads, parses and validates the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the cross-field invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| Err(ConfigError::Invalid { message });
        if self.t_rad.is_empty() {
            return invalid("t_rad must list at least one cell".to_string());
        }
        if self.t_rad.len() != self.w.len() {
            return invalid(format!(
                "t_rad has {} cells but w has {}",
                self.t_rad.len(),
                self.w.len()
            ));
        }
        if let Some(w) = self.w.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
            return invalid(format!("dilution factor {w} is not a non-negative number"));
        }
        if let Some(k) = self.boltzmann_cgs {
            if !(k.is_finite() && k > 0.0) {
                return invalid(format!("boltzmann_cgs = {k} is not positive"));
            }
        }
        if !self.nlte.species.is_empty() && self.level_populations.is_none() {
            return invalid("nlte.species requires level_populations".to_string());
        }
        Ok(())
    }

    /// Returns the physical constants for this run.
    pub fn constants(&self) -> PhysicalConstants {
        let constants = PhysicalConstants::cgs();
        match self.boltzmann_cgs {
            Some(k) => constants.with_boltzmann(k),
            None => constants,
        }
    }

    /// Returns the NLTE configuration for the initializing pass.
    pub fn nlte_config(&self) -> NlteConfig {
        NlteConfig::new(self.nlte.species.clone())
    }

    fn resolve_paths(&mut self, base: &Path) {
        self.atomic_data = base.join(&self.atomic_data);
        if let Some(populations) = self.level_populations.take() {
            self.level_populations = Some(base.join(populations));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        atomic_data = "he.json"
        t_rad = [10000.0, 12000.0]
        w = [0.5, 0.4]
    "#;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = RunConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.nlte, NlteSection::default());
        assert_eq!(config.constants(), PhysicalConstants::cgs());
        assert!(config.nlte_config().species.is_empty());
    }

    #[test]
    fn test_nlte_species_parse_as_pairs() {
        let text = format!("{MINIMAL}\nlevel_populations = \"pop.json\"\n[nlte]\nspecies = [[2, 1], [26, 0]]\n");
        let config = RunConfig::from_toml_str(&text).unwrap();
        assert_eq!(
            config.nlte.species,
            vec![SpeciesKey::new(2, 1), SpeciesKey::new(26, 0)]
        );
        assert!(config.nlte_config().initializing);
    }

    #[test]
    fn test_mismatched_cells_are_rejected() {
        let text = r#"
            atomic_data = "he.json"
            t_rad = [10000.0]
            w = [0.5, 0.4]
        "#;
        let err = RunConfig::from_toml_str(text).unwrap_err();
        assert!(err.to_string().contains("t_rad has 1 cells but w has 2"));
    }

    #[test]
    fn test_nlte_without_populations_is_rejected() {
        let text = format!("{MINIMAL}\n[nlte]\nspecies = [[2, 1]]\n");
        let err = RunConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let text = format!("{MINIMAL}\nt_electron = [9000.0, 9000.0]\n");
        assert!(matches!(
            RunConfig::from_toml_str(&text),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_paths_resolve_against_config_directory() {
        let text = format!("{MINIMAL}\nlevel_populations = \"pop.json\"\n");
        let mut config = RunConfig::from_toml_str(&text).unwrap();
        config.resolve_paths(Path::new("/runs/helium"));
        assert_eq!(config.atomic_data, PathBuf::from("/runs/helium/he.json"));
        assert_eq!(
            config.level_populations,
            Some(PathBuf::from("/runs/helium/pop.json"))
        );
    }
}
