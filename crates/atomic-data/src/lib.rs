//! Atomic data infrastructure adapter.
//!
//! Implements the [`plasma::AtomicDataSource`] port over JSON documents of the
//! form:
//!
//! ```json
//! {
//!   "levels": [{ "level": [2, 0, 0], "energy": 0.0, "g": 1.0, "metastable": true }],
//!   "lines":  [{ "line_id": 1, "atomic_number": 2, "ion_number": 0,
//!                "level_number_lower": 0, "level_number_upper": 1,
//!                "wavelength": 584.3, "f_lu": 0.27, "f_ul": 0.09 }]
//! }
//! ```
//!
//! Either array may be omitted; the capability flag for that dataset is then
//! `false` and the corresponding memoized property fails with
//! `IncompleteAtomicData`.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** File access and JSON parsing live here. The `plasma`
//! and `properties` crates see only [`plasma::AtomicDataSource`].

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use plasma::{
    AtomicDataSource, LabeledTable, LevelKey, LevelsTable, LinesTable, PropertyValue,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Dataset name of the per-level table.
pub const LEVELS: &str = "levels";
/// Dataset name of the per-transition table.
pub const LINES: &str = "lines";

/// Errors raised while loading atomic data or populations from disk.
#[derive(Debug, Error)]
pub enum AtomicDataError {
    /// The file could not be opened or read.
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid JSON or violates a table invariant.
    #[error("Failed to parse atomic data from '{origin}': {source}")]
    Parse {
        /// Path or description of the document.
        origin: String,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct AtomicDataDocument {
    #[serde(default)]
    levels: Option<LevelsTable>,
    #[serde(default)]
    lines: Option<LinesTable>,
}

/// Atomic data loaded from a JSON document and held in memory.
#[derive(Debug, Clone, Default)]
pub struct JsonAtomicData {
    levels: Option<Arc<LevelsTable>>,
    lines: Option<Arc<LinesTable>>,
}

impl JsonAtomicData {
    /// Builds a source from already parsed tables.
    pub fn new(levels: Option<LevelsTable>, lines: Option<LinesTable>) -> Self {
        Self {
            levels: levels.map(Arc::new),
            lines: lines.map(Arc::new),
        }
    }

    /// Loads a source from the JSON file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AtomicDataError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| AtomicDataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let data = Self::from_reader(BufReader::new(file), &path.display().to_string())?;
        info!(
            path = %path.display(),
            levels = data.levels.as_ref().map_or(0, |l| l.len()),
            lines = data.lines.as_ref().map_or(0, |l| l.len()),
            "Loaded atomic data"
        );
        Ok(data)
    }

    /// Loads a source from any JSON reader; `origin` names it in errors.
    pub fn from_reader(reader: impl Read, origin: &str) -> Result<Self, AtomicDataError> {
        let document: AtomicDataDocument =
            serde_json::from_reader(reader).map_err(|source| AtomicDataError::Parse {
                origin: origin.to_string(),
                source,
            })?;
        Ok(Self::new(document.levels, document.lines))
    }
}

impl AtomicDataSource for JsonAtomicData {
    fn has(&self, name: &str) -> bool {
        match name {
            LEVELS => self.levels.is_some(),
            LINES => self.lines.is_some(),
            _ => false,
        }
    }

    fn get(&self, name: &str) -> Option<PropertyValue> {
        debug!(dataset = name, "Atomic dataset requested");
        match name {
            LEVELS => self.levels.clone().map(PropertyValue::Levels),
            LINES => self.lines.clone().map(PropertyValue::Lines),
            _ => None,
        }
    }
}

/// Loads a per-level population table from the JSON file at `path`.
///
/// The document is a serialised [`LabeledTable`]:
/// `{ "index": [[2, 0, 0], ...], "n_columns": 1, "rows": [[0.8], ...] }`.
pub fn load_level_populations(
    path: impl AsRef<Path>,
) -> Result<LabeledTable<LevelKey>, AtomicDataError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| AtomicDataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| AtomicDataError::Parse {
        origin: path.display().to_string(),
        source,
    })
}
