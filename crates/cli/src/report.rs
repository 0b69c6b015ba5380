//! The JSON report written at the end of a run.

use anyhow::Context;
use plasma::{LabeledTable, PlasmaRunId, SpeciesKey, Timestamp};
use properties::{names, BasePlasma};
use serde::Serialize;

/// Everything a run produced, one entry per update pass.
#[derive(Debug, Serialize)]
pub struct RunReport {
    /// When the run started.
    pub started_at: Timestamp,
    /// Passes in execution order.
    pub passes: Vec<PassReport>,
}

impl RunReport {
    /// Starts an empty report stamped with the current time.
    pub fn new() -> Self {
        Self {
            started_at: Timestamp::now(),
            passes: Vec::new(),
        }
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}

/// The published results of one update pass.
#[derive(Debug, Serialize)]
pub struct PassReport {
    /// Identifier of the pass, as recorded on its span.
    pub run_id: PlasmaRunId,
    /// Whether NLTE overrides were suppressed on this pass.
    pub initializing: bool,
    /// `beta_rad` per cell.
    pub beta_rad: Vec<f64>,
    /// Partition functions per species and cell.
    pub partition_functions: LabeledTable<SpeciesKey>,
}

impl PassReport {
    /// Reads the published values of a completed pass.
    pub fn capture(
        run_id: PlasmaRunId,
        initializing: bool,
        plasma: &BasePlasma,
    ) -> anyhow::Result<Self> {
        let beta_rad = plasma
            .get(names::BETA_RAD)
            .and_then(|v| v.as_cell_values().map(<[f64]>::to_vec))
            .context("beta_rad was not published")?;
        let partition = plasma
            .get(names::PARTITION_FUNCTION)
            .context("partition_function was not published")?;
        let partition_functions = partition
            .as_partition_function()
            .context("partition_function has an unexpected kind")?
            .partition_functions
            .clone();
        Ok(Self {
            run_id,
            initializing,
            beta_rad,
            partition_functions,
        })
    }
}
