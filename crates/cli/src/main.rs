//! Plasma CLI entry point.
//!
//! This binary is the composition root for the workspace. Responsibilities:
//!
//! 1. **Parse configuration**: load the TOML run configuration and validate it.
//! 2. **Wire observability**: install `tracing-subscriber` with a JSON layer
//!    and, when configured, an OpenTelemetry OTLP exporter.
//! 3. **Construct infrastructure**: load the JSON atomic data and level
//!    populations and hand them to the property graph.
//! 4. **Drive passes**: the first pass is the initializing one (NLTE overrides
//!    suppressed); every later pass applies the overrides.
//! 5. **Report**: write the published values of every pass as JSON.
//!
//! Exit codes: `0` success, `1` run failure, `2` configuration problem.

mod config;
mod report;
mod telemetry;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use atomic_data::{load_level_populations, AtomicDataError, JsonAtomicData};
use clap::Parser;
use plasma::PlasmaError;
use properties::{names, BasePlasma};
use tracing::{error, info};

use crate::config::{ConfigError, RunConfig};
use crate::report::{PassReport, RunReport};

/// Computes radiation factors and partition functions for a plasma.
#[derive(Debug, Parser)]
#[command(name = "plasma", version, about)]
struct Cli {
    /// Path to the TOML run configuration.
    #[arg(short, long)]
    config: PathBuf,

    /// Number of update passes; the first one is the initializing pass.
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    passes: u32,

    /// Write the JSON report here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the label of every property before running.
    #[arg(long)]
    labels: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let telemetry = match telemetry::init() {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let result = run(&cli);
    let code = match &result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "Run failed");
            eprintln!("error: {err:#}");
            if is_configuration_problem(err) {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    };

    telemetry.shutdown();
    code
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = RunConfig::load(&cli.config)?;
    let atomic_data = JsonAtomicData::from_path(&config.atomic_data)?;
    let populations = config
        .level_populations
        .as_ref()
        .map(load_level_populations)
        .transpose()?;
    let nlte = config.nlte_config();

    let mut plasma = BasePlasma::lte(
        Arc::new(atomic_data),
        config.t_rad.clone(),
        config.w.clone(),
        nlte.clone(),
        &config.constants(),
    )?;

    if cli.labels {
        for label in plasma.labels() {
            println!("{label}\n");
        }
    }

    let mut report = RunReport::new();
    for pass in 0..cli.passes {
        let initializing = pass == 0;
        if !initializing {
            if let Some(populations) = &populations {
                plasma.set_input(names::LEVEL_POPULATIONS, populations.clone())?;
            }
            plasma.set_input(names::NLTE, nlte.clone().with_initializing(false))?;
        }
        let run_id = plasma
            .update()
            .with_context(|| format!("update pass {pass} failed"))?;
        info!(%run_id, pass, initializing, "Pass complete");
        report
            .passes
            .push(PassReport::capture(run_id, initializing, &plasma)?);
    }

    write_report(&report, cli.output.as_ref())
}

fn write_report(report: &RunReport, output: Option<&PathBuf>) -> anyhow::Result<()> {
    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("failed to create '{}'", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, report).context("failed to write the report")?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Unreadable or malformed inputs named by the configuration count as
/// configuration problems, the same as a dataset missing from a readable file.
fn is_configuration_problem(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ConfigError>().is_some()
        || err.downcast_ref::<AtomicDataError>().is_some()
        || err
            .downcast_ref::<PlasmaError>()
            .is_some_and(PlasmaError::is_configuration_error)
}
