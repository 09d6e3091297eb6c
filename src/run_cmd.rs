//! Run command: compute TEM diagnostics for every configured experiment.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use tracing::{error, info, info_span};

use tem_diagnostics::{PhysicalConstants, compute_tem_chunked};
use tem_io::{ReaderConfig, WriterConfig, read_experiment, write_bundle};

use crate::cli::RunArgs;
use crate::config::TemConfig;
use crate::convert;

/// Settings shared by every experiment in a batch.
struct Batch {
    input_dir: PathBuf,
    output_dir: PathBuf,
    reader: ReaderConfig,
    writer: WriterConfig,
    constants: PhysicalConstants,
    time_chunk: usize,
}

/// Run the batch. Each experiment is independent: a failure is logged and
/// the remaining experiments still run, but the command then fails.
pub fn run(args: RunArgs) -> Result<()> {
    let _cmd = info_span!("run").entered();

    let toml_str = std::fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config file: {}", args.config.display()))?;
    let config: TemConfig = toml::from_str(&toml_str).context("failed to parse TOML config")?;

    let input_dir = args
        .input_dir
        .or(config.io.input_dir.clone())
        .ok_or_else(|| anyhow!("no input directory: set [io].input_dir in config or use --input-dir"))?;
    let output_dir = args
        .output_dir
        .or(config.io.output_dir.clone())
        .ok_or_else(|| {
            anyhow!("no output directory: set [io].output_dir in config or use --output-dir")
        })?;
    let experiments = if args.experiments.is_empty() {
        config.experiments.clone()
    } else {
        args.experiments
    };
    if experiments.is_empty() {
        bail!("no experiments: set `experiments` in config or use --experiment");
    }

    let batch = Batch {
        input_dir,
        output_dir,
        reader: convert::build_reader_config(&config.io)?,
        writer: convert::build_writer_config(&config.io),
        constants: convert::build_constants(&config.constants)?,
        time_chunk: config.io.time_chunk,
    };

    let mut failed = Vec::new();
    for name in &experiments {
        let _exp = info_span!("experiment", name = %name).entered();
        match process_experiment(name, &batch) {
            Ok(path) => info!(output = %path.display(), "experiment done"),
            Err(e) => {
                error!("{e:#}");
                failed.push(name.as_str());
            }
        }
    }

    info!(
        total = experiments.len(),
        failed = failed.len(),
        "batch finished"
    );
    if !failed.is_empty() {
        bail!(
            "{} of {} experiment(s) failed: {}",
            failed.len(),
            experiments.len(),
            failed.join(", ")
        );
    }
    Ok(())
}

fn process_experiment(name: &str, batch: &Batch) -> Result<PathBuf> {
    let exp_dir = batch.input_dir.join(name);
    info!(dir = %exp_dir.display(), "reading fluxes");
    let record = read_experiment(&batch.input_dir, name, &batch.reader)
        .with_context(|| format!("failed to read fluxes for experiment {name}"))?;
    let (fluxes, metadata) = record.into_parts();

    let result = compute_tem_chunked(&fluxes, &batch.constants, batch.time_chunk)
        .with_context(|| format!("failed to compute TEM diagnostics for experiment {name}"))?;

    let output = output_path(&batch.output_dir, name);
    write_bundle(&output, result.bundle(), &metadata, &batch.writer)
        .with_context(|| format!("failed to write {}", output.display()))?;
    Ok(output)
}

/// Destination of one experiment's diagnostics.
fn output_path(output_dir: &Path, experiment: &str) -> PathBuf {
    output_dir.join(format!("{experiment}.nc"))
}
