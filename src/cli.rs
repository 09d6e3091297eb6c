use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Transformed Eulerian Mean diagnostics.
#[derive(Parser)]
#[command(
    name = "tem",
    version,
    about = "Transformed Eulerian Mean diagnostics from zonal-mean flux files"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Compute and write TEM diagnostics for a batch of experiments.
    Run(RunArgs),
}

/// Arguments for the `run` subcommand.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "tem.toml")]
    pub config: PathBuf,

    /// Process only this experiment (repeatable). Overrides the config list.
    #[arg(short, long = "experiment")]
    pub experiments: Vec<String>,

    /// Override the input directory from config.
    #[arg(short, long)]
    pub input_dir: Option<PathBuf>,

    /// Override the output directory from config.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
}
