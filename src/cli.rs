use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Gridcast station-to-grid distribution.
#[derive(Parser)]
#[command(
    name = "gridcast",
    version,
    about = "Distribute station measurements onto a DEM grid"
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
    /// Validate the configuration and initialise every variable.
    Check(CheckArgs),
    /// Distribute every step of every variable and write JSON output.
    Run(RunArgs),
}

/// Arguments for the `check` subcommand.
#[derive(clap::Args)]
pub struct CheckArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "gridcast.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(clap::Args)]
pub struct RunArgs {
    /// Path to TOML configuration file.
    #[arg(short, long, default_value = "gridcast.toml")]
    pub config: PathBuf,

    /// Override output JSON path from config.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
