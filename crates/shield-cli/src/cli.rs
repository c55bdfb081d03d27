use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "synchshield - drive synchrotron-radiation shielding studies: generate interaction-region lattices, run repeated stochastic trials, and tabulate attenuation statistics.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of worker threads for parallel trial execution.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a full thickness scan of one shielding material.
    Scan(ScanArgs),
    /// Generate the lattice description files for one scenario, without
    /// running any trials.
    Lattice(LatticeArgs),
}

/// The interaction-region lattice variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum VariantName {
    /// Simple IR: a single long dipole upstream of the barrier.
    Dipole,
    /// Optimised IR: half-quadrupole doublets around the central dipole.
    QuadsHalfQuads,
}

/// Arguments for the `scan` subcommand.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Path to the study configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    // --- Scenario overrides ---
    /// Override the shielding material from the config file.
    #[arg(short, long, value_name = "MATERIAL")]
    pub material: Option<String>,

    /// Override the run key used to tag lattice and output files.
    #[arg(long, value_name = "KEY")]
    pub run_key: Option<String>,

    /// Override the scanned barrier thicknesses, metres.
    /// Can be given multiple times.
    #[arg(short, long = "thickness", value_name = "METRES")]
    pub thicknesses: Vec<f64>,

    /// Override the number of primary particles generated per trial.
    #[arg(short = 'n', long, value_name = "INT")]
    pub events_per_run: Option<u32>,

    /// Override the number of independent trials per thickness.
    #[arg(short, long, value_name = "INT")]
    pub run_count: Option<usize>,

    /// Override the lattice variant.
    #[arg(long, value_enum, value_name = "VARIANT")]
    pub variant: Option<VariantName>,

    // --- Toolchain overrides ---
    /// Override the simulation engine executable.
    #[arg(long, value_name = "PATH")]
    pub engine_exe: Option<PathBuf>,

    /// Override the histogram reducer executable.
    #[arg(long, value_name = "PATH")]
    pub reducer_exe: Option<PathBuf>,

    /// Override the number of engine re-invocations allowed per trial.
    #[arg(long, value_name = "INT")]
    pub max_retries: Option<u32>,

    /// Override the output directory for the summary and buffer tables.
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

/// Arguments for the `lattice` subcommand.
#[derive(Args, Debug)]
pub struct LatticeArgs {
    /// Path to the study configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Barrier thickness to generate for; defaults to the first scanned
    /// thickness in the config file.
    #[arg(short, long, value_name = "METRES")]
    pub thickness: Option<f64>,

    /// Override the shielding material from the config file.
    #[arg(short, long, value_name = "MATERIAL")]
    pub material: Option<String>,

    /// Override the lattice variant.
    #[arg(long, value_enum, value_name = "VARIANT")]
    pub variant: Option<VariantName>,

    /// Directory to write the lattice files into.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub out_dir: PathBuf,
}
