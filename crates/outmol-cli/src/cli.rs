use clap::{Args, Parser, Subcommand};
use outmol::core::units::EnergyUnit;
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
    about = "outmol CLI - Extracts per-step energies, geometries, forces and orbital levels from DMol3 geometry-optimization logs.",
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

    /// Set the number of threads used to parse files in parallel.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover .outmol logs under a directory and extract every optimization step.
    Extract(ExtractArgs),
    /// Convert a previously extracted JSON corpus into a CSV table.
    Table(TableArgs),
}

/// Arguments for the `extract` subcommand.
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory that is searched recursively for logs.
    #[arg(required = true, value_name = "ROOT")]
    pub root: PathBuf,

    /// Output stem; writes <STEM>_paths.txt, <STEM>.json and optionally <STEM>.csv.
    /// Defaults to the name of the root directory.
    #[arg(short, long, value_name = "STEM")]
    pub output: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Extraction Overrides ---
    /// Unit for extracted energies ('ev' or 'hartree').
    #[arg(short, long, value_name = "UNIT")]
    pub unit: Option<EnergyUnit>,

    /// Fractional digits every extracted number is rounded to (at most 17).
    #[arg(short, long, value_name = "INT")]
    pub precision: Option<usize>,

    /// Read coordinates only; skip the derivative columns of the geometry block.
    #[arg(long)]
    pub no_forces: bool,

    /// Skip the orbital energy tables.
    #[arg(long)]
    pub no_orbitals: bool,

    // --- Discovery Overrides ---
    /// File extension of the logs. An empty value accepts any extension.
    #[arg(long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Required prefix of the directory containing each log. An empty value accepts any directory.
    #[arg(long = "dir-prefix", value_name = "PREFIX")]
    pub directory_prefix: Option<String>,

    // --- Output Overrides ---
    /// Also write the one-row-per-step CSV table.
    #[arg(long)]
    pub csv: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S extraction.precision=6
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `table` subcommand.
#[derive(Args, Debug)]
pub struct TableArgs {
    /// JSON corpus written by `outmol extract`.
    #[arg(required = true, value_name = "CORPUS_JSON")]
    pub input: PathBuf,

    /// Path of the CSV table. Defaults to the input path with a .csv extension.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
