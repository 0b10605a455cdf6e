use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "spinopt contributors",
    version,
    about = "spinopt CLI - Energy minimization of classical spin configurations exported by UppASD, comparing momentum-adaptive, plain-gradient and quasi-Newton optimizers.",
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

    /// Set the number of threads for parallel optimizer runs.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Minimize the energy of the final UppASD snapshot with one or more optimizers.
    Minimize(MinimizeArgs),
    /// Parse an UppASD run and print a summary of its interactions and moments.
    Inspect(InspectArgs),
}

/// Where to find the UppASD output of one simulation.
#[derive(Args, Debug, Clone, Default)]
pub struct DatasetArgs {
    /// Simulation identifier used in UppASD file names (e.g. moment.<SIMID>.out).
    #[arg(long, value_name = "ID")]
    pub simid: Option<String>,

    /// Directory holding jfile, dmfile and the <name>.<SIMID>.out files.
    #[arg(short, long = "input-dir", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Number of atoms per moment snapshot. Inferred from the interaction tables when omitted.
    #[arg(long, value_name = "INT")]
    pub n_atoms: Option<usize>,
}

/// Arguments for the `minimize` subcommand.
#[derive(Args, Debug)]
pub struct MinimizeArgs {
    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub dataset: DatasetArgs,

    /// Directory for energy logs and final spin tables. Created if missing.
    #[arg(short, long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    // --- Optimization Overrides ---
    /// Optimizer to run (adam, sgd, lbfgs). Repeat or separate with commas to run several.
    #[arg(long = "optimizer", value_name = "NAME", value_delimiter = ',')]
    pub optimizers: Vec<String>,

    /// Override the learning rate.
    #[arg(short = 'r', long, value_name = "FLOAT")]
    pub learning_rate: Option<f64>,

    /// Override the number of optimizer steps.
    #[arg(short = 'n', long, value_name = "INT")]
    pub steps: Option<usize>,

    /// Run the selected optimizers concurrently on the thread pool.
    #[arg(long)]
    pub parallel: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S optimization.steps=1000
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to a configuration file in TOML format; only its `[input]` table is used.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub dataset: DatasetArgs,
}
