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
    author = "MIM++ Developers",
    version,
    about = "MIM++ CLI - Many-body expansion of molecular energies, gradients and higher derivatives.",
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

    /// Upper bound on concurrently computed fragments.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute a whole-system derivative from fragment calculations.
    Run(RunArgs),
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the input geometry in XYZ format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to the configuration file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Write the accumulated derivative to a CSV file.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Override the derivative order (0 = energy, 1 = gradient, 2 = Hessian, ...).
    #[arg(long, value_name = "INT")]
    pub order: Option<usize>,

    /// Override the fragmentation policy (e.g. 'atomic@2', 'bonded').
    #[arg(short, long, value_name = "KEY")]
    pub fragmentizer: Option<String>,

    /// Run a many-body expansion truncated at this order instead of explicit weights.
    #[arg(short = 't', long, value_name = "INT")]
    pub truncation: Option<usize>,

    /// Set a specific configuration value, overriding the config file and flags.
    /// Can be used multiple times. Example: -S basis-sets=argon
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
