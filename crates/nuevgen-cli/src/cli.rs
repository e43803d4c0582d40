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
    author = "nuevgen developers",
    version,
    about = "nuevgen CLI - Inspect and validate neutrino event-generation setups: flux samplers, fiducial cuts and geometry scans.",
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
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a generator configuration: resolve flux files, parse the DSLs and build the flux sampler.
    Check(CheckArgs),
    /// Draw neutrinos from the configured flux sampler and print them.
    Flux(FluxArgs),
    /// Parse a fiducial-cut string and print the resulting volume description.
    Fiducial(FiducialArgs),
}

/// Where the generator configuration comes from, shared by every command that needs one.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// Path to the generator configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Override the flux type (mono, ntuple, simple_flux, histogram, atmo_FLUKA, atmo_BARTOL).
    #[arg(short = 't', long, value_name = "TYPE")]
    pub flux_type: Option<String>,

    /// Override the generated flavors, as PDG codes or names (e.g. 14,-14 or numu,numubar).
    #[arg(short = 'f', long, value_name = "FLAVORS", value_delimiter = ',')]
    pub flavors: Vec<String>,

    /// Override the random seed.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Add a directory to the flux file search path. Can be used multiple times.
    #[arg(short = 'I', long = "search-dir", value_name = "DIR")]
    pub search_dirs: Vec<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S flux.mono-energy=3.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `check` subcommand.
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub config: ConfigArgs,
}

/// Arguments for the `flux` subcommand.
#[derive(Args, Debug)]
pub struct FluxArgs {
    #[command(flatten)]
    pub config: ConfigArgs,

    /// Number of neutrinos to draw.
    #[arg(short = 'n', long, value_name = "INT", default_value_t = 10)]
    pub count: u64,
}

/// Arguments for the `fiducial` subcommand.
#[derive(Args, Debug)]
pub struct FiducialArgs {
    /// The fiducial cut, e.g. 'box:0,0,0.25,1,1,8.75' or '0mzcyl:0,0,150,-200,200'.
    #[arg(required = true, value_name = "CUT")]
    pub cut: String,
}
