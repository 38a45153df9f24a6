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
    author = "The thermocal developers",
    version,
    about = "thermocal - heat-capacity curves and probing-guided pseudo-energy calibration for RNA sequences.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output and progress display except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S heat.step=0.5
    #[arg(
        short = 'S',
        long = "set",
        global = true,
        value_name = "KEY=VALUE",
        num_args(0..)
    )]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the specific heat curve of a sequence over a temperature range.
    Heat(HeatArgs),
    /// Find the perturbation vector that reconciles predicted and probed pairing states.
    Pvmin(PvminArgs),
}

/// Folding model options shared by all subcommands.
#[derive(Args, Debug, Default, Clone)]
pub struct ModelArgs {
    /// Dangle model: 0 (none) or 2 (double dangles). Other values fall back to 2.
    #[arg(short, long, value_name = "INT")]
    pub dangles: Option<i64>,

    /// Forbid structures containing isolated base pairs.
    #[arg(long = "no-lp")]
    pub no_lp: bool,

    /// Forbid GU pairs.
    #[arg(long)]
    pub no_gu: bool,

    /// Forbid GU pairs closing a hairpin or multiloop.
    #[arg(long)]
    pub no_closing_gu: bool,

    /// Do not apply the special tetraloop bonus energies.
    #[arg(long)]
    pub no_tetra: bool,

    /// Energy parameter set selector. Only 0 is supported.
    #[arg(short = 'e', long, value_name = "INT")]
    pub energy_model: Option<u8>,

    /// Read energy parameters from a TOML file instead of the built-in set.
    #[arg(short = 'P', long = "params", value_name = "PATH")]
    pub parameter_file: Option<PathBuf>,

    /// Keep DNA 'T' symbols in the output instead of converting them to 'U'.
    #[arg(long)]
    pub no_conversion: bool,
}

/// Arguments for the `heat` subcommand.
#[derive(Args, Debug, Default)]
pub struct HeatArgs {
    /// Input sequence. Read from standard input when omitted.
    #[arg(short = 'i', long, value_name = "SEQUENCE")]
    pub sequence: Option<String>,

    /// Lowest temperature in °C.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub tmin: Option<f64>,

    /// Highest temperature in °C.
    #[arg(long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub tmax: Option<f64>,

    /// Temperature increment in °C.
    #[arg(long, value_name = "FLOAT")]
    pub step: Option<f64>,

    /// Half-width of the fitting window (1-100).
    #[arg(short = 'm', long, value_name = "INT")]
    pub ipoints: Option<usize>,

    #[command(flatten)]
    pub model: ModelArgs,
}

/// Arguments for the `pvmin` subcommand.
#[derive(Args, Debug, Default)]
pub struct PvminArgs {
    /// Probing reactivity file: `<position> [<nucleotide>] <reactivity>` lines, or a CSV file.
    #[arg(required = true, value_name = "PROBING_FILE")]
    pub probing_file: PathBuf,

    /// Input sequence. Read from standard input when omitted.
    #[arg(short = 'i', long, value_name = "SEQUENCE")]
    pub sequence: Option<String>,

    /// Folding temperature in °C.
    #[arg(short = 'T', long, value_name = "FLOAT", allow_negative_numbers = true)]
    pub temp: Option<f64>,

    /// Weight of the objective-specific penalty on the vector.
    #[arg(long, value_name = "FLOAT")]
    pub sigma: Option<f64>,

    /// Weight of the squared-norm penalty on the vector.
    #[arg(long, value_name = "FLOAT")]
    pub tau: Option<f64>,

    /// Objective function: 0 (quadratic) or 1 (absolute). Other values fall back to 0.
    #[arg(long, value_name = "INT")]
    pub objective: Option<i64>,

    /// Number of sampled structures per evaluation; 0 computes exact probabilities.
    #[arg(long, value_name = "INT")]
    pub sample_size: Option<usize>,

    /// Reactivities below this value are treated as paired.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Factor applied to the minimum free energy when scaling partition sums.
    #[arg(long, value_name = "FLOAT")]
    pub pf_scale: Option<f64>,

    /// Write the vector of every iteration to `<PREFIX>_<iteration>`.
    #[arg(long, value_name = "PREFIX")]
    pub intermediate_path: Option<PathBuf>,

    /// Seed for the structure sampler.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Hard cap on descent iterations.
    #[arg(long, value_name = "INT")]
    pub max_iterations: Option<usize>,

    #[command(flatten)]
    pub model: ModelArgs,
}
