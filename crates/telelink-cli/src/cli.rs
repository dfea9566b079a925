//! CLI command definitions and argument parsing.

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};

/// Telelink CLI - Chains, change points, relocations and links from interaction records.
#[derive(Debug, Parser)]
#[command(name = "telelink")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<CliFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Configuration file path
    #[arg(short, long, global = true, env = "TELELINK_CONFIG")]
    pub config: Option<String>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum CliFormat {
    /// Table format (default)
    Table,
    /// JSON format
    Json,
    /// Quiet format (keys only)
    Quiet,
}

/// CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interaction chains between pairs of parties
    Chains(ChainsArgs),

    /// Attribute change points (device ↔ SIM history)
    Changes(ChangesArgs),

    /// Which companion values each subject used
    Companions(CompanionsArgs),

    /// A subject's dominant locations
    Locations(LocationsArgs),

    /// Contacts kept and gained after a move
    Relocation(RelocationArgs),

    /// Directed link graph
    Links(LinksArgs),

    /// Frequent contact pairs
    Frequent(FrequentArgs),

    /// Manage the configuration file
    Config(ConfigArgs),
}

/// Event input shared by every command.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// JSON array of events ("-" for stdin)
    #[arg(short, long)]
    pub input: String,
}

/// Arguments for the chains command.
#[derive(Debug, Args)]
pub struct ChainsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Restrict to the pair of these two parties
    #[arg(short, long, num_args = 2, value_names = ["A", "B"])]
    pub pair: Option<Vec<String>>,

    /// Override the gap threshold (minutes)
    #[arg(long)]
    pub max_gap_mins: Option<i64>,

    /// Override the minimum chain length
    #[arg(long)]
    pub min_length: Option<usize>,
}

/// Arguments for the changes command.
#[derive(Debug, Args)]
pub struct ChangesArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only this subject
    #[arg(short, long)]
    pub subject: Option<String>,
}

/// Arguments for the companions command.
#[derive(Debug, Args)]
pub struct CompanionsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Key by attribute value instead of subject (SIM → devices)
    #[arg(short, long)]
    pub reverse: bool,
}

/// Arguments for the locations command.
#[derive(Debug, Args)]
pub struct LocationsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Subject to rank locations for
    #[arg(short, long)]
    pub subject: String,

    /// How many locations to list (defaults to the configured home count)
    #[arg(short, long)]
    pub top: Option<usize>,
}

/// Arguments for the relocation command.
#[derive(Debug, Args)]
pub struct RelocationArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Subject that moved
    #[arg(short, long)]
    pub subject: String,

    /// New location key; detected automatically when omitted
    #[arg(long, requires = "at")]
    pub to: Option<String>,

    /// Shift timestamp (RFC 3339)
    #[arg(long, requires = "to")]
    pub at: Option<DateTime<Utc>>,
}

/// Arguments for the links command.
#[derive(Debug, Args)]
pub struct LinksArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Suppress a node (sentinel/system account) from the output
    #[arg(short = 'x', long)]
    pub exclude: Vec<String>,
}

/// Arguments for the frequent command.
#[derive(Debug, Args)]
pub struct FrequentArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Only counterparts of this subject
    #[arg(short, long)]
    pub subject: Option<String>,

    /// Override the minimum interaction count
    #[arg(short, long)]
    pub min: Option<usize>,

    /// Maximum number of results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Suppress a node (sentinel/system account) before ranking
    #[arg(short = 'x', long)]
    pub exclude: Vec<String>,
}

/// Arguments for configuration management.
#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Write a configuration file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show,
}

impl From<CliFormat> for crate::config::OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Table => crate::config::OutputFormat::Table,
            CliFormat::Json => crate::config::OutputFormat::Json,
            CliFormat::Quiet => crate::config::OutputFormat::Quiet,
        }
    }
}
