//! Clap derive structures for the `phoenixbad` CLI.
//!
//! Also compiled by `build.rs` for man page generation, so this module may
//! only depend on clap, clap_complete and humantime.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// phoenixbad -- live visitor counts for the Phoenix-Bad pool and sauna
#[derive(Debug, Parser)]
#[command(
    name = "phoenixbad",
    version,
    about = "Live occupancy of the Phoenix-Bad pool and sauna",
    long_about = "Polls the Phoenix-Bad live visitor endpoints and reports free \
        places, occupied places and occupancy percentage per area.\n\n\
        Understands all three response formats the endpoints have served: a \
        bare visitor count, the legacy span markup and the current \
        percentage-bar widget.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "PHOENIXBAD_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Pool endpoint URL (overrides config)
    #[arg(long, env = "PHOENIXBAD_POOL_URL", global = true)]
    pub pool_url: Option<String>,

    /// Sauna endpoint URL (overrides config)
    #[arg(long, env = "PHOENIXBAD_SAUNA_URL", global = true)]
    pub sauna_url: Option<String>,

    /// Per-request timeout, e.g. "10s" (overrides config)
    #[arg(long, env = "PHOENIXBAD_TIMEOUT", value_parser = humantime::parse_duration, global = true)]
    pub timeout: Option<Duration>,

    /// Output format (defaults to config, then "table")
    #[arg(long, short = 'o', env = "PHOENIXBAD_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one area per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

/// Area selector for commands that act on a subset of areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AreaArg {
    Pool,
    Sauna,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll every area once and print the result
    #[command(alias = "f")]
    Fetch(FetchArgs),

    /// Poll on a schedule and print every cycle until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Parse a saved response body offline
    Parse(ParseArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Fetch / Watch ────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Only poll these areas (repeatable)
    #[arg(long, short = 'a', value_enum)]
    pub area: Vec<AreaArg>,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Only poll these areas (repeatable)
    #[arg(long, short = 'a', value_enum)]
    pub area: Vec<AreaArg>,

    /// Time between polls, e.g. "15m" (clamped to 5m..24h)
    #[arg(long, short = 'i', value_parser = humantime::parse_duration)]
    pub interval: Option<Duration>,

    /// Stop after this many cycles (at least 1)
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u64).range(1..))]
    pub cycles: Option<u64>,
}

// ── Parse ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ParseArgs {
    /// Response body file ("-" reads stdin)
    pub file: PathBuf,

    /// Area label used in error messages and output
    #[arg(long, short = 'a', value_enum, default_value = "pool")]
    pub area: AreaArg,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the resolved configuration (file + environment)
    Show,

    /// Print the config file path
    Path,

    /// Write a config file with default settings
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
