//! Clap derive structures for the `holemon` CLI.
//!
//! Defines the command tree, global flags, and shared types.

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use holemon_core::TransportKind;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// holemon -- poll a Pi-hole server for blocking statistics
#[derive(Debug, Parser)]
#[command(
    name = "holemon",
    version,
    about = "Monitor Pi-hole blocking statistics from the command line",
    long_about = "Polls a Pi-hole v6 server over its REST API: summary counters,\n\
        the top blocked clients, and the 24-hour blocked-query history.\n\n\
        Settings come from config.toml, HOLEMON_* environment variables,\n\
        and the flags below, in increasing order of precedence.",
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

#[derive(Debug, Default, Args)]
pub struct GlobalOpts {
    /// Pi-hole hostname or IP address (overrides config)
    #[arg(long, short = 'H', global = true)]
    pub host: Option<String>,

    /// Web server port
    #[arg(long, short = 'P', global = true)]
    pub port: Option<u16>,

    /// API key or app password
    #[arg(long, global = true)]
    pub api_key: Option<String>,

    /// Connect over HTTPS
    #[arg(long, global = true)]
    pub https: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,

    /// Per-call timeout in seconds, re-login included
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// HTTP stack: reqwest or http1
    #[arg(long, global = true, value_parser = parse_transport)]
    pub transport: Option<TransportKind>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "HOLEMON_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

fn parse_transport(raw: &str) -> Result<TransportKind, String> {
    raw.parse()
        .map_err(|_| format!("expected 'reqwest' or 'http1', got '{raw}'"))
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON (one line per refresh in watch mode)
    JsonCompact,
}

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    #[default]
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show summary counters and blocking status
    #[command(alias = "s")]
    Summary,

    /// Show the top three blocked clients
    #[command(alias = "top")]
    TopClients,

    /// Show the blocked-query history (last 24 hours)
    #[command(alias = "hist")]
    History,

    /// Refresh everything on a fixed interval until interrupted
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Inspect the configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between refreshes (overrides poll_interval)
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Stop after this many refreshes
    #[arg(long, short = 'c', value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,
    /// Print the effective configuration (API key redacted)
    Show,
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
