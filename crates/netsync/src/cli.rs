//! Clap derive structures for the `netsync` CLI.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// netsync -- converge NetBox with what the switches report
#[derive(Debug, Parser)]
#[command(
    name = "netsync",
    version,
    about = "Keep a NetBox inventory in sync with Cisco switch facts",
    long_about = "Reconciles NetBox devices, interfaces, addresses, VLANs, inventory\n\
        items, optics and CDP cabling with fact bundles collected from\n\
        IOS, IOS-XE and NX-OS switches.",
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
    /// Config profile to use
    #[arg(long, short = 'p', env = "NETSYNC_PROFILE", global = true)]
    pub profile: Option<String>,

    /// NetBox URL (overrides profile)
    #[arg(long, short = 'u', env = "NETSYNC_URL", global = true)]
    pub netbox_url: Option<String>,

    /// NetBox API token
    #[arg(long, env = "NETSYNC_TOKEN", global = true, hide_env = true)]
    pub token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "NETSYNC_OUTPUT",
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

    /// Log line format
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "NETSYNC_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "NETSYNC_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines
    Text,
    /// One JSON object per event
    Json,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Reconcile switches against NetBox
    #[command(alias = "sync")]
    Reconcile(ReconcileArgs),

    /// List the switches a reconcile run would visit
    Targets,

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Reconcile ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    /// Directory holding one `<device>.json` fact bundle per switch
    #[arg(long, short = 'f', env = "NETSYNC_FACTS_DIR")]
    pub facts_dir: Option<PathBuf>,

    /// Only reconcile these devices (repeatable)
    #[arg(long, short = 'd', value_name = "NAME")]
    pub device: Vec<String>,

    /// Collect and validate facts without writing to NetBox
    #[arg(long, short = 'n')]
    pub dry_run: bool,

    /// Seed for role colors (reproducible runs)
    #[arg(long, hide = true)]
    pub color_seed: Option<u64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current configuration (secrets masked)
    Show,

    /// Create a config file with one profile
    Init {
        /// NetBox base URL
        #[arg(long)]
        url: String,

        /// Store this API token in the system keyring
        #[arg(long)]
        token: Option<String>,

        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
