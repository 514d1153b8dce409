//! Clap derive structures for the `tasmoctl` CLI.
//!
//! Defines the command tree, global flags, and shared enums.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tasmoctl -- registry and power control for Tasmota smart plugs
#[derive(Debug, Parser)]
#[command(
    name = "tasmoctl",
    version,
    about = "Manage Tasmota smart plugs from the command line",
    long_about = "A registry and power controller for Tasmota devices on the local network.\n\n\
        Devices are kept in a JSON registry grouped by room; power state is\n\
        queried and toggled over each device's HTTP command interface.",
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
    /// Registry document path (overrides config)
    #[arg(long, short = 'r', env = "TASMO_REGISTRY", global = true)]
    pub registry: Option<PathBuf>,

    /// Request timeout in seconds
    #[arg(long, env = "TASMO_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "TASMO_OUTPUT",
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

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
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

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List registered devices
    #[command(alias = "ls")]
    List,

    /// Register a device in a group
    Add {
        /// Device name
        name: String,
        /// Device address (host or host:port)
        address: String,
        /// Group to add the device to (created if missing)
        #[arg(long, short = 'g')]
        group: String,
    },

    /// Change a registered device's name, address, or group
    Edit {
        /// Current device name
        name: String,
        /// Group the device is in
        #[arg(long, short = 'g')]
        group: String,
        /// New device name
        #[arg(long)]
        new_name: Option<String>,
        /// New device address
        #[arg(long)]
        new_address: Option<String>,
        /// Move the device to this group
        #[arg(long)]
        new_group: Option<String>,
    },

    /// Remove a device from the registry
    #[command(alias = "rm")]
    Delete {
        /// Device name
        name: String,
        /// Group the device is in
        #[arg(long, short = 'g')]
        group: String,
    },

    /// Query live power state of one device or the whole registry
    Status {
        /// Device name (omit for all devices)
        name: Option<String>,
        /// Restrict to one group
        #[arg(long, short = 'g')]
        group: Option<String>,
    },

    /// Toggle a device's power relay
    Toggle {
        /// Device name
        name: String,
        /// Restrict the lookup to one group
        #[arg(long, short = 'g')]
        group: Option<String>,
    },

    /// Replace the registry from a JSON document (file or stdin)
    Import {
        /// Document path; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Write the registry document (to a file or stdout)
    Export {
        /// Destination path; writes stdout when omitted
        file: Option<PathBuf>,
    },

    /// Continuously poll all devices and stream state changes
    Watch {
        /// Poll cadence in seconds (overrides config)
        #[arg(long)]
        interval: Option<u64>,
    },

    /// Print a device's web UI address
    Web {
        /// Device name
        name: String,
        /// Restrict the lookup to one group
        #[arg(long, short = 'g')]
        group: Option<String>,
    },
}
