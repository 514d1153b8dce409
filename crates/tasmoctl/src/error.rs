//! CLI error types with miette diagnostics.

use miette::Diagnostic;
use thiserror::Error;

use tasmo_core::DocumentError;

/// Exit codes.
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Lookup ───────────────────────────────────────────────────────
    #[error("Device '{name}' not found{}", scope_suffix(.group.as_deref()))]
    #[diagnostic(
        code(tasmoctl::device_not_found),
        help("Run: tasmoctl list to see registered devices")
    )]
    DeviceNotFound { name: String, group: Option<String> },

    #[error("Group '{name}' not found")]
    #[diagnostic(
        code(tasmoctl::group_not_found),
        help("Run: tasmoctl list to see registered groups")
    )]
    GroupNotFound { name: String },

    // ── Device communication ─────────────────────────────────────────
    #[error("Device '{name}' at {address} is unreachable")]
    #[diagnostic(
        code(tasmoctl::unreachable),
        help(
            "Check that the plug is powered and on the network.\n\
             Its web UI should answer at http://{address}/"
        )
    )]
    DeviceUnreachable { name: String, address: String },

    #[error("Toggle was not delivered to '{name}' at {address}")]
    #[diagnostic(
        code(tasmoctl::toggle_failed),
        help("The device did not accept the command; its state is unchanged.")
    )]
    ToggleFailed { name: String, address: String },

    #[error("Invalid address: {address}")]
    #[diagnostic(code(tasmoctl::bad_address))]
    InvalidAddress { address: String },

    // ── Documents ────────────────────────────────────────────────────
    #[error("Invalid registry document")]
    #[diagnostic(
        code(tasmoctl::invalid_document),
        help(
            "The document must map group names to objects of device name -> address:\n\
             {{\"living_room\": {{\"lamp\": \"192.168.1.50\"}}}}"
        )
    )]
    InvalidDocument(#[from] DocumentError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tasmoctl::validation))]
    Validation { field: String, reason: String },

    // ── Interactive ──────────────────────────────────────────────────
    #[error("'{action}' requires confirmation")]
    #[diagnostic(
        code(tasmoctl::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / HTTP ────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to build HTTP client")]
    #[diagnostic(code(tasmoctl::http))]
    Http(#[from] tasmo_api::Error),
}

fn scope_suffix(group: Option<&str>) -> String {
    group.map_or_else(String::new, |g| format!(" in group '{g}'"))
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::DeviceNotFound { .. } | Self::GroupNotFound { .. } => exit_code::NOT_FOUND,
            Self::DeviceUnreachable { .. } | Self::ToggleFailed { .. } => exit_code::CONNECTION,
            Self::Validation { .. }
            | Self::InvalidDocument(_)
            | Self::InvalidAddress { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            Self::Io(_) | Self::Http(_) => exit_code::GENERAL,
        }
    }
}
