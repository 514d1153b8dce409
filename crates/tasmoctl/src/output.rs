//! Output formatting: table, JSON, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! JSON uses serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::{Table, Tabled, settings::Style};

use tasmo_core::{Device, DeviceGroup};

use crate::cli::{ColorMode, OutputFormat};

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

/// Group and device names are stored snake_case; show them as words.
pub fn display_name(raw: &str) -> String {
    raw.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars.next().map_or_else(String::new, |first| {
                first.to_uppercase().chain(chars).collect()
            })
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Colored rendering of a power reading. `None` means unreachable.
pub fn power_label(power: Option<bool>, color: bool) -> String {
    match (power, color) {
        (Some(true), true) => "ON".green().bold().to_string(),
        (Some(true), false) => "ON".into(),
        (Some(false), true) => "OFF".dimmed().to_string(),
        (Some(false), false) => "OFF".into(),
        (None, true) => "unreachable".yellow().to_string(),
        (None, false) => "unreachable".into(),
    }
}

// ── Listing types ────────────────────────────────────────────────────

/// One registry row, serializable for `--output json`.
#[derive(Debug, Serialize)]
pub struct DeviceListing {
    pub group: String,
    pub name: String,
    pub address: String,
}

impl DeviceListing {
    pub fn new(group: &DeviceGroup, device: &Device) -> Self {
        Self {
            group: group.name.clone(),
            name: device.name.clone(),
            address: device.address.clone(),
        }
    }
}

#[derive(Tabled)]
pub struct DeviceRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
}

impl From<&DeviceListing> for DeviceRow {
    fn from(l: &DeviceListing) -> Self {
        Self {
            group: display_name(&l.group),
            name: l.name.clone(),
            address: l.address.clone(),
        }
    }
}

/// A registry row plus its live power reading.
#[derive(Debug, Serialize)]
pub struct StatusListing {
    pub group: String,
    pub name: String,
    pub address: String,
    /// `None` when the device could not be read.
    pub power: Option<bool>,
}

#[derive(Tabled)]
pub struct StatusRow {
    #[tabled(rename = "Group")]
    group: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Power")]
    power: String,
}

impl StatusRow {
    pub fn new(l: &StatusListing, color: bool) -> Self {
        Self {
            group: display_name(&l.group),
            name: l.name.clone(),
            address: l.address.clone(),
            power: power_label(l.power, color),
        }
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of items in the chosen format.
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> String
where
    T: Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            render_table(&rows)
        }
        OutputFormat::Json => render_json(data),
        OutputFormat::Plain => data.iter().map(&id_fn).collect::<Vec<_>>().join("\n"),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: Serialize + ?Sized>(data: &T) -> String {
    serde_json::to_string_pretty(data).expect("serialization should not fail")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn display_name_splits_and_capitalizes() {
        assert_eq!(display_name("living_room"), "Living Room");
        assert_eq!(display_name("garage"), "Garage");
        assert_eq!(display_name("guest_bed_room"), "Guest Bed Room");
    }

    #[test]
    fn display_name_tolerates_odd_input() {
        assert_eq!(display_name(""), "");
        assert_eq!(display_name("__x__"), "X");
    }

    #[test]
    fn power_label_without_color_is_plain() {
        assert_eq!(power_label(Some(true), false), "ON");
        assert_eq!(power_label(Some(false), false), "OFF");
        assert_eq!(power_label(None, false), "unreachable");
    }
}
