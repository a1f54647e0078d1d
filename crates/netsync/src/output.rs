//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use netsync_core::{DeviceOutcome, DeviceStatus, DeviceTarget};

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Determine whether color output should be enabled.
pub fn should_color(mode: &ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: &OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
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

// ── Rows ────────────────────────────────────────────────────────────

#[derive(Tabled)]
pub struct TargetRow {
    #[tabled(rename = "Device")]
    pub name: String,
    #[tabled(rename = "OS")]
    pub os: String,
    #[tabled(rename = "Host")]
    pub host: String,
}

impl TargetRow {
    pub fn new(t: &DeviceTarget) -> Self {
        Self {
            name: t.name.clone(),
            os: t.os.label().into(),
            host: t.host.map_or_else(|| "-".into(), |h| h.to_string()),
        }
    }
}

#[derive(Tabled)]
pub struct OutcomeRow {
    #[tabled(rename = "Device")]
    pub device: String,
    #[tabled(rename = "OS")]
    pub os: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Interfaces")]
    pub interfaces: usize,
    #[tabled(rename = "VLANs")]
    pub vlans: usize,
    #[tabled(rename = "Neighbors")]
    pub neighbors: String,
    #[tabled(rename = "Error")]
    pub error: String,
}

impl OutcomeRow {
    pub fn new(outcome: &DeviceOutcome, color: bool) -> Self {
        Self {
            device: outcome.device.clone(),
            os: outcome.os.label().into(),
            status: status_label(outcome.status, color),
            interfaces: outcome.interfaces,
            vlans: outcome.vlans,
            neighbors: if outcome.neighbors_skipped == 0 {
                outcome.neighbors_linked.to_string()
            } else {
                format!(
                    "{} ({} skipped)",
                    outcome.neighbors_linked, outcome.neighbors_skipped
                )
            },
            error: outcome.error.clone().unwrap_or_default(),
        }
    }
}

/// Status word, colored green/cyan/red when `color` is set.
pub fn status_label(status: DeviceStatus, color: bool) -> String {
    let word = match status {
        DeviceStatus::Synced => "synced",
        DeviceStatus::Checked => "checked",
        DeviceStatus::Failed => "failed",
    };
    if !color {
        return word.into();
    }
    match status {
        DeviceStatus::Synced => word.green().to_string(),
        DeviceStatus::Checked => word.cyan().to_string(),
        DeviceStatus::Failed => word.red().bold().to_string(),
    }
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

fn render_json<T: serde::Serialize + ?Sized>(data: &T, compact: bool) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)
    } else {
        serde_json::to_string_pretty(data)
    };
    rendered.map_err(|e| CliError::Render(e.to_string()))
}

fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    serde_yaml::to_string(data).map_err(|e| CliError::Render(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use netsync_core::OsFamily;

    use super::*;

    fn targets() -> Vec<DeviceTarget> {
        vec![
            DeviceTarget {
                name: "SW1".into(),
                host: Some(Ipv4Addr::new(10, 0, 0, 5)),
                os: OsFamily::Ios,
            },
            DeviceTarget {
                name: "NX1".into(),
                host: None,
                os: OsFamily::NxOs,
            },
        ]
    }

    #[test]
    fn plain_lists_names() {
        let out = render_list(&OutputFormat::Plain, &targets(), TargetRow::new, |t| {
            t.name.clone()
        })
        .unwrap();
        assert_eq!(out, "SW1\nNX1");
    }

    #[test]
    fn table_shows_host_placeholder() {
        let out = render_list(&OutputFormat::Table, &targets(), TargetRow::new, |t| {
            t.name.clone()
        })
        .unwrap();
        assert!(out.contains("10.0.0.5"));
        assert!(out.contains('-'));
        assert!(out.contains("NX-OS"));
    }

    #[test]
    fn status_without_color_is_plain() {
        assert_eq!(status_label(DeviceStatus::Failed, false), "failed");
        assert!(status_label(DeviceStatus::Failed, true).contains("\u{1b}["));
    }
}
