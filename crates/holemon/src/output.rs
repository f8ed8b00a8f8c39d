//! Output formatting: table or JSON.
//!
//! Renders data in the format selected by `--output`. Tables use `tabled`,
//! JSON serializes the model types directly.

use std::io::{self, IsTerminal, Write};

use owo_colors::OwoColorize;
use tabled::{Table, Tabled, settings::Style};

use holemon_core::BlockingStatus;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

// ── Color helpers ────────────────────────────────────────────────────

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

/// "Blocking" in green, "Disabled" in red.
pub fn status_label(status: BlockingStatus, color: bool) -> String {
    let label: &'static str = status.into();
    match (color, status) {
        (false, _) => label.to_owned(),
        (true, BlockingStatus::Blocking) => label.green().bold().to_string(),
        (true, BlockingStatus::Disabled) => label.red().bold().to_string(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render `data` as a table built from `to_rows`, or as JSON.
pub fn render<T, R>(
    format: OutputFormat,
    data: &T,
    to_rows: impl FnOnce(&T) -> Vec<R>,
) -> Result<String, CliError>
where
    T: serde::Serialize + ?Sized,
    R: Tabled,
{
    match format {
        OutputFormat::Table => Ok(render_table(&to_rows(data))),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
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

pub(crate) fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(
    data: &T,
    compact: bool,
) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(rendered)
}

/// One block character per bucket, scaled to `high`. Buckets are merged
/// (keeping their maximum) so the line is at most `width` characters.
pub fn sparkline(counts: &[u64], high: u64, width: usize) -> String {
    if counts.is_empty() || width == 0 {
        return String::new();
    }
    let per_column = counts.len().div_ceil(width);
    let top = u64::try_from(SPARK_LEVELS.len() - 1).unwrap_or(0);

    counts
        .chunks(per_column)
        .map(|bucket| {
            let peak = bucket.iter().copied().max().unwrap_or(0);
            let level = if high == 0 { 0 } else { peak.min(high) * top / high };
            usize::try_from(level)
                .ok()
                .and_then(|i| SPARK_LEVELS.get(i))
                .copied()
                .unwrap_or(SPARK_LEVELS[0])
        })
        .collect()
}
