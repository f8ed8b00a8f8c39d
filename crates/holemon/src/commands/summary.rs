//! Summary command handler.

use tabled::Tabled;

use holemon_core::{Monitor, SummaryRecord};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct FieldRow {
    #[tabled(rename = "Field")]
    field: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn rows(record: &SummaryRecord, color: bool) -> Vec<FieldRow> {
    let mut rows: Vec<FieldRow> = record
        .fields()
        .into_iter()
        .map(|(field, value)| FieldRow {
            field,
            value: value.to_owned(),
        })
        .collect();
    rows.push(FieldRow {
        field: "Status",
        value: output::status_label(record.status, color),
    });
    rows
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(monitor: &Monitor, global: &GlobalOpts) -> Result<(), CliError> {
    let record = monitor.fetch_summary().await?;
    let color = output::should_color(global.color);
    let out = output::render(global.output, &*record, |r| rows(r, color))?;
    output::print_output(&out, global.quiet);
    Ok(())
}
