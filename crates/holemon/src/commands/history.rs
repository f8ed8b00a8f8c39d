//! History command handler.

use tabled::Tabled;

use holemon_core::{HistoryBuffer, Monitor};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

/// Columns in the sparkline (two 10-minute buckets each).
const SPARK_WIDTH: usize = 72;

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Buckets")]
    buckets: String,
    #[tabled(rename = "Peak")]
    high: u64,
    #[tabled(rename = "Blocked (24h)")]
    total: u64,
    #[tabled(rename = "Activity")]
    spark: String,
}

fn rows(history: &HistoryBuffer) -> Vec<HistoryRow> {
    vec![HistoryRow {
        buckets: format!("{}/{}", history.len(), history.capacity()),
        high: history.high(),
        total: history.counts().iter().fold(0, |acc, c| acc.saturating_add(*c)),
        spark: output::sparkline(history.counts(), history.high(), SPARK_WIDTH),
    }]
}

pub async fn handle(monitor: &Monitor, global: &GlobalOpts) -> Result<(), CliError> {
    let history = monitor.refresh_history().await?;
    let out = output::render(global.output, &*history, rows)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
