//! Watch command: refresh everything on a fixed interval until Ctrl-C.
//!
//! Failures never end the loop. The last good values stay on screen and
//! the failed views are flagged as stale until a later refresh succeeds.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use holemon_core::{HistoryBuffer, Monitor, RefreshReport, SummaryRecord, TopBlockedClients};

use crate::cli::{GlobalOpts, OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output;

/// Everything known after one refresh, for JSON output.
#[derive(Serialize)]
struct Snapshot {
    refreshed_at: DateTime<Utc>,
    summary: Option<Arc<SummaryRecord>>,
    top_clients: Arc<TopBlockedClients>,
    history: Arc<HistoryBuffer>,
    errors: Vec<String>,
    last_error: Option<Arc<String>>,
}

impl Snapshot {
    fn capture(monitor: &Monitor, report: &RefreshReport) -> Self {
        Self {
            refreshed_at: Utc::now(),
            summary: monitor.summary(),
            top_clients: monitor.top_clients(),
            history: monitor.history(),
            errors: report
                .errors()
                .map(|(view, err)| format!("{view}: {err}"))
                .collect(),
            last_error: monitor.last_error(),
        }
    }
}

fn status_line(monitor: &Monitor, report: &RefreshReport, color: bool) -> String {
    let mut parts = vec![format!("[{}]", Local::now().format("%H:%M:%S"))];

    match monitor.summary() {
        Some(s) => {
            parts.push(output::status_label(s.status, color));
            parts.push(format!("queries {}", s.dns_queries_today));
            parts.push(format!(
                "blocked {} ({}%)",
                s.ads_blocked_today, s.ads_percentage_today
            ));
            parts.push(format!("clients {}", s.unique_clients));
        }
        None => parts.push("no summary yet".into()),
    }

    let top = monitor.top_clients();
    if let Some(first) = top.filled().next() {
        parts.push(format!("top {} ({})", first.address, first.count));
    }
    parts.push(format!("peak {}", monitor.history().high()));

    if !report.is_ok() {
        let failed: Vec<&str> = report.errors().map(|(view, _)| view.into()).collect();
        let stale = format!("stale: {}", failed.join(", "));
        parts.push(if color {
            stale.yellow().to_string()
        } else {
            stale
        });
    }
    parts.join("  ")
}

pub async fn handle(
    monitor: &Monitor,
    args: WatchArgs,
    poll_interval: Duration,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let period = args.interval.map_or(poll_interval, Duration::from_secs);
    let color = output::should_color(global.color);

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut session = monitor.client().session().subscribe();

    info!(interval_secs = period.as_secs(), "watching");
    let mut refreshes: u64 = 0;
    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = &mut shutdown => {
                info!("interrupted");
                break;
            }
        }

        let report = monitor.refresh_all().await;
        if session.has_changed().unwrap_or(false) {
            info!(state = %*session.borrow_and_update(), "session state changed");
        }
        for (view, err) in report.errors() {
            warn!(%view, error = %err, "refresh failed");
        }

        let out = match global.output {
            OutputFormat::Table => status_line(monitor, &report, color),
            format => output::render_json(
                &Snapshot::capture(monitor, &report),
                format == OutputFormat::JsonCompact,
            )?,
        };
        output::print_output(&out, global.quiet);

        refreshes += 1;
        if args.count.is_some_and(|n| refreshes >= n) {
            break;
        }
    }
    Ok(())
}
