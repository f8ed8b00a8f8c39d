//! Top blocked clients command handler.

use tabled::Tabled;

use holemon_core::{Monitor, TopBlockedClients};

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

#[derive(Tabled)]
struct ClientRow {
    #[tabled(rename = "#")]
    rank: usize,
    #[tabled(rename = "Client")]
    address: String,
    #[tabled(rename = "Blocked")]
    count: u64,
}

fn rows(top: &TopBlockedClients) -> Vec<ClientRow> {
    top.filled()
        .enumerate()
        .map(|(i, c)| ClientRow {
            rank: i + 1,
            address: c.address.clone(),
            count: c.count,
        })
        .collect()
}

pub async fn handle(monitor: &Monitor, global: &GlobalOpts) -> Result<(), CliError> {
    let top = monitor.fetch_top_blocked_clients().await?;
    let out = output::render(global.output, &*top, rows)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
