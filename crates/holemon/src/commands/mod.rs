//! Command dispatch: bridges CLI args -> `Monitor` fetches -> output formatting.

pub mod config_cmd;
pub mod history;
pub mod summary;
pub mod top_clients;
pub mod watch;

use std::time::Duration;

use holemon_core::Monitor;

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a server-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    monitor: &Monitor,
    poll_interval: Duration,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Summary => summary::handle(monitor, global).await,
        Command::TopClients => top_clients::handle(monitor, global).await,
        Command::History => history::handle(monitor, global).await,
        Command::Watch(args) => watch::handle(monitor, args, poll_interval, global).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => unreachable!(),
    }
}
