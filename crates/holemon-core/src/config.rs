// ── Runtime monitor configuration ──
//
// Describes which server to poll and how. Carries credentials and
// transport tuning but never touches disk; `holemon-config` builds one from
// files and the environment.

use std::time::Duration;

use holemon_api::{Credentials, TransportConfig};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub credentials: Credentials,
    pub transport: TransportConfig,
    /// Delay between refreshes when polling continuously.
    pub poll_interval: Duration,
}

impl MonitorConfig {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials,
            transport: TransportConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}
