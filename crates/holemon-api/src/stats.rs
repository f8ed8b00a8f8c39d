// Statistics endpoints
//
// Summary counters, top clients, and the activity history. These return
// loosely-typed JSON because the field set varies across server versions;
// `holemon-core` maps them into domain types.

use serde_json::Value;
use tracing::debug;

use crate::client::ApiClient;
use crate::error::Error;
use crate::transport::HttpTransport;

pub const SUMMARY_PATH: &str = "/api/stats/summary";
pub const TOP_CLIENTS_PATH: &str = "/api/stats/top_clients";
pub const HISTORY_PATH: &str = "/api/history";

impl<T: HttpTransport> ApiClient<T> {
    /// Fetch the aggregate query counters.
    ///
    /// `GET /api/stats/summary`
    pub async fn get_summary(&self) -> Result<Value, Error> {
        debug!("fetching summary");
        self.execute(SUMMARY_PATH, &[]).await
    }

    /// Fetch the clients with the most (blocked) queries, already ranked
    /// and limited by the server.
    ///
    /// `GET /api/stats/top_clients?blocked={blocked}&count={count}`
    pub async fn get_top_clients(&self, blocked: bool, count: usize) -> Result<Value, Error> {
        debug!(blocked, count, "fetching top clients");
        let blocked = if blocked { "true" } else { "false" };
        let count = count.to_string();
        self.execute(TOP_CLIENTS_PATH, &[("blocked", blocked), ("count", &count)])
            .await
    }

    /// Fetch the query activity time series (10-minute buckets over the
    /// last 24 hours). Large enough that servers usually send it chunked.
    ///
    /// `GET /api/history`
    pub async fn get_history(&self) -> Result<Value, Error> {
        debug!("fetching history");
        self.execute(HISTORY_PATH, &[]).await
    }
}
