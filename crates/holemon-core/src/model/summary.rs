// ── Summary record ──

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Blocking state reported by the login probe.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, strum::Display, strum::IntoStaticStr,
)]
pub enum BlockingStatus {
    Blocking,
    #[default]
    Disabled,
}

/// One aggregate snapshot of the server's counters.
///
/// Values are kept as display strings: counts render as integers, the
/// blocked percentage is pre-rounded to one decimal. Fields absent from the
/// server response hold `"0"` (counts) or `""` (text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryRecord {
    pub domains_being_blocked: String,
    pub dns_queries_today: String,
    pub ads_blocked_today: String,
    pub ads_percentage_today: String,
    pub unique_domains: String,
    pub queries_forwarded: String,
    pub queries_cached: String,
    pub clients_ever_seen: String,
    pub unique_clients: String,
    pub dns_queries_all_types: String,
    pub reply_nodata: String,
    pub reply_nxdomain: String,
    pub reply_cname: String,
    pub reply_ip: String,
    pub privacy_level: String,
    pub status: BlockingStatus,
    pub fetched_at: DateTime<Utc>,
}

impl SummaryRecord {
    /// `(label, value)` pairs of the text counters in field order, for
    /// tabular display. `status` is typed and not included.
    pub fn fields(&self) -> [(&'static str, &str); 15] {
        [
            ("Domains on blocklist", self.domains_being_blocked.as_str()),
            ("DNS queries today", self.dns_queries_today.as_str()),
            ("Blocked today", self.ads_blocked_today.as_str()),
            ("Blocked %", self.ads_percentage_today.as_str()),
            ("Unique domains", self.unique_domains.as_str()),
            ("Queries forwarded", self.queries_forwarded.as_str()),
            ("Queries cached", self.queries_cached.as_str()),
            ("Clients ever seen", self.clients_ever_seen.as_str()),
            ("Active clients", self.unique_clients.as_str()),
            ("Queries (all types)", self.dns_queries_all_types.as_str()),
            ("NODATA replies", self.reply_nodata.as_str()),
            ("NXDOMAIN replies", self.reply_nxdomain.as_str()),
            ("CNAME replies", self.reply_cname.as_str()),
            ("IP replies", self.reply_ip.as_str()),
            ("Privacy level", self.privacy_level.as_str()),
        ]
    }
}
