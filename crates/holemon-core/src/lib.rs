//! Aggregation layer between `holemon-api` and its consumers.
//!
//! - **[`Monitor`]**: owns one authenticated [`ApiClient`] and the last
//!   good value of each fetched view. A failed refresh leaves the previous
//!   value readable.
//! - **[`convert`]**: maps the server's loosely-typed JSON into the
//!   [`model`] types, filling defaults for anything missing.
//! - **[`model`]**: [`SummaryRecord`], [`TopBlockedClients`] (three ranked
//!   slots) and [`HistoryBuffer`] (144 counts with a high-water mark).

pub mod config;
pub mod convert;
pub mod model;
pub mod monitor;

pub use config::MonitorConfig;
pub use model::{
    BlockedClient, BlockingStatus, HISTORY_CAPACITY, HistoryBuffer, SummaryRecord,
    TOP_CLIENT_SLOTS, TopBlockedClients,
};
pub use monitor::{Monitor, RefreshReport, View};

pub use holemon_api::{ApiClient, Credentials, Error, ErrorKind, TransportConfig, TransportKind};
