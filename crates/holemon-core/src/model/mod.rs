// ── Domain model ──
//
// What the monitor exposes to consumers. Each value is rebuilt wholesale
// from a server response; nothing here is merged incrementally.

pub mod clients;
pub mod history;
pub mod summary;

pub use clients::{BlockedClient, TOP_CLIENT_SLOTS, TopBlockedClients};
pub use history::{HISTORY_CAPACITY, HistoryBuffer};
pub use summary::{BlockingStatus, SummaryRecord};
