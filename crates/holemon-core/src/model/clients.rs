// ── Top blocked clients ──

use serde::Serialize;

/// Number of ranked slots kept.
pub const TOP_CLIENT_SLOTS: usize = 3;

/// A client address and how many of its queries were blocked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockedClient {
    pub address: String,
    pub count: u64,
}

impl BlockedClient {
    pub fn is_empty(&self) -> bool {
        self.address.is_empty()
    }
}

/// Exactly [`TOP_CLIENT_SLOTS`] entries in server ranking order. Slots the
/// server did not fill hold an empty address and a zero count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopBlockedClients {
    slots: Vec<BlockedClient>,
}

impl Default for TopBlockedClients {
    fn default() -> Self {
        Self::from_ranked(std::iter::empty())
    }
}

impl TopBlockedClients {
    /// Keep the first [`TOP_CLIENT_SLOTS`] entries, padding with defaults.
    pub fn from_ranked(ranked: impl IntoIterator<Item = BlockedClient>) -> Self {
        let mut slots: Vec<BlockedClient> = ranked.into_iter().take(TOP_CLIENT_SLOTS).collect();
        slots.resize_with(TOP_CLIENT_SLOTS, BlockedClient::default);
        Self { slots }
    }

    pub fn slots(&self) -> &[BlockedClient] {
        &self.slots
    }

    pub fn get(&self, rank: usize) -> Option<&BlockedClient> {
        self.slots.get(rank)
    }

    /// Slots that carry a client, in rank order.
    pub fn filled(&self) -> impl Iterator<Item = &BlockedClient> {
        self.slots.iter().filter(|c| !c.is_empty())
    }
}
