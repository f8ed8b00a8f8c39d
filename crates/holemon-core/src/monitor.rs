// ── Monitor facade ──
//
// Owns one `ApiClient` and the last good value of everything it fetches.
// A failed refresh returns its error and leaves the previous value in
// place, so readers always see the most recent complete snapshot.

use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use chrono::Utc;
use tracing::{debug, warn};

use holemon_api::{ApiClient, Error, HttpTransport, Transport};

use crate::config::MonitorConfig;
use crate::convert;
use crate::model::{
    BlockingStatus, HistoryBuffer, SummaryRecord, TOP_CLIENT_SLOTS, TopBlockedClients,
};

/// One of the three things a [`Monitor`] keeps fresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
pub enum View {
    #[strum(serialize = "summary")]
    Summary,
    #[strum(serialize = "top clients")]
    TopClients,
    #[strum(serialize = "history")]
    History,
}

/// Per-target outcome of [`Monitor::refresh_all`].
#[derive(Debug)]
pub struct RefreshReport {
    pub summary: Result<(), Error>,
    pub top_clients: Result<(), Error>,
    pub history: Result<(), Error>,
}

impl RefreshReport {
    pub fn is_ok(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Failed targets with their errors.
    pub fn errors(&self) -> impl Iterator<Item = (View, &Error)> {
        [
            (View::Summary, &self.summary),
            (View::TopClients, &self.top_clients),
            (View::History, &self.history),
        ]
        .into_iter()
        .filter_map(|(view, result)| result.as_ref().err().map(|e| (view, e)))
    }
}

/// Polling facade over one Pi-hole server.
///
/// Each fetch is one awaited call; scheduling is left to the caller.
/// Snapshots are read without locking.
pub struct Monitor<T = Transport> {
    client: ApiClient<T>,
    summary: ArcSwapOption<SummaryRecord>,
    top_clients: ArcSwap<TopBlockedClients>,
    history: ArcSwap<HistoryBuffer>,
    /// Outstanding failures, oldest first, at most one per view.
    errors: ArcSwap<Vec<(View, Arc<String>)>>,
}

impl Monitor<Transport> {
    pub fn new(config: &MonitorConfig) -> Result<Self, Error> {
        let client = ApiClient::new(config.credentials.clone(), &config.transport)?;
        Ok(Self::with_client(client))
    }
}

impl<T: HttpTransport> Monitor<T> {
    pub fn with_client(client: ApiClient<T>) -> Self {
        Self {
            client,
            summary: ArcSwapOption::empty(),
            top_clients: ArcSwap::from_pointee(TopBlockedClients::default()),
            history: ArcSwap::from_pointee(HistoryBuffer::default()),
            errors: ArcSwap::from_pointee(Vec::new()),
        }
    }

    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    // ── Snapshots ────────────────────────────────────────────────────

    /// Last good summary, `None` until the first successful fetch.
    pub fn summary(&self) -> Option<Arc<SummaryRecord>> {
        self.summary.load_full()
    }

    pub fn top_clients(&self) -> Arc<TopBlockedClients> {
        self.top_clients.load_full()
    }

    pub fn history(&self) -> Arc<HistoryBuffer> {
        self.history.load_full()
    }

    /// Message of the most recent failure whose view has not succeeded
    /// since.
    pub fn last_error(&self) -> Option<Arc<String>> {
        self.errors.load().last().map(|(_, msg)| Arc::clone(msg))
    }

    /// Outstanding failure of one view, cleared by that view's next success.
    pub fn error_for(&self, view: View) -> Option<Arc<String>> {
        self.errors
            .load()
            .iter()
            .find(|(v, _)| *v == view)
            .map(|(_, msg)| Arc::clone(msg))
    }

    // ── Fetches ──────────────────────────────────────────────────────

    /// Fetch the summary counters and the blocking status, and replace the
    /// stored record.
    pub async fn fetch_summary(&self) -> Result<Arc<SummaryRecord>, Error> {
        let result = async {
            let doc = self.client.get_summary().await?;
            let status = self.fetch_blocking_status().await?;
            Ok::<_, Error>(convert::summary_from_json(&doc, status, Utc::now()))
        }
        .await;

        let record = Arc::new(self.track(View::Summary, result)?);
        self.summary.store(Some(Arc::clone(&record)));
        debug!(status = %record.status, "summary refreshed");
        Ok(record)
    }

    /// Probe whether blocking is currently enabled.
    pub async fn fetch_blocking_status(&self) -> Result<BlockingStatus, Error> {
        let probe = self.client.get_login_info().await?;
        Ok(convert::blocking_status(&probe))
    }

    /// Fetch the top blocked clients and replace the stored slots.
    pub async fn fetch_top_blocked_clients(&self) -> Result<Arc<TopBlockedClients>, Error> {
        let result = self
            .client
            .get_top_clients(true, TOP_CLIENT_SLOTS)
            .await
            .map(|doc| convert::top_clients_from_json(&doc));

        let top = Arc::new(self.track(View::TopClients, result)?);
        self.top_clients.store(Arc::clone(&top));
        debug!(filled = top.filled().count(), "top clients refreshed");
        Ok(top)
    }

    /// Fetch the activity history and replace the stored buffer.
    pub async fn refresh_history(&self) -> Result<Arc<HistoryBuffer>, Error> {
        let result = self
            .client
            .get_history()
            .await
            .map(|doc| convert::history_from_json(&doc));

        let history = Arc::new(self.track(View::History, result)?);
        self.history.store(Arc::clone(&history));
        debug!(len = history.len(), high = history.high(), "history refreshed");
        Ok(history)
    }

    /// Run every fetch in sequence. One failure does not stop the others.
    pub async fn refresh_all(&self) -> RefreshReport {
        RefreshReport {
            summary: self.fetch_summary().await.map(drop),
            top_clients: self.fetch_top_blocked_clients().await.map(drop),
            history: self.refresh_history().await.map(drop),
        }
    }

    fn track<V>(&self, view: View, result: Result<V, Error>) -> Result<V, Error> {
        let failure = match &result {
            Ok(_) => None,
            Err(err) => {
                warn!(%view, kind = %err.kind(), error = %err, "refresh failed, keeping previous data");
                Some(Arc::new(err.to_string()))
            }
        };
        self.errors.rcu(|errors| {
            let mut next: Vec<_> = errors.iter().filter(|(v, _)| *v != view).cloned().collect();
            if let Some(msg) = &failure {
                next.push((view, Arc::clone(msg)));
            }
            next
        });
        result
    }
}
