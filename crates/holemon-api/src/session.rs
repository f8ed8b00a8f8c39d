// Session lifecycle
//
// Sole owner of the server-issued session id. Callers only ever see
// `acquire` (cached id, or log in) and `invalidate` (forget it). Expiry is
// discovered reactively by the executor via 401/403; there is no TTL.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use secrecy::ExposeSecret;
use serde_json::{Value, json};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

use crate::auth::{AUTH_PATH, Credentials};
use crate::decoder;
use crate::error::Error;
use crate::transport::HttpTransport;

/// Session state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Publishes `Authenticating` while alive and `Unauthenticated` on drop,
/// unless the login completed.
struct PendingLogin<'a> {
    state: &'a watch::Sender<SessionState>,
    done: bool,
}

impl<'a> PendingLogin<'a> {
    fn start(state: &'a watch::Sender<SessionState>) -> Self {
        state.send_replace(SessionState::Authenticating);
        Self { state, done: false }
    }

    fn complete(mut self) {
        self.done = true;
        self.state.send_replace(SessionState::Authenticated);
    }
}

impl Drop for PendingLogin<'_> {
    fn drop(&mut self) {
        if !self.done {
            self.state.send_replace(SessionState::Unauthenticated);
        }
    }
}

/// Owns the session id for one server.
///
/// The id sits behind a `tokio::sync::Mutex` that is held for the whole
/// login exchange, so concurrent callers wait for one login instead of
/// each starting their own. Data requests never hold the lock.
pub struct SessionManager<T> {
    transport: Arc<T>,
    credentials: Credentials,
    sid: Mutex<Option<String>>,
    state: watch::Sender<SessionState>,
    logins: AtomicU64,
}

impl<T: HttpTransport> SessionManager<T> {
    pub fn new(transport: Arc<T>, credentials: Credentials) -> Self {
        let (state, _) = watch::channel(SessionState::Unauthenticated);
        Self {
            transport,
            credentials,
            sid: Mutex::new(None),
            state,
            logins: AtomicU64::new(0),
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Number of login exchanges attempted so far (successful or not).
    pub fn login_count(&self) -> u64 {
        self.logins.load(Ordering::Relaxed)
    }

    /// Return the cached session id, logging in first if there is none.
    ///
    /// On failure the cache stays empty, so the next call logs in again.
    pub async fn acquire(&self) -> Result<String, Error> {
        let mut sid = self.sid.lock().await;
        if let Some(id) = sid.as_deref().filter(|id| !id.is_empty()) {
            return Ok(id.to_owned());
        }

        // Resets to Unauthenticated if the login fails or is cancelled.
        *sid = None;
        let pending = PendingLogin::start(&self.state);
        let id = self.login().await?;
        *sid = Some(id.clone());
        pending.complete();
        Ok(id)
    }

    /// Forget the cached session id unconditionally.
    pub async fn invalidate(&self) {
        *self.sid.lock().await = None;
        self.state.send_replace(SessionState::Unauthenticated);
        debug!("session invalidated");
    }

    /// End the session server-side (best effort), then forget it locally.
    ///
    /// `DELETE /api/auth?sid=...`. The local id is dropped even if the
    /// server could not be reached.
    pub async fn logout(&self) -> Result<(), Error> {
        let mut sid = self.sid.lock().await;
        let Some(id) = sid.take() else {
            return Ok(());
        };
        self.state.send_replace(SessionState::Unauthenticated);

        let mut url = self.credentials.base_url().join(AUTH_PATH)?;
        url.query_pairs_mut().append_pair("sid", &id);
        let resp = self.transport.delete(&url).await?;
        if (200..300).contains(&resp.status) {
            debug!("logged out");
        } else {
            warn!(status = resp.status, "logout was not acknowledged");
        }
        Ok(())
    }

    /// `POST /api/auth` with the API key; the id is at `session.sid`.
    async fn login(&self) -> Result<String, Error> {
        self.logins.fetch_add(1, Ordering::Relaxed);
        let url = self.credentials.base_url().join(AUTH_PATH)?;
        debug!(%url, "authenticating");

        let body = json!({ "password": self.credentials.api_key().expose_secret() });
        let resp = self.transport.post_json(&url, &body).await?;

        if !(200..300).contains(&resp.status) {
            return Err(Error::Auth {
                message: format!("login rejected (HTTP {})", resp.status),
            });
        }

        let doc = decoder::decode(&resp.body, resp.chunked).map_err(|e| Error::Auth {
            message: format!("unreadable login response: {e}"),
        })?;
        let id = doc
            .pointer("/session/sid")
            .and_then(Value::as_str)
            .unwrap_or_default();
        if id.is_empty() {
            return Err(Error::Auth {
                message: "login response did not contain a session id".into(),
            });
        }

        info!(host = self.credentials.host(), "session established");
        Ok(id.to_owned())
    }
}
