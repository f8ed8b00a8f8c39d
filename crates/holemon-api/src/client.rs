// Authenticated request executor
//
// One logical GET = acquire session id, send, and on 401/403 drop the
// session, log in again and resend, as decided by `AuthRetryPolicy`.
// Transport failures are never retried here; the caller's next poll cycle
// is the retry.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::auth::Credentials;
use crate::decoder;
use crate::error::Error;
use crate::retry::{AuthRetryPolicy, Decision};
use crate::session::SessionManager;
use crate::transport::{HttpTransport, Transport, TransportConfig};

const DEFAULT_DEADLINE: Duration = Duration::from_secs(30);

/// HTTP client for the Pi-hole REST API.
///
/// Shares its session across every call made through it. Calls may run
/// concurrently; the session lock is only held while acquiring or
/// invalidating the id.
pub struct ApiClient<T = Transport> {
    transport: Arc<T>,
    session: SessionManager<T>,
    policy: AuthRetryPolicy,
    deadline: Duration,
    attempts: AtomicU64,
}

impl ApiClient<Transport> {
    /// Build a client with the transport described by `config`. The
    /// config timeout doubles as the per-call deadline.
    pub fn new(credentials: Credentials, config: &TransportConfig) -> Result<Self, Error> {
        let transport = config.build()?;
        Ok(Self::with_transport(transport, credentials).with_deadline(config.timeout))
    }
}

impl<T: HttpTransport> ApiClient<T> {
    pub fn with_transport(transport: T, credentials: Credentials) -> Self {
        let transport = Arc::new(transport);
        let session = SessionManager::new(Arc::clone(&transport), credentials);
        Self {
            transport,
            session,
            policy: AuthRetryPolicy::default(),
            deadline: DEFAULT_DEADLINE,
            attempts: AtomicU64::new(0),
        }
    }

    pub fn with_policy(mut self, policy: AuthRetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Upper bound on one logical call, re-authentication included.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    pub fn session(&self) -> &SessionManager<T> {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        self.session.credentials().base_url()
    }

    /// Total GET attempts sent by [`execute`](Self::execute), retries included.
    pub fn attempt_count(&self) -> u64 {
        self.attempts.load(Ordering::Relaxed)
    }

    // ── Requests ─────────────────────────────────────────────────────

    /// Authenticated GET of `path` (which may already carry a query),
    /// with `query` and the session id appended.
    pub async fn execute(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, Error> {
        tokio::time::timeout(self.deadline, self.execute_with_retry(path, query))
            .await
            .map_err(|_| self.deadline_elapsed())?
    }

    /// Unauthenticated GET of an arbitrary URL: no session, no retry.
    pub async fn fetch(&self, url: &Url) -> Result<Value, Error> {
        let request = async {
            debug!(%url, "GET (unauthenticated)");
            let resp = self.transport.get(url).await?;
            if resp.status != 200 {
                return Err(Error::HttpStatus { code: resp.status });
            }
            Ok(decoder::decode(&resp.body, resp.chunked)?)
        };
        tokio::time::timeout(self.deadline, request)
            .await
            .map_err(|_| self.deadline_elapsed())?
    }

    async fn execute_with_retry(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, Error> {
        let mut sid = self.session.acquire().await?;
        let mut attempt = 1;

        loop {
            let url = self.request_url(path, query, &sid)?;
            self.attempts.fetch_add(1, Ordering::Relaxed);
            let resp = self.transport.get(&url).await?;
            debug!(path, attempt, status = resp.status, "GET");

            match self.policy.decide(attempt, resp.status) {
                Decision::Accept => return Ok(decoder::decode(&resp.body, resp.chunked)?),
                Decision::Reauthenticate => {
                    warn!(path, attempt, status = resp.status, "session rejected, logging in again");
                    self.session.invalidate().await;
                    sid = self.session.acquire().await?;
                    attempt += 1;
                }
                Decision::Exhausted { attempts } => {
                    warn!(path, attempts, "giving up: every attempt was unauthorized");
                    return Err(Error::AuthExhausted { attempts });
                }
                Decision::Reject { code } => return Err(Error::HttpStatus { code }),
            }
        }
    }

    /// `{base}{path}` plus `query`, then `sid`, joined with `?` or `&`.
    pub fn request_url(&self, path: &str, query: &[(&str, &str)], sid: &str) -> Result<Url, Error> {
        let mut url = self.base_url().join(path)?;
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("sid", sid);
        }
        Ok(url)
    }

    fn deadline_elapsed(&self) -> Error {
        Error::Connect {
            url: self.base_url().to_string(),
            reason: format!("no response within {}s", self.deadline.as_secs_f32()),
        }
    }
}
