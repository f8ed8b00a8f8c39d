use thiserror::Error;

/// Top-level error type for the `holemon-api` crate.
///
/// Every failure a single logical API call can end in. Higher layers
/// (`holemon-core`) propagate these unchanged; the CLI maps them into
/// user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Configuration ───────────────────────────────────────────────
    /// Missing host, port, or API key, or an unusable base URL.
    /// Raised before any network traffic.
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// Connection could not be established, broke mid-request, or the
    /// per-call deadline elapsed. Never retried by this crate.
    #[error("Cannot connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    // ── Authentication ──────────────────────────────────────────────
    /// The `/api/auth` exchange failed or returned no session id.
    #[error("Authentication failed: {message}")]
    Auth { message: String },

    /// Every attempt of a call was answered with 401/403.
    #[error("Authentication exhausted after {attempts} attempts")]
    AuthExhausted { attempts: u32 },

    // ── HTTP ────────────────────────────────────────────────────────
    /// Any other non-200 status.
    #[error("Unexpected HTTP status {code}")]
    HttpStatus { code: u16 },

    // ── Data ────────────────────────────────────────────────────────
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Body decoding failures. Both are terminal for the current request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Malformed chunk-size line, truncated chunk, or missing terminator.
    #[error("Malformed chunked body: {reason}")]
    ChunkFraming { reason: String },

    /// Bytes were framed correctly but are not valid JSON.
    #[error("JSON parse error: {message}")]
    JsonParse { message: String },
}

/// Stable, data-free classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    Config,
    Connect,
    Auth,
    AuthExhausted,
    HttpStatus,
    ChunkFraming,
    JsonParse,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config { .. } => ErrorKind::Config,
            Self::Connect { .. } => ErrorKind::Connect,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::AuthExhausted { .. } => ErrorKind::AuthExhausted,
            Self::HttpStatus { .. } => ErrorKind::HttpStatus,
            Self::Decode(DecodeError::ChunkFraming { .. }) => ErrorKind::ChunkFraming,
            Self::Decode(DecodeError::JsonParse { .. }) => ErrorKind::JsonParse,
        }
    }

    pub(crate) fn connect(url: impl ToString, reason: impl ToString) -> Self {
        Self::Connect {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Only the origin of the request URL is kept; the query carries the
/// session id.
impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let url = err
            .url()
            .map_or_else(|| "<unknown>".into(), |u| u.origin().ascii_serialization());
        Self::Connect {
            url,
            reason: err.without_url().to_string(),
        }
    }
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Self::Config {
            message: format!("invalid URL: {err}"),
        }
    }
}
