// holemon-api: Async Rust client for the Pi-hole v6 REST API
//
// Session-id authentication with reactive re-login on 401/403, plain and
// chunked body decoding, and a pluggable single-exchange transport.

pub mod auth;
pub mod client;
pub mod decoder;
pub mod error;
pub mod info;
pub mod retry;
pub mod session;
pub mod stats;
pub mod transport;

pub use auth::Credentials;
pub use client::ApiClient;
pub use error::{DecodeError, Error, ErrorKind};
pub use retry::{AuthRetryPolicy, Decision};
pub use session::{SessionManager, SessionState};
pub use transport::{
    Http1Transport, HttpTransport, RawResponse, ReqwestTransport, TlsMode, Transport,
    TransportConfig, TransportKind,
};
