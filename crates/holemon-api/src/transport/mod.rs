// Transport layer
//
// A transport performs exactly one HTTP exchange and hands back the status
// plus the still-encoded body. Session handling, retries and JSON decoding
// live above this seam so they can be exercised against any transport.

mod http1;

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;
use url::Url;

use crate::error::Error;

pub use http1::Http1Transport;

const USER_AGENT: &str = concat!("holemon/", env!("CARGO_PKG_VERSION"));

/// One HTTP response as the transport received it.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    /// `true` when `body` still carries chunked transfer framing.
    pub chunked: bool,
    pub body: Bytes,
}

/// A single-exchange HTTP capability.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &Url) -> impl Future<Output = Result<RawResponse, Error>> + Send;

    fn post_json(
        &self,
        url: &Url,
        body: &Value,
    ) -> impl Future<Output = Result<RawResponse, Error>> + Send;

    fn delete(&self, url: &Url) -> impl Future<Output = Result<RawResponse, Error>> + Send;
}

// ── Configuration ────────────────────────────────────────────────────

/// Which HTTP stack to talk to the server with.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TransportKind {
    /// `reqwest` (TLS capable). The HTTP stack removes chunk framing itself.
    #[default]
    Reqwest,
    /// Minimal plain-HTTP/1.1 client; chunked bodies reach the decoder as-is.
    Http1,
}

/// TLS verification mode for the reqwest transport.
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Use the system certificate store.
    #[default]
    System,
    /// Use a custom CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Accept any certificate (Pi-hole ships a self-signed one).
    DangerAcceptInvalid,
}

/// Shared transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub kind: TransportKind,
    pub tls: TlsMode,
    /// Per-exchange timeout, and the deadline for one logical API call.
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            kind: TransportKind::default(),
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Build the transport selected by `kind`.
    pub fn build(&self) -> Result<Transport, Error> {
        match self.kind {
            TransportKind::Reqwest => self.build_reqwest().map(Transport::Reqwest),
            TransportKind::Http1 => Ok(Transport::Http1(Http1Transport::new(self.timeout))),
        }
    }

    fn build_reqwest(&self) -> Result<ReqwestTransport, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(USER_AGENT);

        match &self.tls {
            TlsMode::System => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path).map_err(|e| Error::Config {
                    message: format!("failed to read CA cert {}: {e}", path.display()),
                })?;
                let cert = reqwest::Certificate::from_pem(&cert_pem).map_err(|e| Error::Config {
                    message: format!("invalid CA cert: {e}"),
                })?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::DangerAcceptInvalid => {
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        let http = builder.build().map_err(|e| Error::Config {
            message: format!("failed to build HTTP client: {e}"),
        })?;
        Ok(ReqwestTransport::with_client(http))
    }
}

// ── Transport selection ──────────────────────────────────────────────

/// Runtime-selected transport.
#[derive(Debug, Clone)]
pub enum Transport {
    Reqwest(ReqwestTransport),
    Http1(Http1Transport),
}

impl HttpTransport for Transport {
    async fn get(&self, url: &Url) -> Result<RawResponse, Error> {
        match self {
            Self::Reqwest(t) => t.get(url).await,
            Self::Http1(t) => t.get(url).await,
        }
    }

    async fn post_json(&self, url: &Url, body: &Value) -> Result<RawResponse, Error> {
        match self {
            Self::Reqwest(t) => t.post_json(url, body).await,
            Self::Http1(t) => t.post_json(url, body).await,
        }
    }

    async fn delete(&self, url: &Url) -> Result<RawResponse, Error> {
        match self {
            Self::Reqwest(t) => t.delete(url).await,
            Self::Http1(t) => t.delete(url).await,
        }
    }
}

// ── reqwest ──────────────────────────────────────────────────────────

/// Transport backed by `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Wrap a pre-built client (tests, or callers with their own TLS setup).
    pub fn with_client(http: reqwest::Client) -> Self {
        Self { http }
    }

    async fn into_raw(resp: reqwest::Response) -> Result<RawResponse, Error> {
        let status = resp.status().as_u16();
        let body = resp.bytes().await?;
        trace!(status, bytes = body.len(), "response received");
        Ok(RawResponse {
            status,
            chunked: false,
            body,
        })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &Url) -> Result<RawResponse, Error> {
        let resp = self.http.get(url.clone()).send().await?;
        Self::into_raw(resp).await
    }

    async fn post_json(&self, url: &Url, body: &Value) -> Result<RawResponse, Error> {
        let resp = self.http.post(url.clone()).json(body).send().await?;
        Self::into_raw(resp).await
    }

    async fn delete(&self, url: &Url) -> Result<RawResponse, Error> {
        let resp = self.http.delete(url.clone()).send().await?;
        Self::into_raw(resp).await
    }
}
