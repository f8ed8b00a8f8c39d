use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::error::Error;

/// Path of the session endpoint (`POST` to log in, `DELETE` to log out).
pub const AUTH_PATH: &str = "/api/auth";

/// Connection credentials for a Pi-hole server.
///
/// Immutable after construction. Every field is validated up front so an
/// unusable configuration fails with [`Error::Config`] before any request
/// is made. The API key is the web interface password or an app password.
#[derive(Debug, Clone)]
pub struct Credentials {
    host: String,
    port: u16,
    api_key: SecretString,
    base_url: Url,
}

impl Credentials {
    /// Plain-HTTP credentials (`http://{host}:{port}`).
    pub fn new(host: &str, port: u16, api_key: SecretString) -> Result<Self, Error> {
        Self::build(host, port, api_key, false)
    }

    /// Credentials for a server behind TLS (`https://{host}:{port}`).
    pub fn new_https(host: &str, port: u16, api_key: SecretString) -> Result<Self, Error> {
        Self::build(host, port, api_key, true)
    }

    fn build(host: &str, port: u16, api_key: SecretString, https: bool) -> Result<Self, Error> {
        let host = host.trim();
        if host.is_empty() {
            return Err(Error::Config {
                message: "host is required".into(),
            });
        }
        if port == 0 {
            return Err(Error::Config {
                message: "port is required".into(),
            });
        }
        if api_key.expose_secret().is_empty() {
            return Err(Error::Config {
                message: "API key is required to query summary data".into(),
            });
        }

        let scheme = if https { "https" } else { "http" };
        let base_url = Url::parse(&format!("{scheme}://{host}:{port}/"))?;

        Ok(Self {
            host: host.to_owned(),
            port,
            api_key,
            base_url,
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub(crate) fn api_key(&self) -> &SecretString {
        &self.api_key
    }

    /// Server root, always with a trailing slash.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}
