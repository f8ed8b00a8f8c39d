//! Configuration for holemon.
//!
//! A flat TOML file plus `HOLEMON_*` environment variables, credential
//! resolution (env var or plaintext), and translation to
//! `holemon_core::MonitorConfig`. The CLI layers its flags on top.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use holemon_api::{Credentials, TlsMode, TransportConfig, TransportKind};
use holemon_core::MonitorConfig;

/// Environment variable prefix for every setting.
pub const ENV_PREFIX: &str = "HOLEMON_";

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "HOLEMON_CONFIG";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no API key configured")]
    NoCredentials,

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error(transparent)]
    Api(#[from] holemon_api::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config ─────────────────────────────────────────────────────

/// Settings for one Pi-hole server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Hostname or IP address of the server.
    pub host: Option<String>,

    #[serde(default = "default_port")]
    pub port: u16,

    /// API key / app password (plaintext; prefer `api_key_env`).
    pub api_key: Option<String>,

    /// Name of an environment variable holding the API key.
    pub api_key_env: Option<String>,

    /// Seconds allowed for one API call, re-login included.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default)]
    pub transport: TransportKind,

    /// Seconds between refreshes in `watch` mode.
    #[serde(default = "default_poll_interval")]
    pub poll_interval: u64,

    /// Talk HTTPS instead of plain HTTP.
    #[serde(default)]
    pub https: bool,

    /// Accept invalid TLS certificates.
    #[serde(default)]
    pub insecure: bool,

    /// Path to a custom CA certificate (PEM).
    pub ca_cert: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: None,
            port: default_port(),
            api_key: None,
            api_key_env: None,
            timeout: default_timeout(),
            transport: TransportKind::default(),
            poll_interval: default_poll_interval(),
            https: false,
            insecure: false,
            ca_cert: None,
        }
    }
}

fn default_port() -> u16 {
    80
}
fn default_timeout() -> u64 {
    30
}
fn default_poll_interval() -> u64 {
    60
}

// ── Config file path ────────────────────────────────────────────────

/// `$HOLEMON_CONFIG`, else the platform config dir.
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    ProjectDirs::from("", "", "holemon").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("holemon");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load defaults, then the config file, then `HOLEMON_*` variables.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// As [`load_config`], reading the file at `path`. A missing file is not
/// an error.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).ignore(&["config"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the API key: the variable named by `api_key_env`, then the
/// plaintext `api_key`.
pub fn resolve_api_key(config: &Config) -> Result<SecretString, ConfigError> {
    if let Some(ref env_name) = config.api_key_env {
        if let Ok(val) = std::env::var(env_name) {
            if !val.is_empty() {
                return Ok(SecretString::from(val));
            }
        }
    }

    if let Some(ref key) = config.api_key {
        if !key.is_empty() {
            return Ok(SecretString::from(key.clone()));
        }
    }

    Err(ConfigError::NoCredentials)
}

/// Validate `config` and build a [`MonitorConfig`].
pub fn to_monitor_config(config: &Config) -> Result<MonitorConfig, ConfigError> {
    let host = config
        .host
        .as_deref()
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ConfigError::Validation {
            field: "host".into(),
            reason: "not set".into(),
        })?;
    if config.timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least 1 second".into(),
        });
    }
    if config.poll_interval == 0 {
        return Err(ConfigError::Validation {
            field: "poll_interval".into(),
            reason: "must be at least 1 second".into(),
        });
    }

    let api_key = resolve_api_key(config)?;
    let credentials = if config.https {
        Credentials::new_https(host, config.port, api_key)?
    } else {
        Credentials::new(host, config.port, api_key)?
    };

    let tls = if config.insecure {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = config.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    Ok(MonitorConfig {
        credentials,
        transport: TransportConfig {
            kind: config.transport,
            tls,
            timeout: Duration::from_secs(config.timeout),
        },
        poll_interval: Duration::from_secs(config.poll_interval),
    })
}
