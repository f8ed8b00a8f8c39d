//! CLI error types with miette diagnostics.
//!
//! Maps `holemon_api::Error` and `ConfigError` into user-facing errors with
//! actionable help text and distinct exit codes.

use miette::Diagnostic;
use thiserror::Error;

use holemon_config::ConfigError;
use holemon_core::Error as ApiError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach Pi-hole at {url}")]
    #[diagnostic(
        code(holemon::connection_failed),
        help(
            "{reason}\n\
             Check that the server is running and reachable, or raise --timeout."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(holemon::auth_failed),
        help(
            "Verify the API key (web interface password or an app password).\n\
             Set it with --api-key, HOLEMON_API_KEY, or api_key / api_key_env in config.toml."
        )
    )]
    AuthFailed { message: String },

    #[error("Server rejected {attempts} fresh sessions in a row")]
    #[diagnostic(
        code(holemon::auth_exhausted),
        help(
            "The login succeeds but data requests stay unauthorized.\n\
             Check the API key permissions and the server's session limit."
        )
    )]
    AuthExhausted { attempts: u32 },

    // ── Server responses ─────────────────────────────────────────────
    #[error("Unexpected HTTP status {code}")]
    #[diagnostic(code(holemon::http_status))]
    HttpStatus { code: u16 },

    #[error("Unreadable response: {message}")]
    #[diagnostic(
        code(holemon::decode),
        help("The server answered with malformed data. Try --transport reqwest.")
    )]
    Decode { message: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("No API key configured")]
    #[diagnostic(
        code(holemon::no_credentials),
        help(
            "Pass --api-key, set HOLEMON_API_KEY, or add api_key / api_key_env to\n\
             {path}"
        )
    )]
    NoCredentials { path: String },

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(holemon::validation))]
    Validation { field: String, reason: String },

    #[error(transparent)]
    #[diagnostic(code(holemon::config))]
    Config(Box<figment::Error>),

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize output: {0}")]
    #[diagnostic(code(holemon::json))]
    Json(#[from] serde_json::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::AuthExhausted { .. } => exit_code::AUTH,
            Self::NoCredentials { .. } | Self::Validation { .. } | Self::Config(_) => {
                exit_code::USAGE
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── Library error → CliError mapping ─────────────────────────────────

impl From<ApiError> for CliError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Config { message } => CliError::Validation {
                field: "connection".into(),
                reason: message,
            },
            ApiError::Connect { url, reason } => CliError::ConnectionFailed { url, reason },
            ApiError::Auth { message } => CliError::AuthFailed { message },
            ApiError::AuthExhausted { attempts } => CliError::AuthExhausted { attempts },
            ApiError::HttpStatus { code } => CliError::HttpStatus { code },
            ApiError::Decode(e) => CliError::Decode {
                message: e.to_string(),
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::NoCredentials => CliError::NoCredentials {
                path: holemon_config::config_path().display().to_string(),
            },
            ConfigError::Figment(e) => CliError::Config(e),
            ConfigError::Api(e) => e.into(),
        }
    }
}
