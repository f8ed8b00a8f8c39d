//! CLI configuration: thin wrapper around `holemon_config`.
//!
//! Loads the shared config and lays `GlobalOpts` flag overrides on top
//! (--host, --api-key, etc.) before validation.

use holemon_config::Config;
use holemon_core::MonitorConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// File + environment config with flag overrides applied.
pub fn effective_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let mut config = holemon_config::load_config()?;
    apply_overrides(&mut config, global);
    Ok(config)
}

/// Validated runtime config for a `Monitor`.
pub fn build_monitor_config(global: &GlobalOpts) -> Result<MonitorConfig, CliError> {
    let config = effective_config(global)?;
    Ok(holemon_config::to_monitor_config(&config)?)
}

/// Flags win over file and environment values.
pub fn apply_overrides(config: &mut Config, global: &GlobalOpts) {
    if let Some(ref host) = global.host {
        config.host = Some(host.clone());
    }
    if let Some(port) = global.port {
        config.port = port;
    }
    if let Some(ref key) = global.api_key {
        config.api_key = Some(key.clone());
        config.api_key_env = None;
    }
    if let Some(timeout) = global.timeout {
        config.timeout = timeout;
    }
    if let Some(kind) = global.transport {
        config.transport = kind;
    }
    config.https |= global.https;
    config.insecure |= global.insecure;
}
