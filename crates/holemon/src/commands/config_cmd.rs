//! Config command handlers. Read-only: nothing here writes to disk.

use serde::Serialize;
use tabled::Tabled;

use holemon_config::Config;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;
use crate::{config, output};

/// Effective settings with the API key reduced to whether one is set.
#[derive(Serialize)]
struct ConfigView {
    path: String,
    host: Option<String>,
    port: u16,
    api_key: &'static str,
    api_key_env: Option<String>,
    timeout: u64,
    transport: String,
    poll_interval: u64,
    https: bool,
    insecure: bool,
}

impl ConfigView {
    fn new(cfg: &Config) -> Self {
        let key_set = cfg.api_key.as_deref().is_some_and(|k| !k.is_empty());
        Self {
            path: holemon_config::config_path().display().to_string(),
            host: cfg.host.clone(),
            port: cfg.port,
            api_key: if key_set { "(set)" } else { "(not set)" },
            api_key_env: cfg.api_key_env.clone(),
            timeout: cfg.timeout,
            transport: cfg.transport.to_string(),
            poll_interval: cfg.poll_interval,
            https: cfg.https,
            insecure: cfg.insecure,
        }
    }
}

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    key: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn row(key: &'static str, value: impl Into<String>) -> SettingRow {
    SettingRow {
        key,
        value: value.into(),
    }
}

fn rows(view: &ConfigView) -> Vec<SettingRow> {
    let or_dash = |v: &Option<String>| v.clone().unwrap_or_else(|| "-".into());
    vec![
        row("config file", view.path.clone()),
        row("host", or_dash(&view.host)),
        row("port", view.port.to_string()),
        row("api_key", view.api_key),
        row("api_key_env", or_dash(&view.api_key_env)),
        row("timeout", format!("{}s", view.timeout)),
        row("transport", view.transport.clone()),
        row("poll_interval", format!("{}s", view.poll_interval)),
        row("https", view.https.to_string()),
        row("insecure", view.insecure.to_string()),
    ]
}

pub fn handle(args: &ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            output::print_output(
                &holemon_config::config_path().display().to_string(),
                global.quiet,
            );
        }
        ConfigCommand::Show => {
            let cfg = config::effective_config(global)?;
            let out = output::render(global.output, &ConfigView::new(&cfg), rows)?;
            output::print_output(&out, global.quiet);
        }
    }
    Ok(())
}
