use std::{collections::HashMap, path::Path};

use config::{Config, Environment, File, FileFormat};
use eyre::{Context, Result};

use crate::config::models::GatewayConfig;

/// Load the gateway configuration from the process environment, optionally
/// layered over a configuration file. Environment variables always win.
pub fn load_config(config_path: Option<&str>) -> Result<GatewayConfig> {
    load_config_from(config_path, None)
}

/// Load configuration from an optional file plus an explicit environment map.
///
/// Passing `None` for `env` reads the real process environment. Tests pass a
/// map so they never depend on (or mutate) global process state.
pub fn load_config_from(
    config_path: Option<&str>,
    env: Option<HashMap<String, String>>,
) -> Result<GatewayConfig> {
    let mut builder = Config::builder();

    if let Some(config_path) = config_path {
        let path = Path::new(config_path);
        let format = match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => FileFormat::Yaml,
            Some("json") => FileFormat::Json,
            Some("ini") => FileFormat::Ini,
            _ => FileFormat::Toml,
        };
        builder = builder.add_source(File::new(config_path, format).required(true));
    }

    let settings = builder
        .add_source(Environment::default().try_parsing(true).source(env))
        .build()
        .context("Failed to collect gateway configuration sources")?;

    let gateway_config: GatewayConfig = settings.try_deserialize().context(
        "Failed to deserialize gateway configuration (STACK_URL, LINKEDLIST_URL and GRAPH_URL are required)",
    )?;

    Ok(gateway_config.normalize())
}
