use std::path::Path;

use anyhow::{anyhow, Context, Result};
use regex::Regex;
use tracing::{debug, error};

use crate::config::settings::{ClientConfig, LoggingConfig};

/// Load and validate config from a YAML file
pub async fn file_to_config(path: &Path) -> Result<ClientConfig> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read config '{}'", path.display()))?;

    let expanded = expand_env_vars(&content)?;
    parse_config(&expanded)
}

pub fn parse_config(content: &str) -> Result<ClientConfig> {
    let mut client_config: ClientConfig = serde_yaml::from_str(content).inspect_err(|e| {
        error!("parse config error: {}", e);
    })?;

    // Apply defaults
    if client_config.logging.is_none() {
        client_config.logging = Some(LoggingConfig::default());
    }

    debug!("validating config ...");
    client_config
        .validate()
        .map_err(|e| anyhow!("Invalid config: {}", e))?;

    Ok(client_config)
}

/// Replace `${VAR}` and `${VAR:default}` with values from the environment.
fn expand_env_vars(input: &str) -> Result<String> {
    let re = Regex::new(r"\$\{(\w+)(?::([^\}]*))?\}")?;
    let expanded = re.replace_all(input, |caps: &regex::Captures| {
        let var = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        std::env::var(var).unwrap_or_else(|_| default.to_string())
    });
    Ok(expanded.into_owned())
}
