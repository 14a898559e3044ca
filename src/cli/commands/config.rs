//! `atelier config`: print the effective configuration.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

/// The effective configuration.
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    /// Merged configuration.
    #[serde(flatten)]
    pub config: Config,
    #[serde(skip)]
    rendered: String,
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        self.rendered.clone()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }
}

/// Print the effective configuration.
pub async fn execute(config: &Config, json: bool) -> Result<()> {
    let rendered = serde_yaml::to_string(config).context("Failed to render configuration as YAML")?;
    let result = ConfigOutput {
        config: config.clone(),
        rendered,
    };
    output(&result, json);
    Ok(())
}
