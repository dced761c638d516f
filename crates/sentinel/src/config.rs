use anyhow::{Context, Result};
use fgate_runtime::{AuthorizationConfig, OracleConfig, TupleKey};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub authorization: AuthorizationConfig,

    /// Relationship tuples preloaded into the in-memory oracle
    #[serde(default)]
    pub tuples: Vec<TupleKey>,
}

/// Load config from file or use defaults
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let content =
        fs::read_to_string(path).context(format!("Failed to read config file: {:?}", path))?;

    toml::from_str(&content).context("Failed to parse TOML config")
}
