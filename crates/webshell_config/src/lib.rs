use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fs;
use tracing::debug;

use crate::logger::LoggerConfig;

pub(crate) mod defaults;
pub mod logger;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(skip)]
    path: Option<Utf8PathBuf>,

    /// Enables protocol diagnostics. Without it every protocol violation is silent.
    #[serde(default)]
    pub debug: bool,

    /// Turns protocol violations into errors instead of warnings (only honoured with `debug`)
    #[serde(default)]
    pub strict_mode: bool,

    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerConfig,
}

impl Config {
    #[must_use]
    pub fn with_path(mut self, path: &Utf8PathBuf) -> Self {
        self.path = Some(path.clone());
        self
    }

    pub fn path(&self) -> Utf8PathBuf {
        self.path.clone().unwrap_or(Self::default_path())
    }

    /// Loads config from a json file
    ///
    /// # Errors
    ///
    /// This function will return an error if the config path does not exist or the content is invalid
    pub fn load(path: &Utf8PathBuf) -> Result<Self> {
        debug!("Loading config from {path}");

        if !path.exists() {
            anyhow::bail!("Config file does not exist: {path}");
        }

        let contents =
            fs::read_to_string(path).context(format!("Failed reading config: {path} "))?;

        let mut cfg: Self =
            serde_json::from_str(&contents).context(format!("Failed loading config: {path} "))?;
        cfg.path = Some(path.clone());

        Ok(cfg)
    }

    /// Saves config to json file, falling back on default path if none is set
    ///
    /// # Errors
    /// This function will error if it fails writing the config
    pub fn save(&self) -> Result<()> {
        let dest = self.path();
        debug!("Saving config to {dest}");
        let contents = serde_json::to_string_pretty(self).unwrap_or(json!(self).to_string());

        fs::write(&dest, contents).context(format!("Failed writing config: {dest}"))?;

        Ok(())
    }

    /// Default config path is ./webshell.json
    pub fn default_path() -> Utf8PathBuf {
        Utf8PathBuf::new().join("webshell.json")
    }
}
