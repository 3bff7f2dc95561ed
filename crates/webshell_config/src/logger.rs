use std::{fs::OpenOptions, sync::Mutex};

use anyhow::{Context, Result};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt::writer::BoxMakeWriter};

const WHITELISTED_CRATES: &[&str] = &["webshell_core", "webshell_runtime", "webshell_config"];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggerConfig {
    #[serde(default = "crate::defaults::default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub level: LogLevel,
    #[serde(default)]
    pub format: LoggerFormat,
    #[serde(default = "crate::defaults::default_true")]
    pub colors: bool,
    /// Optional file path for log output, logs go to stdout when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<Utf8PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum LoggerFormat {
    #[serde(rename = "compact")]
    #[default]
    Compact,
    #[serde(rename = "pretty")]
    Pretty,
    #[serde(rename = "json")]
    Json,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: LogLevel::Info,
            format: LoggerFormat::Compact,
            colors: true,
            file: None,
        }
    }
}

/// Define an enumeration for log levels
/// Ordered from lowest to highest severity: Trace < Debug < Info < Warn < Error
#[derive(Debug, Default, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    /// The "trace" level.
    #[serde(rename = "trace", alias = "TRACE")]
    Trace,
    /// The "debug" level.
    #[serde(rename = "debug", alias = "DEBUG")]
    Debug,
    /// The "info" level.
    #[serde(rename = "info", alias = "INFO")]
    #[default]
    Info,
    /// The "warn" level.
    #[serde(rename = "warn", alias = "WARN")]
    Warn,
    /// The "error" level.
    #[serde(rename = "error", alias = "ERROR")]
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

pub(crate) fn default_env_filter(level: LogLevel) -> String {
    let mut filters: Vec<String> = WHITELISTED_CRATES
        .iter()
        .map(|crate_name| format!("{crate_name}={}", level.as_str()))
        .collect();

    // Everything else only reports warnings
    filters.insert(0, "warn".to_string());

    filters.join(",")
}

/// Installs the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG` takes precedence over the configured level. A disabled logger installs nothing.
///
/// # Errors
///
/// Fails if the log file cannot be opened or a global subscriber is already set.
pub fn init_logger(config: &LoggerConfig) -> Result<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_env_filter(config.level)));

    let (writer, ansi) = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .context(format!("Failed opening log file: {path}"))?;
            (BoxMakeWriter::new(Mutex::new(file)), false)
        }
        None => (BoxMakeWriter::new(std::io::stdout), config.colors),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(ansi)
        .with_writer(writer);

    let installed = match config.format {
        LoggerFormat::Compact => builder.compact().try_init(),
        LoggerFormat::Pretty => builder.pretty().try_init(),
        LoggerFormat::Json => builder.json().try_init(),
    };

    installed.map_err(|e| anyhow::anyhow!("Failed initializing logger: {e}"))
}
