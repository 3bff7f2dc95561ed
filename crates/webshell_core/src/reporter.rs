//! Central strict/lenient policy for protocol violations.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, WebshellError};

/// What the reporter did with a dispatched error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reported {
    /// Debug is off, nothing was emitted
    Silenced,
    /// Lenient mode, a warning was logged
    Warned,
}

/// Severity carried by `"log"` envelopes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogSeverity {
    Warn,
    #[default]
    Info,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Reporter {
    debug: bool,
    strict: bool,
}

impl Reporter {
    pub fn new(debug: bool, strict: bool) -> Self {
        Self { debug, strict }
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Applies the reporting policy to `error`.
    ///
    /// # Errors
    ///
    /// Returns the error back when both debug and strict mode are enabled.
    pub fn dispatch_error(&self, error: WebshellError) -> Result<Reported> {
        if !self.debug {
            return Ok(Reported::Silenced);
        }
        if self.strict {
            return Err(error);
        }
        warn!(kind = error.kind(), "{error}");
        Ok(Reported::Warned)
    }

    /// Forwards a message logged by a feature script. Never fails.
    pub fn dispatch_log(&self, severity: LogSeverity, identifier: &str, message: &str) {
        if !self.debug {
            return;
        }
        match severity {
            LogSeverity::Warn => warn!(feature = identifier, "{message}"),
            LogSeverity::Info => info!(feature = identifier, "{message}"),
        }
    }
}

impl From<&webshell_config::Config> for Reporter {
    fn from(config: &webshell_config::Config) -> Self {
        Self::new(config.debug, config.strict_mode)
    }
}
