use thiserror::Error;
use webshell_core::WebshellError;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Script evaluation failed: {0}")]
    Script(String),
    #[error("Failed to convert script result: {0}")]
    Conversion(String),
    #[error("Runtime is busy evaluating another script")]
    Busy,
    #[error("Web view is detached")]
    Detached,
    #[error(transparent)]
    Webshell(#[from] WebshellError),
}
