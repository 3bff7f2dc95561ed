use std::rc::Rc;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InjectError {
    /// The widget is not mounted or has no script-injection primitive
    #[error("web view has no script injection available")]
    Unavailable,
    #[error("script injection failed: {0}")]
    Failed(String),
}

/// Handle on the underlying web view widget, through which script is evaluated in the runtime
pub trait WebViewRef {
    /// Evaluates `script` in the web runtime.
    ///
    /// # Errors
    ///
    /// [`InjectError::Unavailable`] when there is nothing to inject into,
    /// [`InjectError::Failed`] when the runtime rejected the script.
    fn inject_javascript(&self, script: &str) -> Result<(), InjectError>;
}

impl<T: WebViewRef + ?Sized> WebViewRef for Rc<T> {
    fn inject_javascript(&self, script: &str) -> Result<(), InjectError> {
        (**self).inject_javascript(script)
    }
}

impl<T: WebViewRef + ?Sized> WebViewRef for &T {
    fn inject_javascript(&self, script: &str) -> Result<(), InjectError> {
        (**self).inject_javascript(script)
    }
}
