use std::cell::{Cell, RefCell};

use deno_core::{JsRuntime, RuntimeOptions};
use serde_json::Value;
use tracing::{debug, trace};
use webshell_core::{InjectError, WebViewRef, Webshell};

use crate::{error::RuntimeError, outbox::Outbox, webshell_transport};

/// Gives scripts the globals a mobile web view provides
const TRANSPORT_SHIM: &str = r"
globalThis.window = globalThis;
window.ReactNativeWebView = {
  postMessage: (message) => Deno.core.ops.op_webshell_post_message(String(message)),
};
";

/// A V8 isolate standing in for a native web view.
///
/// Scripts see `window.ReactNativeWebView.postMessage`; whatever they post waits in the
/// [`Outbox`] until [`DenoWebView::pump`] hands it to a mounted [`Webshell`].
pub struct DenoWebView {
    runtime: RefCell<JsRuntime>,
    outbox: Outbox,
    detached: Cell<bool>,
}

impl std::fmt::Debug for DenoWebView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenoWebView")
            .field("outbox", &self.outbox.len())
            .field("detached", &self.detached.get())
            .finish_non_exhaustive()
    }
}

impl DenoWebView {
    /// Creates the isolate and installs the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the transport shim fails to evaluate.
    pub fn new() -> Result<Self, RuntimeError> {
        let outbox = Outbox::new();
        let runtime = JsRuntime::new(RuntimeOptions {
            extensions: vec![webshell_transport::init(outbox.clone())],
            ..Default::default()
        });

        let view = Self {
            runtime: RefCell::new(runtime),
            outbox,
            detached: Cell::new(false),
        };
        view.execute("<webshell_transport>", TRANSPORT_SHIM)?;
        Ok(view)
    }

    /// Evaluates the page's injected script, usually [`Webshell::injected_javascript`]
    ///
    /// # Errors
    ///
    /// Returns an error if the view is detached or the script fails at top level.
    pub fn load(&self, script: &str) -> Result<(), RuntimeError> {
        if self.detached.get() {
            return Err(RuntimeError::Detached);
        }
        debug!(length = script.len(), "Loading injected script");
        self.execute("<webshell>", script)
    }

    /// Evaluates `script` and returns its completion value as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the script throws or its value is not representable as JSON.
    pub fn evaluate(&self, script: &str) -> Result<Value, RuntimeError> {
        let mut runtime = self.runtime.try_borrow_mut().map_err(|_| RuntimeError::Busy)?;
        let global = runtime
            .execute_script("<evaluate>", script.to_string())
            .map_err(|e| RuntimeError::Script(e.to_string()))?;

        let runtime = &mut *runtime;
        deno_core::scope!(scope, runtime);
        let local = deno_core::v8::Local::new(scope, global);
        deno_core::serde_v8::from_v8::<Value>(scope, local)
            .map_err(|e| RuntimeError::Conversion(e.to_string()))
    }

    /// Delivers queued messages to `shell` until none remain.
    ///
    /// Handlers may inject scripts that post again; those messages are delivered in the same
    /// call. Returns how many messages were delivered.
    ///
    /// # Errors
    ///
    /// Stops at the first error `shell` returns; later messages stay queued.
    pub fn pump<W: WebViewRef + 'static>(&self, shell: &Webshell<W>) -> Result<usize, RuntimeError> {
        let mut delivered = 0;
        while let Some(message) = self.outbox.pop() {
            shell.handle_message(&message)?;
            delivered += 1;
        }
        trace!(delivered, "Outbox drained");
        Ok(delivered)
    }

    /// Removes and returns queued messages without delivering them
    pub fn drain(&self) -> Vec<String> {
        self.outbox.drain()
    }

    /// Simulates the widget unmounting: every later injection fails
    pub fn detach(&self) {
        debug!("Web view detached");
        self.detached.set(true);
    }

    pub fn is_detached(&self) -> bool {
        self.detached.get()
    }

    fn execute(&self, name: &'static str, script: &str) -> Result<(), RuntimeError> {
        let mut runtime = self.runtime.try_borrow_mut().map_err(|_| RuntimeError::Busy)?;
        runtime
            .execute_script(name, script.to_string())
            .map(|_| ())
            .map_err(|e| RuntimeError::Script(e.to_string()))
    }
}

impl WebViewRef for DenoWebView {
    fn inject_javascript(&self, script: &str) -> Result<(), InjectError> {
        if self.detached.get() {
            return Err(InjectError::Unavailable);
        }
        trace!(length = script.len(), "Injecting script");
        self.execute("<inject>", script)
            .map_err(|e| InjectError::Failed(e.to_string()))
    }
}
