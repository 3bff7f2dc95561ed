//! Host → runtime calls ("remote method invocation") and their readiness buffer.
//!
//! [`RmiHandle`] turns a call into a script and injects it right away. [`BufferedRmiHandle`]
//! queues every call until the runtime announces readiness, then replays the queue in order.

use std::{cell::RefCell, collections::VecDeque, sync::Arc};

use serde_json::Value;
use tracing::{debug, trace};

use crate::{
    error::{Result, WebshellError},
    feature::Feature,
    registry::{Registry, WEBSHELL_GLOBAL, js_string},
    reporter::Reporter,
    webview::WebViewRef,
};

/// An outbound operation, tagged by method so one queue serves them all
#[derive(Debug, Clone)]
pub enum RmiCall {
    PostMessageToWeb {
        feature: Feature,
        handler_id: String,
        payload: Value,
    },
    SetDebug(bool),
}

impl RmiCall {
    pub fn method(&self) -> &'static str {
        match self {
            RmiCall::PostMessageToWeb { .. } => "postMessageToWeb",
            RmiCall::SetDebug(_) => "setDebug",
        }
    }
}

pub struct RmiHandle<W> {
    webview: W,
    registry: Arc<Registry>,
    reporter: Reporter,
}

impl<W: WebViewRef> RmiHandle<W> {
    pub fn new(webview: W, registry: Arc<Registry>, reporter: Reporter) -> Self {
        Self {
            webview,
            registry,
            reporter,
        }
    }

    /// Invokes the web handler `handler_id` of `feature` with `payload`.
    ///
    /// Nothing is injected unless `feature` declares the handler and belongs to the registry.
    ///
    /// # Errors
    ///
    /// Returns the violation when the reporter is in strict debug mode.
    pub fn post_message_to_web(
        &self,
        feature: &Feature,
        handler_id: &str,
        payload: &Value,
    ) -> Result<()> {
        if !feature.has_web_handler(handler_id) {
            self.reporter
                .dispatch_error(WebshellError::MissingWebHandler {
                    identifier: feature.identifier().to_string(),
                    handler_id: handler_id.to_string(),
                })?;
            return Ok(());
        }
        if !self.registry.has_feature(feature) {
            self.reporter.dispatch_error(WebshellError::MissingInShell {
                identifier: feature.identifier().to_string(),
            })?;
            return Ok(());
        }

        let script = format!(
            "{WEBSHELL_GLOBAL}.postMessageToWeb({}, {}, {payload});\ntrue;",
            js_string(feature.identifier()),
            js_string(handler_id),
        );
        trace!(
            feature = feature.identifier(),
            handler_id, "Posting message to web"
        );
        self.inject(&script)
    }

    /// Toggles the runtime-side debug flag
    ///
    /// # Errors
    ///
    /// Returns the injection failure when the reporter is in strict debug mode.
    pub fn set_debug(&self, debug: bool) -> Result<()> {
        self.inject(&format!("{WEBSHELL_GLOBAL}.debug = {debug};\ntrue;"))
    }

    /// Runs a tagged call
    ///
    /// # Errors
    ///
    /// Same as the method the call stands for.
    pub fn call(&self, call: &RmiCall) -> Result<()> {
        match call {
            RmiCall::PostMessageToWeb {
                feature,
                handler_id,
                payload,
            } => self.post_message_to_web(feature, handler_id, payload),
            RmiCall::SetDebug(debug) => self.set_debug(*debug),
        }
    }

    fn inject(&self, script: &str) -> Result<()> {
        match self.webview.inject_javascript(script) {
            Ok(()) => Ok(()),
            Err(e) => self
                .reporter
                .dispatch_error(WebshellError::CannotInjectScript {
                    reason: e.to_string(),
                })
                .map(|_| ()),
        }
    }
}

#[derive(Debug, Default)]
struct QueueState {
    loaded: bool,
    flushing: bool,
    pending: VecDeque<RmiCall>,
}

/// [`RmiHandle`] decorator holding calls back until [`Self::flush_pending_messages`].
///
/// There is no readiness timeout: if the runtime never loads, calls stay queued until the
/// handle is dropped with its mount.
pub struct BufferedRmiHandle<W> {
    inner: RmiHandle<W>,
    state: RefCell<QueueState>,
}

impl<W: WebViewRef> BufferedRmiHandle<W> {
    pub fn new(inner: RmiHandle<W>) -> Self {
        Self {
            inner,
            state: RefCell::new(QueueState::default()),
        }
    }

    /// See [`RmiHandle::post_message_to_web`]. Queued while the runtime is not ready.
    ///
    /// # Errors
    ///
    /// Only immediate calls can fail; queued calls report during the flush.
    pub fn post_message_to_web(
        &self,
        feature: &Feature,
        handler_id: &str,
        payload: Value,
    ) -> Result<()> {
        self.dispatch(RmiCall::PostMessageToWeb {
            feature: feature.clone(),
            handler_id: handler_id.to_string(),
            payload,
        })
    }

    /// See [`RmiHandle::set_debug`]. Queued while the runtime is not ready.
    ///
    /// # Errors
    ///
    /// Only immediate calls can fail; queued calls report during the flush.
    pub fn set_debug(&self, debug: bool) -> Result<()> {
        self.dispatch(RmiCall::SetDebug(debug))
    }

    /// Runs `call` now if the runtime is ready, otherwise appends it to the queue.
    ///
    /// Calls made while a flush is in progress join the back of the queue, so they still run
    /// after everything queued before them.
    ///
    /// # Errors
    ///
    /// Same as [`RmiHandle::call`] for immediate calls.
    pub fn dispatch(&self, call: RmiCall) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if !state.loaded || state.flushing {
                trace!(method = call.method(), "Buffering call until the web runtime is ready");
                state.pending.push_back(call);
                return Ok(());
            }
        }
        self.inner.call(&call)
    }

    /// Marks the handle loaded and replays queued calls in FIFO order.
    ///
    /// Every queued call runs even if an earlier one fails.
    ///
    /// # Errors
    ///
    /// Returns the first failure of the replay.
    pub fn flush_pending_messages(&self) -> Result<()> {
        {
            let mut state = self.state.borrow_mut();
            if state.flushing {
                return Ok(());
            }
            state.loaded = true;
            state.flushing = true;
            debug!(pending = state.pending.len(), "Flushing buffered calls");
        }

        let mut first_error = None;
        loop {
            let next = self.state.borrow_mut().pending.pop_front();
            let Some(call) = next else {
                break;
            };
            if let Err(e) = self.inner.call(&call) {
                first_error.get_or_insert(e);
            }
        }

        self.state.borrow_mut().flushing = false;
        first_error.map_or(Ok(()), Err)
    }

    pub fn is_loaded(&self) -> bool {
        self.state.borrow().loaded
    }

    pub fn pending_len(&self) -> usize {
        self.state.borrow().pending.len()
    }
}
