//! Inbound half of the bus: classifies raw transport payloads and routes them to host callbacks.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
    sync::Arc,
};

use serde_json::Value;
use tracing::{debug, trace};

use crate::{
    error::{Result, WebshellError},
    props::Props,
    protocol::{Incoming, InvalidEnvelope, PostMessage, body_text},
    registry::Registry,
    reporter::Reporter,
};

/// Receives payloads that are not protocol envelopes, unmodified
pub type RawMessageCallback = Rc<dyn Fn(&str)>;

/// Receives `(identifier, body)` of `"error"` envelopes
pub type FeatureErrorCallback = Rc<dyn Fn(&str, &Value)>;

type ReadyHook = Box<dyn Fn() -> Result<()>>;

pub struct MessageBus {
    registry: Arc<Registry>,
    reporter: Reporter,
    /// Host props that are declared shell handlers, rebound by [`MessageBus::set_props`]
    shell_handlers: RefCell<Props>,
    on_message: Option<RawMessageCallback>,
    on_web_feature_error: Option<FeatureErrorCallback>,
    on_ready: Option<ReadyHook>,
    runtime_ready: Cell<bool>,
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field(
                "shell_handlers",
                &self.shell_handlers.borrow().keys().collect::<Vec<_>>(),
            )
            .field("runtime_ready", &self.runtime_ready.get())
            .finish_non_exhaustive()
    }
}

impl MessageBus {
    pub fn new(registry: Arc<Registry>, reporter: Reporter, props: &Props) -> Self {
        let shell_handlers = RefCell::new(registry.shell_handlers(props));
        Self {
            registry,
            reporter,
            shell_handlers,
            on_message: None,
            on_web_feature_error: None,
            on_ready: None,
            runtime_ready: Cell::new(false),
        }
    }

    #[must_use]
    pub fn with_on_message(mut self, callback: RawMessageCallback) -> Self {
        self.on_message = Some(callback);
        self
    }

    #[must_use]
    pub fn with_on_web_feature_error(mut self, callback: FeatureErrorCallback) -> Self {
        self.on_web_feature_error = Some(callback);
        self
    }

    /// Runs `hook` the first time the runtime announces readiness
    #[must_use]
    pub fn with_on_ready(mut self, hook: impl Fn() -> Result<()> + 'static) -> Self {
        self.on_ready = Some(Box::new(hook));
        self
    }

    /// Rewires host callbacks without touching the registry or readiness
    pub fn set_props(&self, props: &Props) {
        *self.shell_handlers.borrow_mut() = self.registry.shell_handlers(props);
    }

    pub fn is_runtime_ready(&self) -> bool {
        self.runtime_ready.get()
    }

    /// Handles one payload delivered by the transport.
    ///
    /// Malformed or foreign payloads go to the pass-through callback and never fail.
    ///
    /// # Errors
    ///
    /// Returns protocol violations when the reporter is in strict debug mode.
    pub fn handle_incoming(&self, raw: &str) -> Result<()> {
        match PostMessage::parse(raw) {
            Incoming::Opaque => {
                trace!(length = raw.len(), "Forwarding non-protocol message");
                if let Some(on_message) = &self.on_message {
                    on_message(raw);
                }
                Ok(())
            }
            Incoming::Invalid(invalid) => self.reject(invalid),
            Incoming::Protocol(message) => self.dispatch(message),
        }
    }

    /// Marked payloads that fail to decode never reach the pass-through callback. A feature
    /// message is still reported against its routing key; anything else is dropped.
    fn reject(&self, invalid: InvalidEnvelope) -> Result<()> {
        debug!(
            message_type = invalid.message_type.as_deref(),
            reason = %invalid.reason,
            "Dropping invalid envelope"
        );
        if invalid.message_type.as_deref() == Some("feature") {
            self.reporter
                .dispatch_error(WebshellError::MissingShellHandler {
                    identifier: invalid.identifier.unwrap_or_default(),
                    handler_id: invalid.handler_id,
                })?;
        }
        Ok(())
    }

    fn dispatch(&self, message: PostMessage) -> Result<()> {
        match message {
            PostMessage::Init => {
                if self.runtime_ready.replace(true) {
                    debug!("Web runtime announced readiness again");
                    return Ok(());
                }
                debug!("Web runtime is ready");
                match &self.on_ready {
                    Some(on_ready) => on_ready(),
                    None => Ok(()),
                }
            }
            PostMessage::Feature {
                identifier,
                handler_id,
                body,
            } => {
                let Some(spec) = self.registry.handler(&identifier, &handler_id) else {
                    self.reporter
                        .dispatch_error(WebshellError::MissingShellHandler {
                            identifier,
                            handler_id,
                        })?;
                    return Ok(());
                };
                let callback = self.shell_handlers.borrow().handler(&spec.name).cloned();
                match callback {
                    Some(callback) => callback(body),
                    None => trace!(
                        feature = %identifier,
                        prop = %spec.name,
                        "No host callback bound, dropping message"
                    ),
                }
                Ok(())
            }
            PostMessage::Error { identifier, body } => {
                if let Some(on_error) = &self.on_web_feature_error {
                    on_error(&identifier, &body);
                }
                self.reporter
                    .dispatch_error(WebshellError::WebScriptError {
                        identifier,
                        message: body_text(&body),
                    })
                    .map(|_| ())
            }
            PostMessage::Log {
                identifier,
                severity,
                body,
            } => {
                self.reporter
                    .dispatch_log(severity, &identifier, &body_text(&body));
                Ok(())
            }
        }
    }
}
