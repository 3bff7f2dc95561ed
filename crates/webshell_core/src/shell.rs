//! Host-facing entry point: one [`Webshell`] per mount of the web view wrapper.

use std::{cell::RefCell, fmt, rc::Rc, sync::Arc};

use serde_json::Value;

use crate::{
    bus::{FeatureErrorCallback, MessageBus, RawMessageCallback},
    error::Result,
    feature::Feature,
    props::Props,
    registry::Registry,
    reporter::Reporter,
    rmi::{BufferedRmiHandle, RmiHandle},
    webview::WebViewRef,
};

#[derive(Clone, Default)]
pub struct MountOptions {
    pub debug: bool,
    pub strict: bool,
    on_message: Option<RawMessageCallback>,
    on_web_feature_error: Option<FeatureErrorCallback>,
}

impl fmt::Debug for MountOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountOptions")
            .field("debug", &self.debug)
            .field("strict", &self.strict)
            .field("on_message", &self.on_message.is_some())
            .field("on_web_feature_error", &self.on_web_feature_error.is_some())
            .finish()
    }
}

impl MountOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Pass-through handler for payloads that are not protocol envelopes
    #[must_use]
    pub fn with_on_message(mut self, callback: impl Fn(&str) + 'static) -> Self {
        self.on_message = Some(Rc::new(callback));
        self
    }

    /// Called with `(identifier, body)` whenever a feature script throws
    #[must_use]
    pub fn with_on_web_feature_error(mut self, callback: impl Fn(&str, &Value) + 'static) -> Self {
        self.on_web_feature_error = Some(Rc::new(callback));
        self
    }

    pub fn reporter(&self) -> Reporter {
        Reporter::new(self.debug, self.strict)
    }
}

impl From<&webshell_config::Config> for MountOptions {
    fn from(config: &webshell_config::Config) -> Self {
        Self::new()
            .with_debug(config.debug)
            .with_strict(config.strict_mode)
    }
}

pub struct Webshell<W> {
    registry: Arc<Registry>,
    bus: MessageBus,
    rmi: Rc<BufferedRmiHandle<W>>,
    runtime_props: RefCell<Props>,
}

impl<W> fmt::Debug for Webshell<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Webshell")
            .field("registry", &self.registry)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}

impl<W: WebViewRef + 'static> Webshell<W> {
    /// Assembles the registry for `features` and wires the bus to a buffered RMI handle on `webview`.
    ///
    /// # Errors
    ///
    /// Fails when two features declare the same prop and `options` are strict with debug on.
    pub fn mount<I, F>(webview: W, features: I, props: &Props, options: MountOptions) -> Result<Self>
    where
        I: IntoIterator<Item = F>,
        F: Into<Option<Feature>>,
    {
        let reporter = options.reporter();
        let registry = Arc::new(Registry::new(features, &reporter)?);
        let rmi = Rc::new(BufferedRmiHandle::new(RmiHandle::new(
            webview,
            Arc::clone(&registry),
            reporter,
        )));

        let flush = Rc::clone(&rmi);
        let mut bus = MessageBus::new(Arc::clone(&registry), reporter, props)
            .with_on_ready(move || flush.flush_pending_messages());
        if let Some(on_message) = options.on_message {
            bus = bus.with_on_message(on_message);
        }
        if let Some(on_error) = options.on_web_feature_error {
            bus = bus.with_on_web_feature_error(on_error);
        }

        Ok(Self {
            runtime_props: RefCell::new(registry.runtime_props(props)),
            registry,
            bus,
            rmi,
        })
    }

    /// Script to inject into the runtime: the bootstrap followed by the integrator's own script
    pub fn injected_javascript(&self, integrator_script: Option<&str>) -> String {
        let mut script = self.registry.assembled_script().to_string();
        if let Some(extra) = integrator_script {
            script.push_str(extra);
            script.push('\n');
        }
        script.push_str("true;\n");
        script
    }

    /// Message handler to bind to the web view's message event
    ///
    /// # Errors
    ///
    /// See [`MessageBus::handle_incoming`].
    pub fn handle_message(&self, raw: &str) -> Result<()> {
        self.bus.handle_incoming(raw)
    }

    /// Handle for host → runtime calls, buffered until the runtime is ready
    pub fn rmi(&self) -> Rc<BufferedRmiHandle<W>> {
        Rc::clone(&self.rmi)
    }

    /// Props to forward to the web view widget
    pub fn runtime_props(&self) -> Props {
        self.runtime_props.borrow().clone()
    }

    /// Rebinds host callbacks and forwarded props after the host re-renders.
    ///
    /// The registry, readiness and RMI buffer are kept: only a different feature set needs a new
    /// mount.
    pub fn set_props(&self, props: &Props) {
        self.bus.set_props(props);
        *self.runtime_props.borrow_mut() = self.registry.runtime_props(props);
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn is_runtime_ready(&self) -> bool {
        self.bus.is_runtime_ready()
    }
}
