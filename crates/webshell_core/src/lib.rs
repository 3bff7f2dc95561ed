//! # Webshell Core
//!
//! Feature registration and bidirectional messaging between a host application and the script
//! runtime of an embedded web view.
//!
//! ## Overview
//!
//! A **feature** is a script plus the message contract it speaks. The host mounts a set of
//! features and gets back:
//!
//! - **a bootstrap script** installing `window.ReactNativeWebshell` and registering every feature
//!   (each registration isolated in its own `try`/`catch`)
//! - **a message handler** routing `postMessage` payloads from the runtime to host callbacks
//! - **an RMI handle** invoking runtime-side handlers, buffered until the runtime is ready
//!
//! ## Quick Start
//!
//! ```rust
//! use std::cell::RefCell;
//! use webshell_core::{FeatureBuilder, InjectError, MountOptions, Props, Webshell, WebViewRef};
//!
//! struct Widget(RefCell<Vec<String>>);
//!
//! impl WebViewRef for Widget {
//!     fn inject_javascript(&self, script: &str) -> Result<(), InjectError> {
//!         self.0.borrow_mut().push(script.to_string());
//!         Ok(())
//!     }
//! }
//!
//! # fn example() -> Result<(), webshell_core::WebshellError> {
//! let hello = FeatureBuilder::new(
//!     "org.example/hello",
//!     "function hello(webshell) { webshell.postMessageToShell('Hello world!'); }",
//! )
//! .declare_shell_handler("onHello")
//! .build()?;
//!
//! let props = Props::new().with_handler("onHello", |body| println!("{body}"));
//! let shell = Webshell::mount(
//!     Widget(RefCell::new(Vec::new())),
//!     [hello.instance(None)],
//!     &props,
//!     MountOptions::new().with_debug(true),
//! )?;
//!
//! // give this to the web view as its injected script
//! let _bootstrap = shell.injected_javascript(None);
//!
//! // and bind this to the web view's message event
//! shell.handle_message(
//!     r#"{"type":"feature","identifier":"org.example/hello","handlerId":"default","body":"Hello world!","__isWebshellPostMessage":true}"#,
//! )?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```
//!
//! ## Error policy
//!
//! Protocol violations go through the [`Reporter`]: silent without debug, logged as warnings in
//! lenient debug mode, returned as [`WebshellError`] in strict debug mode. Malformed transport
//! payloads are never errors; they are forwarded to the pass-through callback.

mod bus;
mod error;
mod feature;
pub mod features;
mod props;
mod protocol;
mod registry;
mod reporter;
mod rmi;
mod shell;
mod webview;

pub use bus::{FeatureErrorCallback, MessageBus, RawMessageCallback};
pub use error::{Result, WebshellError};
pub use feature::{
    DEFAULT_HANDLER_ID, Feature, FeatureBuilder, FeatureClass, FeatureDefinition,
    ShellHandlerSpec, WebHandlerSpec,
};
pub use props::{PropValue, Props, RESERVED_PROP_PREFIX, ShellCallback};
pub use protocol::{ENVELOPE_MARKER, Incoming, InvalidEnvelope, PostMessage};
pub use registry::{HandlerKey, Registry, WEBSHELL_GLOBAL};
pub use reporter::{LogSeverity, Reported, Reporter};
pub use rmi::{BufferedRmiHandle, RmiCall, RmiHandle};
pub use shell::{MountOptions, Webshell};
pub use webview::{InjectError, WebViewRef};
