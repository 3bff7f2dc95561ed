//! # Webshell Runtime
//!
//! A `deno_core` isolate that plays the part of the native web view for webshell features.
//!
//! ## Overview
//!
//! [`DenoWebView`] exposes the same surface a mobile web view gives the page:
//! - **Transport**: `window.ReactNativeWebView.postMessage(string)`, backed by an op that queues
//!   messages in an [`Outbox`]
//! - **Script injection**: [`webshell_core::WebViewRef`], so a [`webshell_core::Webshell`] can be
//!   mounted on it and drive it through its RMI handle
//!
//! There is no DOM. Features that only talk through the bus run unchanged.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use webshell_core::{FeatureBuilder, MountOptions, Props, Webshell};
//! use webshell_runtime::DenoWebView;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let hello = FeatureBuilder::new(
//!     "org.example/hello",
//!     "function hello(webshell) { webshell.postMessageToShell('Hello world!'); }",
//! )
//! .declare_shell_handler("onHello")
//! .build()?;
//!
//! let view = Rc::new(DenoWebView::new()?);
//! let props = Props::new().with_handler("onHello", |body| println!("{body}"));
//! let shell = Webshell::mount(Rc::clone(&view), [hello.instance(None)], &props, MountOptions::new())?;
//!
//! view.load(&shell.injected_javascript(None))?;
//! view.pump(&shell)?;
//! # Ok(())
//! # }
//! ```

mod error;
mod ops;
mod outbox;
mod webview;


pub use error::RuntimeError;
pub use outbox::Outbox;
pub use webview::DenoWebView;

// Transport extension: the post-message op plus the outbox it writes to.
deno_core::extension!(
    webshell_transport,
    ops = [ops::op_webshell_post_message],
    options = {
        outbox: Outbox,
    },
    state = |state, options| {
        state.put(options.outbox);
    },
);
