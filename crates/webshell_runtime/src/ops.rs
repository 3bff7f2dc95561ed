//! Deno ops backing the web view transport

use deno_core::{OpState, op2};

use crate::outbox::Outbox;

/// `window.ReactNativeWebView.postMessage`: queue the message for the host
#[op2(fast)]
#[allow(clippy::needless_pass_by_value)]
pub(crate) fn op_webshell_post_message(state: &mut OpState, #[string] message: String) {
    tracing::trace!(length = message.len(), "Runtime posted a message");
    state.borrow::<Outbox>().push(message);
}
