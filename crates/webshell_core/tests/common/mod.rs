use std::cell::RefCell;

use serde_json::{Value, json};
use webshell_core::{InjectError, WebViewRef};

/// Web view stand-in remembering every injected script
#[derive(Default)]
pub struct RecordingWebView {
    scripts: RefCell<Vec<String>>,
}

impl RecordingWebView {
    pub fn scripts(&self) -> Vec<String> {
        self.scripts.borrow().clone()
    }
}

impl WebViewRef for RecordingWebView {
    fn inject_javascript(&self, script: &str) -> Result<(), InjectError> {
        self.scripts.borrow_mut().push(script.to_string());
        Ok(())
    }
}

pub fn envelope(mut value: Value) -> String {
    value["__isWebshellPostMessage"] = json!(true);
    value.to_string()
}

pub fn init_message() -> String {
    envelope(json!({ "type": "init", "identifier": "webshell", "handlerId": "default", "body": null }))
}
