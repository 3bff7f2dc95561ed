//! Wire envelope exchanged between the web runtime and the host
//!
//! Every protocol message is a JSON object carrying `"__isWebshellPostMessage": true` and a
//! `type` of `init | feature | error | log`. Unmarked payloads crossing the transport are opaque;
//! marked payloads that do not fit the envelope are invalid.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{feature::DEFAULT_HANDLER_ID, reporter::LogSeverity};

/// Sentinel key marking a protocol message
pub const ENVELOPE_MARKER: &str = "__isWebshellPostMessage";

fn default_handler_id() -> String {
    DEFAULT_HANDLER_ID.to_string()
}

/// A classified protocol message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PostMessage {
    /// The runtime finished running the bootstrap
    Init,
    /// A feature script posted to one of its shell handlers
    Feature {
        identifier: String,
        #[serde(rename = "handlerId", default = "default_handler_id")]
        handler_id: String,
        #[serde(default)]
        body: Value,
    },
    /// A feature script threw
    Error {
        identifier: String,
        #[serde(default)]
        body: Value,
    },
    /// A feature script logged through `warn`/`info`
    Log {
        identifier: String,
        #[serde(default)]
        severity: LogSeverity,
        #[serde(default)]
        body: Value,
    },
}

/// What a raw transport payload turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum Incoming {
    Protocol(PostMessage),
    /// Marked as a protocol message but not a valid envelope
    Invalid(InvalidEnvelope),
    /// Not a protocol message, forwarded as-is
    Opaque,
}

/// What could be salvaged from a marked payload that failed to decode
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidEnvelope {
    pub message_type: Option<String>,
    pub identifier: Option<String>,
    pub handler_id: String,
    pub reason: String,
}

impl InvalidEnvelope {
    fn salvage(value: &Value, reason: String) -> Self {
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(str::to_string);
        Self {
            message_type: field("type"),
            identifier: field("identifier"),
            handler_id: field("handlerId").unwrap_or_else(default_handler_id),
            reason,
        }
    }
}

/// Serialized form of a [`PostMessage`], marker included
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    #[serde(rename = "__isWebshellPostMessage")]
    marker: bool,
    #[serde(flatten)]
    message: &'a PostMessage,
}

impl PostMessage {
    pub fn feature(identifier: impl Into<String>, handler_id: impl Into<String>, body: Value) -> Self {
        PostMessage::Feature {
            identifier: identifier.into(),
            handler_id: handler_id.into(),
            body,
        }
    }

    /// Encodes the envelope exactly as feature scripts emit it
    pub fn to_wire(&self) -> String {
        let envelope = Envelope {
            marker: true,
            message: self,
        };
        serde_json::to_value(&envelope)
            .map(|value| value.to_string())
            .unwrap_or_default()
    }

    /// Classifies a raw payload. Never fails: unmarked payloads are [`Incoming::Opaque`], marked
    /// ones that do not decode are [`Incoming::Invalid`].
    pub fn parse(raw: &str) -> Incoming {
        let Ok(value) = serde_json::from_str::<Value>(raw) else {
            return Incoming::Opaque;
        };

        let marked = value
            .as_object()
            .and_then(|object| object.get(ENVELOPE_MARKER))
            .is_some_and(|marker| *marker == Value::Bool(true));
        if !marked {
            return Incoming::Opaque;
        }

        match PostMessage::deserialize(&value) {
            Ok(message) => Incoming::Protocol(message),
            Err(e) => Incoming::Invalid(InvalidEnvelope::salvage(&value, e.to_string())),
        }
    }
}

/// Renders a body for error and log reporting, strings without their quotes
pub(crate) fn body_text(body: &Value) -> String {
    match body {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
