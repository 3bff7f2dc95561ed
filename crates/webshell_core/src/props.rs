//! Host property bag handed to the mount: shell handler callbacks mixed with plain values
//! forwarded to the web view widget.

use std::{fmt, rc::Rc};

use indexmap::IndexMap;
use serde_json::Value;

/// Props starting with this prefix configure the shell itself and are never forwarded
pub const RESERVED_PROP_PREFIX: &str = "webshell";

/// Host callback receiving the body of a `"feature"` envelope
pub type ShellCallback = Rc<dyn Fn(Value)>;

#[derive(Clone)]
pub enum PropValue {
    Handler(ShellCallback),
    Value(Value),
}

impl fmt::Debug for PropValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropValue::Handler(_) => f.write_str("Handler(..)"),
            PropValue::Value(value) => f.debug_tuple("Value").field(value).finish(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Props {
    entries: IndexMap<String, PropValue>,
}

impl Props {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_handler(mut self, name: impl Into<String>, handler: impl Fn(Value) + 'static) -> Self {
        self.insert(name, PropValue::Handler(Rc::new(handler)));
        self
    }

    #[must_use]
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, PropValue::Value(value.into()));
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: PropValue) -> Option<PropValue> {
        self.entries.insert(name.into(), value)
    }

    pub fn get(&self, name: &str) -> Option<&PropValue> {
        self.entries.get(name)
    }

    /// Returns the callback stored under `name`, if that prop is a handler
    pub fn handler(&self, name: &str) -> Option<&ShellCallback> {
        match self.entries.get(name) {
            Some(PropValue::Handler(handler)) => Some(handler),
            _ => None,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Keeps the entries for which `keep` returns true
    #[must_use]
    pub fn filtered(&self, mut keep: impl FnMut(&str, &PropValue) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(k, v)| keep(k.as_str(), v))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }
}
