//! Feature definitions, the persistent builder that produces them, and configured instances.
//!
//! A feature pairs a script, run inside the web runtime, with the message contract it speaks:
//!
//! - **shell handlers**: host-side props the script may post to (runtime → host)
//! - **web handlers**: runtime-side callbacks the host may invoke (host → runtime)
//!
//! ```rust
//! use webshell_core::FeatureBuilder;
//!
//! let class = FeatureBuilder::new(
//!     "org.example/hello",
//!     "function hello(webshell) { webshell.postMessageToShell('Hello world!'); }",
//! )
//! .declare_shell_handler("onHello")
//! .build()
//! .unwrap();
//!
//! let feature = class.instance(None);
//! assert_eq!(feature.identifier(), "org.example/hello");
//! ```

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Result, WebshellError};

/// Handler id used when a script or declaration does not name one
pub const DEFAULT_HANDLER_ID: &str = "default";

/// Separator of the `identifier:handlerId` routing key, forbidden in identifiers
pub(crate) const KEY_SEPARATOR: char = ':';

/// Declares that the runtime may post messages to a host prop
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellHandlerSpec {
    pub handler_id: String,
    pub feature_identifier: String,
    /// Name of the host prop receiving the payload
    pub name: String,
    /// Rust type name of the expected payload, when declared with a type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

/// Declares a runtime-side handler the host may invoke
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebHandlerSpec {
    #[serde(rename = "handlerId")]
    pub handler_id: String,
    #[serde(rename = "async")]
    pub is_async: bool,
}

/// Immutable description of a feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureDefinition {
    identifier: String,
    script: String,
    default_options: Map<String, Value>,
    /// prop name -> spec
    shell_handlers: IndexMap<String, ShellHandlerSpec>,
    /// handler id -> spec
    web_handlers: IndexMap<String, WebHandlerSpec>,
}

impl FeatureDefinition {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn default_options(&self) -> &Map<String, Value> {
        &self.default_options
    }

    pub fn shell_handlers(&self) -> &IndexMap<String, ShellHandlerSpec> {
        &self.shell_handlers
    }

    pub fn web_handlers(&self) -> &IndexMap<String, WebHandlerSpec> {
        &self.web_handlers
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| WebshellError::InvalidFeature {
            identifier: self.identifier.clone(),
            reason: reason.to_string(),
        };

        if self.identifier.trim().is_empty() {
            return Err(invalid("identifier must not be empty"));
        }
        if self.identifier.contains(KEY_SEPARATOR) {
            return Err(invalid("identifier must not contain ':'"));
        }
        if self.script.trim().is_empty() {
            return Err(invalid("script must not be empty"));
        }

        let mut seen_ids = Vec::with_capacity(self.shell_handlers.len());
        for spec in self.shell_handlers.values() {
            if spec.name.trim().is_empty() {
                return Err(invalid("shell handler prop name must not be empty"));
            }
            if spec.handler_id.trim().is_empty() {
                return Err(invalid("shell handler id must not be empty"));
            }
            if seen_ids.contains(&spec.handler_id.as_str()) {
                return Err(invalid(&format!(
                    "shell handler id \"{}\" is declared for more than one prop",
                    spec.handler_id
                )));
            }
            seen_ids.push(spec.handler_id.as_str());
        }

        if self
            .web_handlers
            .keys()
            .any(|handler_id| handler_id.trim().is_empty())
        {
            return Err(invalid("web handler id must not be empty"));
        }

        Ok(())
    }
}

/// Persistent builder: every `declare_*` call returns a new builder and leaves the receiver untouched.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    definition: FeatureDefinition,
}

impl FeatureBuilder {
    pub fn new(identifier: impl Into<String>, script: impl Into<String>) -> Self {
        Self {
            definition: FeatureDefinition {
                identifier: identifier.into(),
                script: script.into(),
                default_options: Map::new(),
                shell_handlers: IndexMap::new(),
                web_handlers: IndexMap::new(),
            },
        }
    }

    #[must_use]
    pub fn with_default_options(&self, options: Map<String, Value>) -> Self {
        let mut next = self.clone();
        next.definition.default_options = options;
        next
    }

    /// Declares a shell handler on the [`DEFAULT_HANDLER_ID`] channel
    #[must_use]
    pub fn declare_shell_handler(&self, prop_name: impl Into<String>) -> Self {
        self.declare_shell_handler_with_id(prop_name, DEFAULT_HANDLER_ID)
    }

    #[must_use]
    pub fn declare_shell_handler_with_id(
        &self,
        prop_name: impl Into<String>,
        handler_id: impl Into<String>,
    ) -> Self {
        self.push_shell_handler(prop_name.into(), handler_id.into(), None)
    }

    /// Same as [`Self::declare_shell_handler_with_id`], recording `P` as the payload signature
    #[must_use]
    pub fn declare_typed_shell_handler<P>(
        &self,
        prop_name: impl Into<String>,
        handler_id: impl Into<String>,
    ) -> Self {
        self.push_shell_handler(
            prop_name.into(),
            handler_id.into(),
            Some(std::any::type_name::<P>().to_string()),
        )
    }

    #[must_use]
    pub fn declare_web_handler(&self, handler_id: impl Into<String>) -> Self {
        let handler_id = handler_id.into();
        let mut next = self.clone();
        next.definition.web_handlers.insert(
            handler_id.clone(),
            WebHandlerSpec {
                handler_id,
                is_async: false,
            },
        );
        next
    }

    /// Finalizes the feature.
    ///
    /// # Errors
    ///
    /// Returns [`WebshellError::InvalidFeature`] when the identifier, script or a handler
    /// declaration is unusable.
    pub fn build(&self) -> Result<FeatureClass> {
        self.definition.validate()?;
        Ok(FeatureClass {
            definition: Arc::new(self.definition.clone()),
        })
    }

    fn push_shell_handler(
        &self,
        prop_name: String,
        handler_id: String,
        signature: Option<String>,
    ) -> Self {
        let mut next = self.clone();
        let spec = ShellHandlerSpec {
            handler_id,
            feature_identifier: next.definition.identifier.clone(),
            name: prop_name.clone(),
            signature,
        };
        next.definition.shell_handlers.insert(prop_name, spec);
        next
    }
}

/// A built feature, acting as the factory for [`Feature`] instances
#[derive(Debug, Clone)]
pub struct FeatureClass {
    definition: Arc<FeatureDefinition>,
}

impl FeatureClass {
    pub fn identifier(&self) -> &str {
        &self.definition.identifier
    }

    pub fn definition(&self) -> &FeatureDefinition {
        &self.definition
    }

    /// Creates an instance whose options are the defaults shallow-merged under `options`
    pub fn instance(&self, options: Option<Map<String, Value>>) -> Feature {
        let mut merged = self.definition.default_options.clone();
        if let Some(options) = options {
            merged.extend(options);
        }
        Feature {
            inner: Arc::new(FeatureInstance {
                definition: Arc::clone(&self.definition),
                options: merged,
            }),
        }
    }
}

#[derive(Debug)]
struct FeatureInstance {
    definition: Arc<FeatureDefinition>,
    options: Map<String, Value>,
}

/// A configured feature.
///
/// Clones share identity: the registry and the RMI handle recognise an instance by pointer, not by value.
#[derive(Debug, Clone)]
pub struct Feature {
    inner: Arc<FeatureInstance>,
}

impl Feature {
    pub fn identifier(&self) -> &str {
        &self.inner.definition.identifier
    }

    pub fn script(&self) -> &str {
        &self.inner.definition.script
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.inner.options
    }

    pub fn definition(&self) -> &FeatureDefinition {
        &self.inner.definition
    }

    pub fn has_web_handler(&self, handler_id: &str) -> bool {
        self.inner.definition.web_handlers.contains_key(handler_id)
    }

    pub fn same_instance(&self, other: &Feature) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn options(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_declarations_do_not_mutate_receiver() {
        let base = FeatureBuilder::new("test.base", "function base(webshell) {}");
        let with_prop = base.declare_shell_handler("onThing");
        let with_web = with_prop.declare_web_handler("ping");

        assert!(base.build().unwrap().definition().shell_handlers().is_empty());
        assert_eq!(with_prop.build().unwrap().definition().shell_handlers().len(), 1);
        assert!(with_prop.build().unwrap().definition().web_handlers().is_empty());
        let class = with_web.build().unwrap();
        assert_eq!(
            class.definition().web_handlers()["ping"],
            WebHandlerSpec {
                handler_id: "ping".into(),
                is_async: false,
            }
        );
    }

    #[test]
    fn test_shell_handler_spec_fields() {
        let class = FeatureBuilder::new("test.spec", "function f(webshell) {}")
            .declare_shell_handler("onDefault")
            .declare_typed_shell_handler::<u32>("onCount", "count")
            .build()
            .unwrap();

        let handlers = class.definition().shell_handlers();
        assert_eq!(
            handlers["onDefault"],
            ShellHandlerSpec {
                handler_id: DEFAULT_HANDLER_ID.into(),
                feature_identifier: "test.spec".into(),
                name: "onDefault".into(),
                signature: None,
            }
        );
        assert_eq!(handlers["onCount"].handler_id, "count");
        assert_eq!(handlers["onCount"].signature.as_deref(), Some("u32"));
    }

    #[test]
    fn test_build_rejects_blank_script() {
        let err = FeatureBuilder::new("test.blank", "   ").build().unwrap_err();
        assert!(matches!(err, WebshellError::InvalidFeature { .. }));
    }

    #[test]
    fn test_build_rejects_bad_identifiers() {
        assert!(FeatureBuilder::new("", "function f() {}").build().is_err());
        assert!(
            FeatureBuilder::new("test:colon", "function f() {}")
                .build()
                .is_err()
        );
    }

    #[test]
    fn test_build_rejects_shared_handler_id() {
        let err = FeatureBuilder::new("test.shared", "function f() {}")
            .declare_shell_handler("onA")
            .declare_shell_handler("onB")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("more than one prop"));
    }

    #[test]
    fn test_options_are_shallow_merged() {
        let class = FeatureBuilder::new("test.options", "function f() {}")
            .with_default_options(options(json!({
                "color": "red",
                "nested": { "a": 1, "b": 2 }
            })))
            .build()
            .unwrap();

        let feature = class.instance(Some(options(json!({ "nested": { "a": 3 } }))));
        assert_eq!(feature.options()["color"], json!("red"));
        assert_eq!(feature.options()["nested"], json!({ "a": 3 }));

        let defaults = class.instance(None);
        assert_eq!(defaults.options()["nested"], json!({ "a": 1, "b": 2 }));
    }

    #[test]
    fn test_instances_compare_by_identity() {
        let class = FeatureBuilder::new("test.identity", "function f() {}")
            .build()
            .unwrap();
        let a = class.instance(None);
        let b = class.instance(None);

        assert!(a.same_instance(&a.clone()));
        assert!(!a.same_instance(&b));
        assert_eq!(a.options(), b.options());
    }
}
