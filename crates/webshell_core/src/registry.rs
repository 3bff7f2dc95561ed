//! Aggregates the active features of one mount into routing tables and the bootstrap script.
//!
//! A [`Registry`] is built once per set of features and never mutated afterwards. When the
//! feature set changes, the mount builds a new one.

use std::fmt;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::debug;

use crate::{
    error::{Result, WebshellError},
    feature::{Feature, ShellHandlerSpec},
    props::{Props, RESERVED_PROP_PREFIX},
    reporter::Reporter,
};

/// Runtime-side installation of `window.ReactNativeWebshell`
const BOOTSTRAP_PRELUDE: &str = include_str!("bootstrap.js");

/// Name of the runtime-side dispatch object installed by the prelude
pub const WEBSHELL_GLOBAL: &str = "window.ReactNativeWebshell";

/// Composite `identifier:handlerId` routing key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    pub identifier: String,
    pub handler_id: String,
}

impl HandlerKey {
    pub fn new(identifier: impl Into<String>, handler_id: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            handler_id: handler_id.into(),
        }
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.identifier, self.handler_id)
    }
}

#[derive(Debug)]
pub struct Registry {
    features: Vec<Feature>,
    /// prop name -> spec
    props_map: IndexMap<String, ShellHandlerSpec>,
    handlers_map: IndexMap<HandlerKey, ShellHandlerSpec>,
    assembled_script: String,
}

impl Registry {
    /// Builds the registry for `features`, skipping `None` entries.
    ///
    /// # Errors
    ///
    /// Returns [`WebshellError::DuplicatedRegisteredProp`] when two features declare the same
    /// prop and the reporter is in strict debug mode. Otherwise the later declaration wins.
    pub fn new<I, F>(features: I, reporter: &Reporter) -> Result<Self>
    where
        I: IntoIterator<Item = F>,
        F: Into<Option<Feature>>,
    {
        let features: Vec<Feature> = features.into_iter().filter_map(Into::into).collect();

        let mut props_map: IndexMap<String, ShellHandlerSpec> = IndexMap::new();
        let mut handlers_map = IndexMap::new();

        for spec in features
            .iter()
            .flat_map(|feature| feature.definition().shell_handlers().values())
        {
            if let Some(previous) = props_map.get(&spec.name)
                && previous.feature_identifier != spec.feature_identifier
            {
                reporter.dispatch_error(WebshellError::DuplicatedRegisteredProp {
                    prop: spec.name.clone(),
                    previous_identifier: previous.feature_identifier.clone(),
                    identifier: spec.feature_identifier.clone(),
                })?;
            }
            props_map.insert(spec.name.clone(), spec.clone());
            handlers_map.insert(
                HandlerKey::new(&spec.feature_identifier, &spec.handler_id),
                spec.clone(),
            );
        }

        let assembled_script = assemble_script(&features, reporter.debug_enabled());
        debug!(
            feature_count = features.len(),
            handler_count = handlers_map.len(),
            script_length = assembled_script.len(),
            "Registry assembled"
        );

        Ok(Self {
            features,
            props_map,
            handlers_map,
            assembled_script,
        })
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn props_map(&self) -> &IndexMap<String, ShellHandlerSpec> {
        &self.props_map
    }

    pub fn handlers_map(&self) -> &IndexMap<HandlerKey, ShellHandlerSpec> {
        &self.handlers_map
    }

    pub fn handler(&self, identifier: &str, handler_id: &str) -> Option<&ShellHandlerSpec> {
        self.handlers_map.get(&HandlerKey::new(identifier, handler_id))
    }

    /// The bootstrap script to inject before any integrator script
    pub fn assembled_script(&self) -> &str {
        &self.assembled_script
    }

    /// Host props whose names are declared shell handler props
    pub fn shell_handlers(&self, props: &Props) -> Props {
        props.filtered(|name, _| self.props_map.contains_key(name))
    }

    /// Host props to forward to the web view widget: everything except shell handler props and
    /// reserved `webshell*` props
    pub fn runtime_props(&self, props: &Props) -> Props {
        props.filtered(|name, _| {
            !self.props_map.contains_key(name) && !name.starts_with(RESERVED_PROP_PREFIX)
        })
    }

    /// Whether this exact instance (not an equal one) belongs to the registry
    pub fn has_feature(&self, feature: &Feature) -> bool {
        self.features.iter().any(|f| f.same_instance(feature))
    }
}

/// JS string literal for `text`
pub(crate) fn js_string(text: &str) -> String {
    Value::String(text.to_string()).to_string()
}

fn assemble_script(features: &[Feature], debug: bool) -> String {
    let mut script = String::from(BOOTSTRAP_PRELUDE);
    script.push_str(&format!("{WEBSHELL_GLOBAL}.debug = {debug};\n"));

    for feature in features {
        let identifier = js_string(feature.identifier());
        let source = feature.script().trim().trim_end_matches(';');
        let options = Value::Object(feature.options().clone());
        script.push_str(&format!(
            "(function (webshell) {{\n  \
               try {{\n    \
                 webshell.registerFeature({{\n      \
                   source: (\n{source}\n),\n      \
                   identifier: {identifier},\n      \
                   options: {options}\n    \
                 }});\n  \
               }} catch (e) {{\n    \
                 webshell.sendErrorMessage({identifier}, e);\n  \
               }}\n\
             }})({WEBSHELL_GLOBAL});\n"
        ));
    }

    script.push_str(&format!("{WEBSHELL_GLOBAL}.sendInitMessage();\n"));
    script
}
