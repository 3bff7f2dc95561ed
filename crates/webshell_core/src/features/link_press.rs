use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    error::Result,
    feature::{DEFAULT_HANDLER_ID, FeatureBuilder, FeatureClass},
};

pub const LINK_PRESS_IDENTIFIER: &str = "org.formidable-webshell/link-press";

const SCRIPT: &str = include_str!("link_press.js");

/// Payload of `onDOMLinkPress`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkPressTarget {
    pub uri: String,
    pub scheme: String,
    #[serde(default)]
    pub target: Option<String>,
}

/// Intercepts anchor clicks and posts the pressed link to `onDOMLinkPress`.
///
/// Options: `preventDefault` (default `true`), `ignoreHashChange` (default `true`).
///
/// # Errors
///
/// Never fails in practice; the script is a bundled resource.
pub fn link_press() -> Result<FeatureClass> {
    let mut defaults = Map::new();
    defaults.insert("preventDefault".into(), Value::Bool(true));
    defaults.insert("ignoreHashChange".into(), Value::Bool(true));

    FeatureBuilder::new(LINK_PRESS_IDENTIFIER, SCRIPT)
        .with_default_options(defaults)
        .declare_typed_shell_handler::<LinkPressTarget>("onDOMLinkPress", DEFAULT_HANDLER_ID)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_link_press_contract() {
        let class = link_press().unwrap();
        let spec = &class.definition().shell_handlers()["onDOMLinkPress"];
        assert_eq!(spec.handler_id, DEFAULT_HANDLER_ID);
        assert!(spec.signature.as_deref().unwrap().ends_with("LinkPressTarget"));

        let feature = class.instance(Some(
            json!({ "preventDefault": false }).as_object().cloned().unwrap(),
        ));
        assert_eq!(feature.options()["preventDefault"], json!(false));
        assert_eq!(feature.options()["ignoreHashChange"], json!(true));
    }

    #[test]
    fn test_payload_decodes() {
        let target: LinkPressTarget =
            serde_json::from_value(json!({ "uri": "https://example.com", "scheme": "https" }))
                .unwrap();
        assert_eq!(target.target, None);
    }
}
