use serde::{Deserialize, Serialize};

use crate::{
    error::Result,
    feature::{DEFAULT_HANDLER_ID, FeatureBuilder, FeatureClass},
};

pub const HTML_DIMENSIONS_IDENTIFIER: &str = "org.formidable-webshell/html-dimensions";

/// Web handler asking the script to measure again
pub const REQUEST_DIMENSIONS_HANDLER: &str = "requestDimensions";

const SCRIPT: &str = include_str!("html_dimensions.js");

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Payload of `onDOMHTMLDimensions`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HtmlDimensions {
    pub layout_viewport: Dimensions,
    pub content: Dimensions,
}

/// Reports the document dimensions whenever they change, and on request.
///
/// # Errors
///
/// Never fails in practice; the script is a bundled resource.
pub fn html_dimensions() -> Result<FeatureClass> {
    FeatureBuilder::new(HTML_DIMENSIONS_IDENTIFIER, SCRIPT)
        .declare_typed_shell_handler::<HtmlDimensions>("onDOMHTMLDimensions", DEFAULT_HANDLER_ID)
        .declare_web_handler(REQUEST_DIMENSIONS_HANDLER)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_html_dimensions_contract() {
        let feature = html_dimensions().unwrap().instance(None);
        assert!(feature.has_web_handler(REQUEST_DIMENSIONS_HANDLER));
        assert!(
            feature
                .definition()
                .shell_handlers()
                .contains_key("onDOMHTMLDimensions")
        );
    }

    #[test]
    fn test_payload_decodes() {
        let dims: HtmlDimensions = serde_json::from_value(json!({
            "layoutViewport": { "width": 320, "height": 480 },
            "content": { "width": 320, "height": 1200.5 }
        }))
        .unwrap();
        assert!((dims.content.height - 1200.5).abs() < f64::EPSILON);
    }
}
