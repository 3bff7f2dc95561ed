//! Stock features shipped with the bus.
//!
//! Their scripts need a DOM; they are plain [`FeatureClass`](crate::FeatureClass) values like any
//! integrator-defined feature.

mod html_dimensions;
mod link_press;

pub use html_dimensions::{
    Dimensions, HTML_DIMENSIONS_IDENTIFIER, HtmlDimensions, REQUEST_DIMENSIONS_HANDLER,
    html_dimensions,
};
pub use link_press::{LINK_PRESS_IDENTIFIER, LinkPressTarget, link_press};
