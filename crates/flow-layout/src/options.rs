use crate::error::ParseLinkTypeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How link paths are drawn between two nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum LinkType {
    /// Direct segment from start to end
    #[default]
    Straight,
    /// Cubic bezier with horizontal tangents at both ends
    CBezier,
}

impl FromStr for LinkType {
    type Err = ParseLinkTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "straight" => Ok(LinkType::Straight),
            "c_bezier" => Ok(LinkType::CBezier),
            _ => Err(ParseLinkTypeError(s.to_string())),
        }
    }
}

impl TryFrom<String> for LinkType {
    type Error = ParseLinkTypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for LinkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkType::Straight => f.write_str("straight"),
            LinkType::CBezier => f.write_str("c_bezier"),
        }
    }
}

/// Spacing and sizing parameters, all in canvas pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderingOptions {
    /// Left margin before the first layer
    pub padding_x: f64,

    /// Top margin above the first node of every layer
    pub padding_y: f64,

    /// Horizontal gap reserved around each layer
    pub layer_margin: f64,

    /// Vertical gap between two stacked nodes
    pub node_margin: f64,

    /// Width of every node
    pub node_width: f64,

    /// Height of a node in unweighted mode
    pub node_unit_height: f64,

    pub link_type: LinkType,
}

impl Default for RenderingOptions {
    fn default() -> Self {
        Self {
            padding_x: 5.0,
            padding_y: 5.0,
            layer_margin: 80.0,
            node_margin: 10.0,
            node_width: 20.0,
            node_unit_height: 20.0,
            link_type: LinkType::Straight,
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutOptions {
    pub rendering: RenderingOptions,

    /// Scale node heights by their weight instead of using a fixed unit
    pub weighted: bool,
}

/// Partial rendering options, merged field by field
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderingPatch {
    pub padding_x: Option<f64>,
    pub padding_y: Option<f64>,
    pub layer_margin: Option<f64>,
    pub node_margin: Option<f64>,
    pub node_width: Option<f64>,
    pub node_unit_height: Option<f64>,
    pub link_type: Option<LinkType>,
}

/// Partial configuration accepted by [`LayoutEngine::load_options`]
///
/// [`LayoutEngine::load_options`]: crate::LayoutEngine::load_options
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionsPatch {
    pub rendering: Option<RenderingPatch>,
    pub weighted: Option<bool>,
}

impl RenderingOptions {
    fn merge(&mut self, patch: RenderingPatch) {
        let RenderingPatch {
            padding_x,
            padding_y,
            layer_margin,
            node_margin,
            node_width,
            node_unit_height,
            link_type,
        } = patch;

        if let Some(v) = padding_x {
            self.padding_x = v;
        }
        if let Some(v) = padding_y {
            self.padding_y = v;
        }
        if let Some(v) = layer_margin {
            self.layer_margin = v;
        }
        if let Some(v) = node_margin {
            self.node_margin = v;
        }
        if let Some(v) = node_width {
            self.node_width = v;
        }
        if let Some(v) = node_unit_height {
            self.node_unit_height = v;
        }
        if let Some(v) = link_type {
            self.link_type = v;
        }
    }
}

impl LayoutOptions {
    /// Apply a patch on top of the current options
    ///
    /// Top-level fields are replaced when present, and `rendering` is merged
    /// one level deep so a patch can change a single spacing value.
    pub fn merge(&mut self, patch: OptionsPatch) {
        if let Some(rendering) = patch.rendering {
            self.rendering.merge(rendering);
        }
        if let Some(weighted) = patch.weighted {
            self.weighted = weighted;
        }
    }
}
