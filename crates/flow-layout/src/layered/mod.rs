mod links;
mod ordering;
mod positions;

use crate::geometry::Point;
use crate::model::{GraphModel, LayerKey};
use crate::options::LayoutOptions;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::info;

use links::route_link;
use positions::{assign_horizontal_positions, assign_vertical_positions, infer_unit_height};

pub(crate) use ordering::order_layers;
pub use ordering::{predecessor_average, NodeOrdering, OrderingContext, PredecessorAverage};

/// A node with its final position and size
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutNode {
    pub name: String,
    pub layer: LayerKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    /// Position in the input payload
    pub idx: usize,
    /// Position within the ordered layer, top to bottom
    pub layer_idx: usize,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A link with its routed path
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutLink {
    pub source: String,
    pub target: String,
    pub start: Point,
    pub end: Point,
    #[serde(rename = "controlPoint0", skip_serializing_if = "Option::is_none")]
    pub control_point0: Option<Point>,
    #[serde(rename = "controlPoint1", skip_serializing_if = "Option::is_none")]
    pub control_point1: Option<Point>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Computed layout, nodes in input order and links in insertion order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Layout {
    pub nodes: Vec<LayoutNode>,
    pub links: Vec<LayoutLink>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl Layout {
    pub fn node(&self, name: &str) -> Option<&LayoutNode> {
        self.by_name.get(name).map(|&i| &self.nodes[i])
    }

    /// Node a link starts from
    pub fn source(&self, link: &LayoutLink) -> Option<&LayoutNode> {
        self.node(&link.source)
    }

    /// Node a link ends at
    pub fn target(&self, link: &LayoutLink) -> Option<&LayoutNode> {
        self.node(&link.target)
    }
}

/// Run every layout phase over a validated model
///
/// Phases run in order: layer x positions, node ordering, unit height
/// inference (weighted mode only), node stacking and link routing.
pub(crate) fn compute_layout(
    model: &GraphModel,
    options: &LayoutOptions,
    ordering: &dyn NodeOrdering,
    canvas_height: f64,
) -> Layout {
    let rendering = &options.rendering;

    let xs = assign_horizontal_positions(model.layers().len(), rendering);
    let ordered = order_layers(model, ordering);
    let unit_height = if options.weighted {
        infer_unit_height(model, canvas_height, rendering)
    } else {
        rendering.node_unit_height
    };
    let boxes = assign_vertical_positions(
        model,
        &ordered,
        &xs,
        unit_height,
        options.weighted,
        rendering,
    );

    let nodes: Vec<LayoutNode> = model
        .node_indices()
        .map(|index| {
            let node = model.node(index);
            let placed = boxes[index.index()];
            LayoutNode {
                name: node.name.clone(),
                layer: node.layer.clone(),
                weight: node.weight,
                idx: node.idx,
                layer_idx: placed.layer_idx,
                x: placed.x,
                y: placed.y,
                width: placed.width,
                height: placed.height,
                extra: node.extra.clone(),
            }
        })
        .collect();

    let links = model
        .links()
        .map(|(source, target, link)| {
            let path = route_link(
                &boxes[source.index()],
                &boxes[target.index()],
                rendering.link_type,
            );
            LayoutLink {
                source: model.node(source).name.clone(),
                target: model.node(target).name.clone(),
                start: path.start,
                end: path.end,
                control_point0: path.control_points.map(|(c0, _)| c0),
                control_point1: path.control_points.map(|(_, c1)| c1),
                extra: link.extra.clone(),
            }
        })
        .collect();

    let by_name = nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.name.clone(), i))
        .collect();

    info!(
        "Computed layout of {} nodes and {} links over {} layers",
        nodes.len(),
        model.link_count(),
        ordered.len()
    );

    Layout {
        nodes,
        links,
        by_name,
    }
}
